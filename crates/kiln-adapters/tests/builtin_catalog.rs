//! End-to-end behavior of the embedded `python@1.0.0` catalog.

use std::{path::Path, sync::Arc};

use kiln_adapters::{
    LocalFilesystem, MapAnswerSource, MemoryFilesystem,
    answers::{ANSWERS_FILE, answers_record},
    builtin_catalog,
};
use kiln_core::{
    application::{ApplicationError, GenerateOptions, GenerateService},
    domain::{AnswerSet, DomainError, OutputFileSet, TemplateCatalog, Value, compose},
    error::KilnError,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn catalog() -> Arc<TemplateCatalog> {
    Arc::new(builtin_catalog().unwrap())
}

fn service(fs: MemoryFilesystem) -> GenerateService {
    GenerateService::new(catalog(), Box::new(fs))
}

fn collect(pairs: &[(&str, &str)]) -> Result<AnswerSet, KilnError> {
    let mut source =
        MapAnswerSource::from_pairs(pairs.iter().map(|(k, v)| (*k, Value::from(*v))));
    service(MemoryFilesystem::new()).collect(&mut source, Vec::new())
}

fn plan(pairs: &[(&str, &str)]) -> OutputFileSet {
    let answers = collect(pairs).unwrap();
    compose(&catalog(), &answers).unwrap()
}

const BASE: [(&str, &str); 2] = [("project_name", "My Api"), ("author_username", "octo")];

fn with(extra: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
    BASE.iter().chain(extra).copied().collect()
}

// ── Defaults ──────────────────────────────────────────────────────────────────

#[test]
fn defaults_fill_derived_answers() {
    let answers = collect(&BASE).unwrap();

    assert_eq!(answers.get_str("package_name"), Some("my_api"));
    assert_eq!(answers.get_str("repository_name"), Some("my-api"));
    assert_eq!(
        answers.get_str("author_email"),
        Some("octo@users.noreply.github.com")
    );
    assert_eq!(answers.get_str("project_type"), Some("cli"));
    assert_eq!(answers.get_bool("enable_github_action"), Some(true));
    assert_eq!(answers.get_bool("publish_to_pypi"), Some(false));
}

#[test]
fn punctuated_project_names_derive_valid_names() {
    for (project, package, repository) in [
        ("My App (v2)", "my_app_v2", "my-app-v2"),
        ("Acme's Tool", "acme_s_tool", "acme-s-tool"),
        ("Data+ML Kit", "data_ml_kit", "data-ml-kit"),
        ("HTTPServer 3", "http_server_3", "http-server-3"),
    ] {
        let answers = collect(&[("project_name", project), ("author_username", "octo")])
            .unwrap_or_else(|e| panic!("{project}: {e}"));
        assert_eq!(answers.get_str("package_name"), Some(package), "{project}");
        assert_eq!(answers.get_str("repository_name"), Some(repository), "{project}");
    }
}

#[test]
fn derived_package_path_uses_the_snaked_name() {
    let out = plan(&[("project_name", "My App (v2)"), ("author_username", "octo")]);
    assert!(out.contains("my_app_v2/main.py"));
}

#[test]
fn non_ascii_name_needs_an_explicit_package_name() {
    let err = collect(&[("project_name", "Café Órbita"), ("author_username", "octo")])
        .unwrap_err();
    assert_eq!(err.answer_key(), Some("package_name"));

    let answers = collect(&[
        ("project_name", "Café Órbita"),
        ("package_name", "cafe_orbita"),
        ("author_username", "octo"),
    ])
    .unwrap();
    assert_eq!(answers.get_str("package_name"), Some("cafe_orbita"));
    assert_eq!(answers.get_str("repository_name"), Some("café-órbita"));
}

#[test]
fn leading_digit_name_needs_an_explicit_package_name() {
    let err = collect(&[("project_name", "2048 Game"), ("author_username", "octo")])
        .unwrap_err();
    assert!(matches!(
        err,
        KilnError::Domain(DomainError::InvalidAnswer { ref key, .. }) if key == "package_name"
    ));
}

#[test]
fn compose_is_deterministic() {
    let pairs = with(&[("project_type", "service")]);
    assert_eq!(plan(&pairs), plan(&pairs));
}

// ── Project type ──────────────────────────────────────────────────────────────

#[test]
fn cli_project_has_no_service_files() {
    let answers = collect(&with(&[("project_type", "cli")])).unwrap();
    assert!(!answers.contains("service_framework"));

    let out = compose(&catalog(), &answers).unwrap();
    assert!(!out.contains("my_api/settings.py"));
    assert!(!out.contains("Dockerfile"));
    assert!(!out.contains(".env.example"));
    assert!(out.get("my_api/main.py").unwrap().content.contains("import argparse"));
    assert!(
        out.get("pyproject.toml")
            .unwrap()
            .content
            .contains("my-api = \"my_api.main:main\"")
    );
}

#[test]
fn fastapi_service_with_actions_and_no_publish() {
    let out = plan(&with(&[
        ("project_type", "service"),
        ("service_framework", "fastapi"),
        ("enable_github_action", "yes"),
        ("publish_to_pypi", "no"),
        ("package_name", "my_api"),
    ]));

    for path in [
        "my_api/main.py",
        "my_api/settings.py",
        ".github/workflows/test.yaml",
        ".github/workflows/pre-commit.yaml",
    ] {
        assert!(out.contains(path), "missing {path}");
    }
    assert!(!out.contains(".github/workflows/release.yaml"));
    assert!(out.get("my_api/main.py").unwrap().content.contains("FastAPI(title=\"My Api\""));
}

#[test]
fn framework_switch_changes_content_only() {
    let fastapi = plan(&with(&[
        ("project_type", "service"),
        ("service_framework", "fastapi"),
    ]));
    let flask = plan(&with(&[
        ("project_type", "service"),
        ("service_framework", "flask"),
    ]));

    assert_eq!(
        fastapi.paths().collect::<Vec<_>>(),
        flask.paths().collect::<Vec<_>>()
    );

    let main = |set: &OutputFileSet| set.get("my_api/main.py").unwrap().content.clone();
    assert!(main(&flask).contains("from flask import Flask"));
    assert!(!main(&flask).contains("fastapi"));

    let deps = |set: &OutputFileSet| set.get("pyproject.toml").unwrap().content.clone();
    assert!(deps(&fastapi).contains("\"fastapi>=0.110\""));
    assert!(deps(&flask).contains("\"flask>=3.0\""));
    assert!(!deps(&flask).contains("fastapi"));
}

// ── CI workflows ──────────────────────────────────────────────────────────────

#[test]
fn disabled_actions_drop_every_workflow() {
    for publish in ["true", "false"] {
        let answers = collect(&with(&[
            ("enable_github_action", "false"),
            ("publish_to_pypi", publish),
        ]))
        .unwrap();
        assert!(!answers.contains("publish_to_pypi"));

        let out = compose(&catalog(), &answers).unwrap();
        assert!(!out.paths().any(|p| p.starts_with(".github/")));
    }
}

#[test]
fn publishing_adds_the_release_workflow() {
    let out = plan(&with(&[("publish_to_pypi", "true")]));
    let release = &out.get(".github/workflows/release.yaml").unwrap().content;

    assert!(release.contains("pypa/gh-action-pypi-publish"));
    assert!(release.contains("${{ secrets.PYPI_API_TOKEN }}"));
    assert!(!release.contains("{%"));
}

#[test]
fn workflow_expressions_pass_through_verbatim() {
    let out = plan(&BASE);
    let test = &out.get(".github/workflows/test.yaml").unwrap().content;
    assert!(test.contains("${{"));
}

// ── Validation ────────────────────────────────────────────────────────────────

#[test]
fn bad_package_name_is_rejected() {
    let err = collect(&with(&[("package_name", "123-bad name")])).unwrap_err();
    assert!(matches!(
        err,
        KilnError::Domain(DomainError::InvalidAnswer { ref key, .. }) if key == "package_name"
    ));
}

#[test]
fn valid_package_name_is_used_unchanged() {
    let out = plan(&with(&[("package_name", "my_app")]));
    assert!(out.contains("my_app/__init__.py"));
    assert!(out.contains("my_app/main.py"));
}

#[test]
fn unknown_key_is_rejected() {
    let err = collect(&with(&[("licence", "MIT")])).unwrap_err();
    assert_eq!(err.answer_key(), Some("licence"));
}

#[test]
fn bad_choice_is_rejected() {
    let err = collect(&with(&[("project_type", "library")])).unwrap_err();
    assert_eq!(err.answer_key(), Some("project_type"));
}

// ── Writing ───────────────────────────────────────────────────────────────────

#[test]
fn writes_project_and_record_to_memory() {
    let fs = MemoryFilesystem::new();
    let service = service(fs.clone());
    let answers = collect(&BASE).unwrap();
    let options = GenerateOptions {
        answers_record: Some(answers_record(service.catalog().id(), &answers).unwrap()),
        ..Default::default()
    };

    let report = service.generate(Path::new("/work/my-api"), &answers, &options).unwrap();

    assert_eq!(report.file_count(), report.written.len() + 1);
    assert!(fs.is_executable("/work/my-api/scripts/bootstrap.sh"));
    let record = fs.read_file(Path::new("/work/my-api").join(ANSWERS_FILE)).unwrap();
    assert!(record.contains("_catalog = \"python@1.0.0\""));
}

#[test]
fn existing_file_blocks_generation() {
    let fs = MemoryFilesystem::new().with_file("/work/my-api/README.md", "mine");
    let answers = collect(&BASE).unwrap();

    let err = service(fs.clone())
        .generate(Path::new("/work/my-api"), &answers, &GenerateOptions::default())
        .unwrap_err();

    assert!(matches!(
        err,
        KilnError::Application(ApplicationError::DestinationCollision { .. })
    ));
    assert_eq!(fs.list_files().len(), 1);
    assert_eq!(fs.read_file("/work/my-api/README.md").as_deref(), Some("mine"));
}

#[test]
fn writes_project_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("my-api");
    let answers = collect(&with(&[("project_type", "service")])).unwrap();

    let report = GenerateService::new(catalog(), Box::new(LocalFilesystem::new()))
        .generate(&root, &answers, &GenerateOptions::default())
        .unwrap();

    assert!(report.answers_record.is_none());
    let settings = std::fs::read_to_string(root.join("my_api/settings.py")).unwrap();
    assert!(settings.contains("pydantic_settings"));
    assert!(root.join(".gitignore").is_file());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(root.join("scripts/bootstrap.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o111, 0o111);
    }
}

#[test]
fn recorded_answers_regenerate_the_same_project() {
    let answers = collect(&with(&[("project_type", "service")])).unwrap();
    let record = answers_record(catalog().id(), &answers).unwrap();

    let mut replay = MapAnswerSource::parse_record(
        &record.content,
        kiln_adapters::answers::RecordFormat::Toml,
    )
    .unwrap();
    let again = service(MemoryFilesystem::new())
        .collect(&mut replay, Vec::new())
        .unwrap();

    assert_eq!(
        compose(&catalog(), &answers).unwrap(),
        compose(&catalog(), &again).unwrap()
    );
}
