//! Integration tests for kiln-core: collect → compose → write through the
//! public API only.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

use kiln_core::domain::{
    Condition, DefaultValue, DomainError, Pattern, Validator,
};
use kiln_core::prelude::*;

fn pattern(name: &str, src: &str) -> Pattern {
    Pattern::parse(name, src).unwrap()
}

fn catalog() -> Arc<TemplateCatalog> {
    let questionnaire = Questionnaire::new(vec![
        Question::text("project_name", "Project name"),
        Question::text("package_name", "Package name")
            .with_default(DefaultValue::Pattern(pattern("d", "{{ project_name | snake }}")))
            .with_validator(Validator::Identifier),
        Question::confirm("enable_github_action", "CI?").with_default(DefaultValue::Bool(true)),
        Question::confirm("publish_to_pypi", "Publish?")
            .with_default(DefaultValue::Bool(false))
            .when(Condition::parse("enable_github_action").unwrap()),
    ])
    .unwrap();

    let release = "\
name: release
jobs:
  build:
    steps:
      - run: python -m build
{% if publish_to_pypi %}
      - name: Publish
        env:
          TOKEN: {% raw %}${{ secrets.PYPI_TOKEN }}{% endraw %}
{% endif %}
";

    Arc::new(
        TemplateCatalog::builder()
            .id(CatalogId::new("it", "1.0.0"))
            .questionnaire(questionnaire)
            .add_entry(CatalogEntry::new(
                "init",
                pattern("init", "{{ package_name }}/__init__.py"),
                pattern("init", "\"\"\"{{ project_name }}.\"\"\"\n"),
            ))
            .add_entry(
                CatalogEntry::new(
                    "release",
                    pattern("release", ".github/workflows/release.yaml"),
                    pattern("release", release),
                )
                .with_guard(Condition::parse("enable_github_action").unwrap()),
            )
            .build()
            .unwrap(),
    )
}

struct Record(HashMap<&'static str, Value>);

impl AnswerSource for Record {
    fn is_interactive(&self) -> bool {
        false
    }

    fn ask(
        &mut self,
        question: &Question,
        _default: Option<&Value>,
        _error: Option<&str>,
    ) -> KilnResult<Option<Value>> {
        Ok(self.0.get(question.key.as_str()).cloned())
    }

    fn provided_keys(&self) -> Vec<String> {
        self.0.keys().map(|k| k.to_string()).collect()
    }
}

#[derive(Clone, Default)]
struct RecordingFs {
    files: Arc<Mutex<Vec<(String, String)>>>,
}

impl Filesystem for RecordingFs {
    fn create_dir_all(&self, _path: &Path) -> KilnResult<()> {
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> KilnResult<()> {
        self.files
            .lock()
            .unwrap()
            .push((path.display().to_string(), content.to_string()));
        Ok(())
    }

    fn set_permissions(&self, _path: &Path, _executable: bool) -> KilnResult<()> {
        Ok(())
    }

    fn exists(&self, _path: &Path) -> bool {
        false
    }

    fn is_dir(&self, _path: &Path) -> bool {
        false
    }

    fn remove_dir_all(&self, _path: &Path) -> KilnResult<()> {
        Ok(())
    }
}

#[test]
fn collect_compose_write_round() {
    let fs = RecordingFs::default();
    let service = GenerateService::new(catalog(), Box::new(fs.clone()));

    let mut source = Record(HashMap::from([
        ("project_name", Value::from("My Lib")),
        ("publish_to_pypi", Value::from("yes")),
    ]));
    let answers = service.collect(&mut source, Vec::new()).unwrap();
    let report = service
        .generate(Path::new("out"), &answers, &GenerateOptions::default())
        .unwrap();

    assert_eq!(report.file_count(), 2);
    let files = fs.files.lock().unwrap();
    assert_eq!(files[0].0, Path::new("out/my_lib/__init__.py").display().to_string());
    assert_eq!(files[0].1, "\"\"\"My Lib.\"\"\"\n");
    assert!(files[1].1.contains("TOKEN: ${{ secrets.PYPI_TOKEN }}"));
}

#[test]
fn publish_step_absent_without_publishing() {
    let answers: AnswerSet = [
        ("project_name", Value::from("x")),
        ("package_name", Value::from("x")),
        ("enable_github_action", Value::from(true)),
        ("publish_to_pypi", Value::from(false)),
    ]
    .into_iter()
    .collect();

    let out = compose(&catalog(), &answers).unwrap();
    let release = &out.get(".github/workflows/release.yaml").unwrap().content;
    assert!(!release.contains("Publish"));
    assert!(release.ends_with("python -m build\n"));
}

#[test]
fn compose_in_parallel_is_deterministic() {
    let catalog = catalog();
    let answer_sets: Vec<AnswerSet> = (0..8)
        .map(|i| {
            [
                ("project_name", Value::from(format!("Project {i}"))),
                ("package_name", Value::from(format!("project_{i}"))),
                ("enable_github_action", Value::from(i % 2 == 0)),
            ]
            .into_iter()
            .chain((i % 2 == 0).then(|| ("publish_to_pypi", Value::from(i % 4 == 0))))
            .collect()
        })
        .collect();

    let sequential: Vec<_> = answer_sets
        .iter()
        .map(|a| compose(&catalog, a).unwrap())
        .collect();

    let parallel: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = answer_sets
            .iter()
            .map(|a| {
                let catalog = Arc::clone(&catalog);
                scope.spawn(move || compose(&catalog, a).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, parallel);
}

#[test]
fn unknown_token_in_content_is_fatal() {
    let questionnaire = Questionnaire::new(vec![
        Question::confirm("flag", "Flag?").with_default(DefaultValue::Bool(false)),
        Question::text("extra", "Extra").when(Condition::parse("flag").unwrap()),
    ])
    .unwrap();
    let catalog = TemplateCatalog::builder()
        .id(CatalogId::new("tok", "1.0.0"))
        .questionnaire(questionnaire)
        .add_entry(CatalogEntry::new(
            "notes",
            pattern("notes", "NOTES.md"),
            pattern("notes", "extra: {{ extra }}\n"),
        ))
        .build()
        .unwrap();

    let answers: AnswerSet = [("flag", Value::from(false))].into_iter().collect();
    assert_eq!(
        compose(&catalog, &answers),
        Err(DomainError::UnknownToken {
            token: "extra".into(),
            template: "notes".into(),
        })
    );
}
