//! `catalog.toml` parsing and catalog assembly.
//!
//! ```toml
//! [catalog]
//! name = "python"
//! version = "1.0.0"
//! description = "..."
//!
//! [[questions]]
//! key = "package_name"
//! prompt = "Python package name"
//! type = "text"                        # text | choice | confirm
//! default = "{{ project_name | snake }}"
//! validator = "identifier"             # identifier | email | non-empty | "regex:<re>"
//! when = "project_type == 'service'"
//!
//! [[files]]
//! source = "gitignore"                 # path under template/
//! path = ".gitignore"                  # defaults to `source`
//! when = "enable_github_action"
//! executable = false
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use tracing::{debug, instrument};

use kiln_core::domain::{
    CatalogEntry, CatalogId, Condition, DefaultValue, DomainError, Pattern, Question,
    QuestionKind, Questionnaire, TemplateCatalog, Validator,
};

// ── Manifest types ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogManifest {
    pub catalog: CatalogSection,
    #[serde(default)]
    pub questions: Vec<QuestionEntry>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSection {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestionEntry {
    pub key: String,
    pub prompt: String,
    pub help: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: KindName,
    #[serde(default)]
    pub choices: Vec<String>,
    pub default: Option<RawDefault>,
    pub validator: Option<String>,
    pub when: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KindName {
    #[default]
    Text,
    Choice,
    Confirm,
}

/// A question default as written: a flag, or a string pattern.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawDefault {
    Bool(bool),
    Str(String),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileEntry {
    pub source: String,
    pub path: Option<String>,
    pub when: Option<String>,
    #[serde(default)]
    pub executable: bool,
}

impl CatalogManifest {
    pub fn parse(source: &str) -> Result<Self, DomainError> {
        toml::from_str(source)
            .map_err(|e| DomainError::InvalidCatalog(format!("catalog.toml: {e}")))
    }
}

// ── Assembly ──────────────────────────────────────────────────────────────────

/// Build a catalog from a manifest and its template sources.
///
/// `sources` maps a path relative to `template/` (always `/`-separated) to the
/// file's text. Entries listed under `[[files]]` come first, in manifest
/// order. Every other source follows in path order, included unconditionally
/// at its own relative path.
#[instrument(skip_all)]
pub fn build_catalog<I, K, V>(manifest: &str, sources: I) -> Result<TemplateCatalog, DomainError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let manifest = CatalogManifest::parse(manifest)?;
    let mut sources: BTreeMap<String, String> = sources
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();

    let questions = manifest
        .questions
        .iter()
        .map(build_question)
        .collect::<Result<Vec<_>, _>>()?;
    let questionnaire = Questionnaire::new(questions)?;

    let mut entries = Vec::with_capacity(sources.len());
    let mut listed = HashSet::new();
    for file in &manifest.files {
        if !listed.insert(file.source.as_str()) {
            return Err(DomainError::InvalidCatalog(format!(
                "[[files]] lists '{}' twice",
                file.source
            )));
        }
        let content = sources.remove(&file.source).ok_or_else(|| {
            DomainError::InvalidCatalog(format!(
                "[[files]] entry '{}' has no file under template/",
                file.source
            ))
        })?;
        entries.push(build_entry(file, content)?);
    }

    for (source, content) in sources {
        let implicit = FileEntry {
            source,
            path: None,
            when: None,
            executable: false,
        };
        entries.push(build_entry(&implicit, content)?);
    }

    let catalog = TemplateCatalog::builder()
        .id(CatalogId::new(manifest.catalog.name, manifest.catalog.version))
        .description(manifest.catalog.description)
        .questionnaire(questionnaire)
        .entries(entries)
        .build()?;

    debug!(
        id = %catalog.id(),
        questions = catalog.questionnaire().len(),
        entries = catalog.entry_count(),
        "catalog built"
    );
    Ok(catalog)
}

fn build_question(entry: &QuestionEntry) -> Result<Question, DomainError> {
    let invalid = |reason: String| {
        DomainError::InvalidCatalog(format!("question '{}': {reason}", entry.key))
    };

    let kind = match entry.kind {
        KindName::Text => QuestionKind::Text,
        KindName::Confirm => QuestionKind::Confirm,
        KindName::Choice => QuestionKind::Choice(entry.choices.clone()),
    };
    if entry.kind != KindName::Choice && !entry.choices.is_empty() {
        return Err(invalid(format!("`choices` given for a {kind} question")));
    }

    let mut question = Question::new(&entry.key, &entry.prompt, kind);
    if let Some(help) = &entry.help {
        question = question.with_help(help);
    }

    match &entry.default {
        None => {}
        Some(RawDefault::Bool(b)) => {
            if entry.kind != KindName::Confirm {
                return Err(invalid("a true/false default needs type = \"confirm\"".into()));
            }
            question = question.with_default(DefaultValue::Bool(*b));
        }
        Some(RawDefault::Str(s)) => {
            let pattern = Pattern::parse(format!("default of '{}'", entry.key), s.as_str())?;
            if pattern.is_static() && entry.kind == KindName::Choice && !entry.choices.contains(s) {
                return Err(invalid(format!(
                    "default '{s}' is not one of [{}]",
                    entry.choices.join(", ")
                )));
            }
            question = question.with_default(DefaultValue::Pattern(pattern));
        }
    }

    if let Some(validator) = &entry.validator {
        question = question.with_validator(Validator::parse(validator).map_err(invalid)?);
    }

    if let Some(when) = &entry.when {
        question = question.when(Condition::parse(when).map_err(invalid)?);
    }

    Ok(question)
}

fn build_entry(file: &FileEntry, content: String) -> Result<CatalogEntry, DomainError> {
    let path = file.path.as_deref().unwrap_or(&file.source);
    let mut entry = CatalogEntry::new(
        &file.source,
        Pattern::parse(format!("{} (path)", file.source), path)?,
        Pattern::parse(&file.source, content)?,
    );

    if let Some(when) = &file.when {
        let guard = Condition::parse(when).map_err(|reason| {
            DomainError::InvalidCatalog(format!("file '{}': {reason}", file.source))
        })?;
        entry = entry.with_guard(guard);
    }
    if file.executable {
        entry = entry.executable();
    }
    Ok(entry)
}
