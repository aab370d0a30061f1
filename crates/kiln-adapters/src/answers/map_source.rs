//! Pre-supplied answers: `--data KEY=VALUE` pairs and `--data-file` records.

use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, de::IgnoredAny};
use tracing::{debug, instrument};

use kiln_core::{
    application::{ApplicationError, ports::AnswerSource},
    domain::{Question, Value},
    error::KilnResult,
};

/// Record file syntax, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Json,
    Toml,
    Yaml,
}

impl RecordFormat {
    pub fn from_path(path: &Path) -> KilnResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(source_error(format!(
                "{}: expected a .json, .toml, .yaml or .yml file",
                path.display()
            ))),
        }
    }
}

/// A scalar as it appears in a record file.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Null(()),
    Unsupported(IgnoredAny),
}

/// Non-interactive source backed by a fixed map of answers.
///
/// Questions it has no value for get `None`, so the collector falls back to
/// the question default (or fails with `MissingAnswer`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapAnswerSource {
    values: BTreeMap<String, Value>,
}

impl MapAnswerSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Parse one `KEY=VALUE` argument. The value stays a string; confirm
    /// questions coerce `yes`/`no` style text themselves.
    pub fn parse_data(arg: &str) -> KilnResult<(String, Value)> {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| source_error(format!("'{arg}' is not KEY=VALUE")))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(source_error(format!("'{arg}' has an empty key")));
        }
        Ok((key.to_string(), Value::from(value)))
    }

    /// Add `KEY=VALUE` arguments; later ones win.
    pub fn with_data<'a, I>(mut self, args: I) -> KilnResult<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for arg in args {
            let (key, value) = Self::parse_data(arg)?;
            self.values.insert(key, value);
        }
        Ok(self)
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> KilnResult<Self> {
        let format = RecordFormat::from_path(path)?;
        let text = fs::read_to_string(path)
            .map_err(|e| source_error(format!("{}: {e}", path.display())))?;
        let source = Self::parse_record(&text, format)
            .map_err(|e| source_error(format!("{}: {e}", path.display())))?;
        debug!(answers = source.len(), "answers record read");
        Ok(source)
    }

    /// Parse a flat key/value record. Keys starting with `_` are metadata
    /// and skipped; null values count as not supplied.
    pub fn parse_record(text: &str, format: RecordFormat) -> Result<Self, String> {
        let raw: BTreeMap<String, RawValue> = match format {
            RecordFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string())?,
            RecordFormat::Toml => toml::from_str(text).map_err(|e| e.to_string())?,
            RecordFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string())?,
        };

        let mut values = BTreeMap::new();
        for (key, raw) in raw {
            if key.starts_with('_') {
                continue;
            }
            let value = match raw {
                RawValue::Bool(b) => Value::Bool(b),
                RawValue::Int(n) => Value::Str(n.to_string()),
                RawValue::Float(f) => Value::Str(f.to_string()),
                RawValue::Str(s) => Value::Str(s),
                RawValue::Null(()) => continue,
                RawValue::Unsupported(_) => {
                    return Err(format!("'{key}' must be a string, number or boolean"));
                }
            };
            values.insert(key, value);
        }
        Ok(Self { values })
    }

    /// Values from `other` replace ours.
    pub fn overlay(mut self, other: MapAnswerSource) -> Self {
        self.values.extend(other.values);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl AnswerSource for MapAnswerSource {
    fn is_interactive(&self) -> bool {
        false
    }

    fn ask(
        &mut self,
        question: &Question,
        _default: Option<&Value>,
        _error: Option<&str>,
    ) -> KilnResult<Option<Value>> {
        Ok(self.values.get(&question.key).cloned())
    }

    fn provided_keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

fn source_error(reason: String) -> kiln_core::error::KilnError {
    ApplicationError::AnswersSource { reason }.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_data_arguments() {
        assert_eq!(
            MapAnswerSource::parse_data("project_name=My App").unwrap(),
            ("project_name".to_string(), Value::from("My App"))
        );
        assert_eq!(
            MapAnswerSource::parse_data("url=a=b").unwrap().1,
            Value::from("a=b")
        );
        assert!(MapAnswerSource::parse_data("no-equals").is_err());
        assert!(MapAnswerSource::parse_data("=x").is_err());
    }

    #[test]
    fn later_data_wins() {
        let source = MapAnswerSource::new()
            .with_data(["a=1", "a=2"])
            .unwrap();
        assert_eq!(source.get("a"), Some(&Value::from("2")));
    }

    #[test]
    fn reads_all_three_formats() {
        let json = r#"{"project_name": "x", "enable_github_action": false, "_catalog": "python@1.0.0"}"#;
        let toml = "project_name = \"x\"\nenable_github_action = false\n_catalog = \"python@1.0.0\"\n";
        let yaml = "project_name: x\nenable_github_action: false\n_catalog: python@1.0.0\n";

        for (text, format) in [
            (json, RecordFormat::Json),
            (toml, RecordFormat::Toml),
            (yaml, RecordFormat::Yaml),
        ] {
            let source = MapAnswerSource::parse_record(text, format).unwrap();
            assert_eq!(source.provided_keys(), ["enable_github_action", "project_name"]);
            assert_eq!(source.get("enable_github_action"), Some(&Value::from(false)));
        }
    }

    #[test]
    fn numbers_become_text_and_nulls_are_dropped() {
        let source =
            MapAnswerSource::parse_record("version: 3\nratio: 0.5\ndescription:\n", RecordFormat::Yaml)
                .unwrap();
        assert_eq!(source.get("version"), Some(&Value::from("3")));
        assert_eq!(source.get("ratio"), Some(&Value::from("0.5")));
        assert!(source.get("description").is_none());
    }

    #[test]
    fn nested_values_are_rejected() {
        let err = MapAnswerSource::parse_record(r#"{"tags": ["a"]}"#, RecordFormat::Json).unwrap_err();
        assert!(err.contains("tags"));
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(RecordFormat::from_path(Path::new("a.YML")).unwrap(), RecordFormat::Yaml);
        assert_eq!(RecordFormat::from_path(Path::new("a.toml")).unwrap(), RecordFormat::Toml);
        assert!(RecordFormat::from_path(Path::new("answers")).is_err());
    }

    #[test]
    fn from_file_reads_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.json");
        fs::write(&path, r#"{"project_name": "demo"}"#).unwrap();

        let source = MapAnswerSource::from_file(&path).unwrap();
        assert_eq!(source.get("project_name"), Some(&Value::from("demo")));
    }

    #[test]
    fn overlay_prefers_the_newer_values() {
        let file = MapAnswerSource::from_pairs([("a", Value::from("file")), ("b", Value::from("file"))]);
        let data = MapAnswerSource::from_pairs([("a", Value::from("cli"))]);
        let merged = file.overlay(data);
        assert_eq!(merged.get("a"), Some(&Value::from("cli")));
        assert_eq!(merged.get("b"), Some(&Value::from("file")));
    }
}
