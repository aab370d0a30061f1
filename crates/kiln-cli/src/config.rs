//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The CLI
//! owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `KILN_<SECTION>__<KEY>`, e.g.
//!    `KILN_DEFAULTS__AUTHOR_USERNAME=octo`
//! 3. Config file: `--config FILE`, else `config.toml` in the platform
//!    config directory
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use kiln_core::domain::Value;

use crate::error::{CliError, CliResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Personal defaults for catalog questions.
    pub defaults: Defaults,
    pub output: OutputConfig,
    pub templates: TemplateConfig,
}

/// Replace the catalog's own defaults; still validated like answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// Default `kiln list` format: table, list, json or csv.
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Catalog used when `--catalog` is not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    /// Write `.kiln-answers.toml` into generated projects.
    pub answers_file: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "table".into(),
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            answers_file: true,
        }
    }
}

/// Keys accepted by `kiln config get|set`.
pub const KEYS: &[&str] = &[
    "defaults.author_username",
    "defaults.author_email",
    "defaults.repository_namespace",
    "output.no_color",
    "output.format",
    "templates.catalog_path",
    "templates.answers_file",
];

impl AppConfig {
    /// Load defaults, then the config file, then the environment.
    ///
    /// An explicit `config_file` must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), true),
            None => (Self::config_path(), false),
        };
        debug!(path = %path.display(), required, "loading configuration");

        Config::builder()
            .add_source(
                Config::try_from(&Self::default()).context("failed to seed default config")?,
            )
            .add_source(
                File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                Environment::with_prefix("KILN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read {}", path.display()))?
            .try_deserialize()
            .context("invalid configuration")
    }

    /// Default configuration file location, falling back to `.kiln.toml` in
    /// the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "kiln", "kiln")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".kiln.toml"))
    }

    /// `--config FILE` if given, else [`Self::config_path`].
    pub fn active_path(explicit: Option<&PathBuf>) -> PathBuf {
        explicit.cloned().unwrap_or_else(Self::config_path)
    }

    /// Question defaults for the answer collector.
    pub fn user_defaults(&self) -> Vec<(String, Value)> {
        [
            ("author_username", &self.defaults.author_username),
            ("author_email", &self.defaults.author_email),
            ("repository_namespace", &self.defaults.repository_namespace),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), Value::from(v.as_str()))))
        .collect()
    }

    pub fn get(&self, key: &str) -> CliResult<String> {
        let value = match key {
            "defaults.author_username" => self.defaults.author_username.clone().unwrap_or_default(),
            "defaults.author_email" => self.defaults.author_email.clone().unwrap_or_default(),
            "defaults.repository_namespace" => {
                self.defaults.repository_namespace.clone().unwrap_or_default()
            }
            "output.no_color" => self.output.no_color.to_string(),
            "output.format" => self.output.format.clone(),
            "templates.catalog_path" => self
                .templates
                .catalog_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "templates.answers_file" => self.templates.answers_file.to_string(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }
}

/// Set `key` in the TOML file at `path`, creating the file if needed.
///
/// The updated document must still deserialize into [`AppConfig`] before it
/// is written back.
pub fn set_in_file(path: &Path, key: &str, raw: &str) -> CliResult<()> {
    if !KEYS.contains(&key) {
        return Err(unknown_key(key));
    }
    let (section, field) = key
        .split_once('.')
        .ok_or_else(|| unknown_key(key))?;

    let mut doc: toml::Table = match std::fs::read_to_string(path) {
        Ok(text) => toml::from_str(&text).map_err(|e| CliError::ConfigError {
            message: format!("failed to parse {}", path.display()),
            source: Some(Box::new(e)),
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => toml::Table::new(),
        Err(e) => {
            return Err(CliError::IoError {
                message: format!("failed to read {}", path.display()),
                source: e,
            });
        }
    };

    let value = match field {
        "no_color" | "answers_file" => raw
            .parse::<bool>()
            .map(toml::Value::Boolean)
            .map_err(|_| CliError::config(format!("'{key}' expects true or false, got '{raw}'")))?,
        _ => toml::Value::String(raw.to_string()),
    };

    let table = doc
        .entry(section)
        .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    match table {
        toml::Value::Table(t) => {
            t.insert(field.to_string(), value);
        }
        _ => return Err(CliError::config(format!("[{section}] is not a table"))),
    }

    let text = toml::to_string_pretty(&doc).map_err(|e| CliError::ConfigError {
        message: "failed to serialise config".into(),
        source: Some(Box::new(e)),
    })?;
    toml::from_str::<AppConfig>(&text).map_err(|e| CliError::ConfigError {
        message: format!("'{key}' = '{raw}' would make the config invalid"),
        source: Some(Box::new(e)),
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CliError::IoError {
            message: format!("failed to create {}", parent.display()),
            source: e,
        })?;
    }
    std::fs::write(path, text).map_err(|e| CliError::IoError {
        message: format!("failed to write {}", path.display()),
        source: e,
    })
}

fn unknown_key(key: &str) -> CliError {
    CliError::config(format!(
        "unknown config key '{key}' (known keys: {})",
        KEYS.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_write_the_answers_file() {
        let cfg = AppConfig::default();
        assert!(cfg.templates.answers_file);
        assert!(!cfg.output.no_color);
        assert!(cfg.user_defaults().is_empty());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[defaults]\nauthor_username = \"octo\"\n").unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.defaults.author_username.as_deref(), Some("octo"));
        assert!(cfg.templates.answers_file);
        assert_eq!(
            cfg.user_defaults(),
            [("author_username".to_string(), Value::from("octo"))]
        );
    }

    #[test]
    fn get_known_and_unknown_keys() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.get("output.no_color").unwrap(), "false");
        assert_eq!(cfg.get("templates.answers_file").unwrap(), "true");
        assert!(matches!(
            cfg.get("defaults.lang"),
            Err(CliError::ConfigError { .. })
        ));
    }

    #[test]
    fn set_creates_and_updates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        set_in_file(&path, "defaults.author_username", "octo").unwrap();
        set_in_file(&path, "templates.answers_file", "false").unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.defaults.author_username.as_deref(), Some("octo"));
        assert!(!cfg.templates.answers_file);
    }

    #[test]
    fn set_rejects_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(set_in_file(&path, "output.no_color", "maybe").is_err());
        assert!(set_in_file(&path, "defaults.lang", "rust").is_err());
        assert!(!path.exists());
    }
}
