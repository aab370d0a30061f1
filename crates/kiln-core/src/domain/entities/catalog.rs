//! The template catalog aggregate.
//!
//! A catalog pairs a [`Questionnaire`] with an ordered list of
//! [`CatalogEntry`] values. It is parsed and checked once at load time and is
//! read-only afterwards, so hosts share it behind an `Arc` and may compose
//! from several threads at once.

use std::collections::HashSet;
use std::fmt;

use crate::domain::{
    entities::{common::Permissions, questionnaire::Questionnaire},
    error::DomainError,
    template::{Condition, Pattern},
};

// ============================================================================
// CatalogId
// ============================================================================

/// `name@version` identity of a catalog, e.g. `python@1.0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogId {
    name: String,
    version: String,
}

impl CatalogId {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Parse from `name@version`.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.split_once('@') {
            Some((name, version))
                if !name.is_empty() && !version.is_empty() && !version.contains('@') =>
            {
                Ok(Self::new(name, version))
            }
            _ => Err(DomainError::InvalidCatalog(format!(
                "invalid catalog id '{s}', expected 'name@version'"
            ))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

// ============================================================================
// CatalogEntry
// ============================================================================

/// One candidate output file: where it goes, what it contains, and when it
/// is included at all.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Source name inside the catalog, used in listings and error messages.
    pub source: String,
    pub path: Pattern,
    pub content: Pattern,
    pub guard: Option<Condition>,
    pub permissions: Permissions,
}

impl CatalogEntry {
    pub fn new(source: impl Into<String>, path: Pattern, content: Pattern) -> Self {
        Self {
            source: source.into(),
            path,
            content,
            guard: None,
            permissions: Permissions::read_write(),
        }
    }

    pub fn with_guard(mut self, guard: Condition) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn executable(mut self) -> Self {
        self.permissions = Permissions::executable();
        self
    }

    /// Every answer key the entry can read through its guard, path or
    /// content.
    pub fn variables(&self) -> std::collections::BTreeSet<String> {
        let mut vars = self.path.variables();
        vars.extend(self.content.variables());
        if let Some(guard) = &self.guard {
            vars.extend(guard.variables());
        }
        vars
    }
}

// ============================================================================
// TemplateCatalog
// ============================================================================

#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    id: CatalogId,
    description: String,
    questionnaire: Questionnaire,
    entries: Vec<CatalogEntry>,
}

impl TemplateCatalog {
    pub fn builder() -> TemplateCatalogBuilder {
        TemplateCatalogBuilder::default()
    }

    pub fn id(&self) -> &CatalogId {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Validate all load-time invariants.
    ///
    /// 1. the id has a name without `@`
    /// 2. at least one entry
    /// 3. no two entries share a source name
    /// 4. every key read by an entry is a question of the questionnaire
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.id.name().is_empty() || self.id.name().contains('@') {
            return Err(DomainError::InvalidCatalog(format!(
                "invalid catalog name '{}'",
                self.id.name()
            )));
        }

        if self.entries.is_empty() {
            return Err(DomainError::EmptyCatalog {
                catalog_id: self.id.to_string(),
            });
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.source.as_str()) {
                return Err(DomainError::InvalidCatalog(format!(
                    "entry '{}' is declared twice",
                    entry.source
                )));
            }
            if let Some(key) = entry
                .variables()
                .into_iter()
                .find(|k| !self.questionnaire.contains(k))
            {
                return Err(DomainError::InvalidCatalog(format!(
                    "entry '{}' reads '{key}', which is not a question of {}",
                    entry.source, self.id
                )));
            }
        }

        Ok(())
    }
}

/// Builder for [`TemplateCatalog`]; `build()` runs [`TemplateCatalog::validate`].
#[derive(Default)]
pub struct TemplateCatalogBuilder {
    id: Option<CatalogId>,
    description: String,
    questionnaire: Questionnaire,
    entries: Vec<CatalogEntry>,
}

impl TemplateCatalogBuilder {
    pub fn id(mut self, id: CatalogId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn questionnaire(mut self, questionnaire: Questionnaire) -> Self {
        self.questionnaire = questionnaire;
        self
    }

    pub fn add_entry(mut self, entry: CatalogEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn entries(mut self, entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        self.entries.extend(entries);
        self
    }

    pub fn build(self) -> Result<TemplateCatalog, DomainError> {
        let catalog = TemplateCatalog {
            id: self
                .id
                .ok_or_else(|| DomainError::InvalidCatalog("catalog id is required".into()))?,
            description: self.description,
            questionnaire: self.questionnaire,
            entries: self.entries,
        };
        catalog.validate()?;
        Ok(catalog)
    }
}
