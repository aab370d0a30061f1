//! Generate Service - main application orchestrator.
//!
//! Coordinates the whole workflow for one catalog:
//! 1. Collect answers (via an `AnswerSource`)
//! 2. Compose the output file set (pure domain)
//! 3. Write it to a `Filesystem`, answers record last

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{AnswerSource, Filesystem},
        services::collector::AnswerCollector,
    },
    domain::{
        AnswerSet, OutputFile, OutputFileSet, QuestionKind, RelativePath, TemplateCatalog, Value,
        compose,
    },
    error::KilnResult,
};

/// Summary of a catalog for display purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogInfo {
    pub id: String,
    pub description: String,
    pub questions: usize,
    pub entries: usize,
}

/// One question, flattened for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionInfo {
    pub key: String,
    pub kind: String,
    pub prompt: String,
    pub default: Option<String>,
    pub choices: Vec<String>,
    pub when: Option<String>,
}

/// One catalog entry, flattened for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub source: String,
    pub path: String,
    pub when: Option<String>,
    pub executable: bool,
}

/// Host-rendered record of the answers, written after every output file.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswersRecord {
    pub file_name: RelativePath,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateOptions {
    /// Replace files that already exist at output paths.
    pub overwrite: bool,
    pub answers_record: Option<AnswersRecord>,
    /// Remove the destination root again when this write created it and a
    /// later step failed. A root that already existed is never touched.
    pub remove_created_root: bool,
}

/// What a write produced.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateReport {
    pub root: PathBuf,
    pub written: Vec<RelativePath>,
    pub answers_record: Option<RelativePath>,
}

impl GenerateReport {
    pub fn file_count(&self) -> usize {
        self.written.len() + usize::from(self.answers_record.is_some())
    }
}

/// Main generation service.
pub struct GenerateService {
    catalog: Arc<TemplateCatalog>,
    filesystem: Box<dyn Filesystem>,
}

impl GenerateService {
    pub fn new(catalog: Arc<TemplateCatalog>, filesystem: Box<dyn Filesystem>) -> Self {
        Self {
            catalog,
            filesystem,
        }
    }

    pub fn catalog(&self) -> &Arc<TemplateCatalog> {
        &self.catalog
    }

    /// Collect an answer set from `source`, with configuration-supplied
    /// `user_defaults` taking precedence over question defaults.
    pub fn collect<I>(&self, source: &mut dyn AnswerSource, user_defaults: I) -> KilnResult<AnswerSet>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        AnswerCollector::new(self.catalog.questionnaire())
            .with_user_defaults(user_defaults)
            .collect(source)
    }

    /// Compose without touching the filesystem.
    pub fn plan(&self, answers: &AnswerSet) -> KilnResult<OutputFileSet> {
        let plan = compose(&self.catalog, answers)?;
        info!(files = plan.len(), bytes = plan.total_bytes(), "project composed");
        Ok(plan)
    }

    /// Check the destination before anything is written.
    ///
    /// The root must be a directory or absent. Without `overwrite`, no output
    /// path (nor the answers record) may already exist.
    pub fn preflight(
        &self,
        root: &Path,
        plan: &OutputFileSet,
        options: &GenerateOptions,
    ) -> KilnResult<()> {
        if self.filesystem.exists(root) && !self.filesystem.is_dir(root) {
            return Err(ApplicationError::DestinationNotDirectory {
                path: root.to_path_buf(),
            }
            .into());
        }

        if options.overwrite {
            return Ok(());
        }

        let record = options.answers_record.as_ref().map(|r| &r.file_name);
        for path in plan.files().map(|f| &f.path).chain(record) {
            let target = root.join(path);
            if self.filesystem.exists(&target) {
                return Err(ApplicationError::DestinationCollision { path: target }.into());
            }
        }
        Ok(())
    }

    /// Write `plan` under `root`.
    pub fn write(
        &self,
        root: &Path,
        plan: &OutputFileSet,
        options: &GenerateOptions,
    ) -> KilnResult<GenerateReport> {
        self.write_with(root, plan, options, |_| {})
    }

    /// Write `plan` under `root`, calling `on_written` after each file.
    ///
    /// Files already written stay on disk if a later write fails, unless
    /// `options.remove_created_root` is set and `root` did not exist before.
    #[instrument(skip_all, fields(root = %root.display(), files = plan.len()))]
    pub fn write_with<F>(
        &self,
        root: &Path,
        plan: &OutputFileSet,
        options: &GenerateOptions,
        on_written: F,
    ) -> KilnResult<GenerateReport>
    where
        F: FnMut(&OutputFile),
    {
        self.preflight(root, plan, options)?;
        let created_root = !self.filesystem.exists(root);

        let result = self.write_files(root, plan, options, on_written);
        if result.is_err() && created_root && options.remove_created_root {
            match self.filesystem.remove_dir_all(root) {
                Ok(()) => warn!("removed partially generated project"),
                Err(e) => warn!(error = %e, "could not remove partial output"),
            }
        }
        result
    }

    fn write_files<F>(
        &self,
        root: &Path,
        plan: &OutputFileSet,
        options: &GenerateOptions,
        mut on_written: F,
    ) -> KilnResult<GenerateReport>
    where
        F: FnMut(&OutputFile),
    {
        self.filesystem.create_dir_all(root)?;

        let mut written = Vec::with_capacity(plan.len());
        for file in plan.files() {
            let path = root.join(&file.path);
            if let Some(parent) = path.parent() {
                self.filesystem.create_dir_all(parent)?;
            }
            self.filesystem.write_file(&path, &file.content)?;
            if file.permissions.executable_flag() {
                self.filesystem.set_permissions(&path, true)?;
            }
            debug!(path = %file.path, "written");
            written.push(file.path.clone());
            on_written(file);
        }

        let answers_record = match &options.answers_record {
            Some(record) => {
                let path = root.join(&record.file_name);
                if let Some(parent) = path.parent() {
                    self.filesystem.create_dir_all(parent)?;
                }
                self.filesystem.write_file(&path, &record.content)?;
                Some(record.file_name.clone())
            }
            None => None,
        };

        info!(files = written.len(), "project written");
        Ok(GenerateReport {
            root: root.to_path_buf(),
            written,
            answers_record,
        })
    }

    /// Compose and write in one go.
    pub fn generate(
        &self,
        root: &Path,
        answers: &AnswerSet,
        options: &GenerateOptions,
    ) -> KilnResult<GenerateReport> {
        let plan = self.plan(answers)?;
        self.write(root, &plan, options)
    }

    // -------------------------------------------------------------------------
    // Listings
    // -------------------------------------------------------------------------

    pub fn catalog_info(&self) -> CatalogInfo {
        CatalogInfo {
            id: self.catalog.id().to_string(),
            description: self.catalog.description().to_string(),
            questions: self.catalog.questionnaire().len(),
            entries: self.catalog.entry_count(),
        }
    }

    pub fn list_questions(&self) -> Vec<QuestionInfo> {
        self.catalog
            .questionnaire()
            .iter()
            .map(|q| QuestionInfo {
                key: q.key.clone(),
                kind: q.kind.to_string(),
                prompt: q.prompt.clone(),
                default: q.default.as_ref().map(ToString::to_string),
                choices: match &q.kind {
                    QuestionKind::Choice(choices) => choices.clone(),
                    _ => Vec::new(),
                },
                when: q.when.as_ref().map(ToString::to_string),
            })
            .collect()
    }

    pub fn list_entries(&self) -> Vec<EntryInfo> {
        self.catalog
            .entries()
            .iter()
            .map(|e| EntryInfo {
                source: e.source.clone(),
                path: e.path.source().to_string(),
                when: e.guard.as_ref().map(ToString::to_string),
                executable: e.permissions.executable_flag(),
            })
            .collect()
    }
}
