//! Loading a catalog from a directory on disk.
//!
//! ```text
//! my-catalog/
//! ├── catalog.toml     ← manifest (required)
//! └── template/        ← one source per output file
//!     ├── README.md
//!     └── {{package_name}}/
//!         └── main.py
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{info, instrument};
use walkdir::WalkDir;

use kiln_core::domain::{DomainError, TemplateCatalog};

use super::manifest::build_catalog;

pub const MANIFEST_FILE: &str = "catalog.toml";
pub const TEMPLATE_DIR: &str = "template";

/// Reads `catalog.toml` and every file below `template/`.
pub struct CatalogDirLoader {
    root: PathBuf,
}

impl CatalogDirLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    #[instrument(skip(self), fields(dir = %self.root.display()))]
    pub fn load(&self) -> Result<TemplateCatalog, DomainError> {
        let manifest_path = self.root.join(MANIFEST_FILE);
        let manifest = fs::read_to_string(&manifest_path).map_err(|e| {
            DomainError::InvalidCatalog(format!(
                "failed to read '{}': {e}",
                manifest_path.display()
            ))
        })?;

        let sources = self.read_sources()?;
        let catalog = build_catalog(&manifest, sources)?;
        info!(id = %catalog.id(), entries = catalog.entry_count(), "catalog loaded");
        Ok(catalog)
    }

    fn read_sources(&self) -> Result<Vec<(String, String)>, DomainError> {
        let template_dir = self.root.join(TEMPLATE_DIR);
        if !template_dir.is_dir() {
            return Err(DomainError::InvalidCatalog(format!(
                "missing {TEMPLATE_DIR}/ directory in '{}'",
                self.root.display()
            )));
        }

        let mut sources = Vec::new();
        for walk_entry in WalkDir::new(&template_dir)
            .min_depth(1)
            .sort_by_file_name()
        {
            let walk_entry = walk_entry
                .map_err(|e| DomainError::InvalidCatalog(format!("directory walk error: {e}")))?;
            if !walk_entry.file_type().is_file() {
                continue;
            }

            let rel = walk_entry
                .path()
                .strip_prefix(&template_dir)
                .map_err(|_| {
                    DomainError::InvalidCatalog(format!(
                        "'{}' is outside '{}'",
                        walk_entry.path().display(),
                        template_dir.display()
                    ))
                })?;
            let name = normalize_path(rel);

            let content = fs::read_to_string(walk_entry.path()).map_err(|e| {
                DomainError::InvalidCatalog(format!("failed to read '{name}': {e}"))
            })?;
            sources.push((name, content));
        }
        Ok(sources)
    }
}

/// Forward-slash form of a relative path, whatever the host separator.
fn normalize_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
