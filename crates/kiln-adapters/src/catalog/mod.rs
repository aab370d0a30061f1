//! Catalog sources: the embedded catalog and catalog directories.

pub mod builtin;
pub mod loader;
pub mod manifest;

use std::{path::Path, sync::Arc};

use tracing::debug;

use kiln_core::domain::{DomainError, TemplateCatalog};

pub use builtin::{BUILTIN_PYTHON, builtin_catalog};
pub use loader::CatalogDirLoader;
pub use manifest::{CatalogManifest, build_catalog};

/// Resolve `--catalog`: a built-in name, otherwise a catalog directory.
/// `None` selects the built-in Python catalog.
pub fn resolve_catalog(name_or_dir: Option<&str>) -> Result<Arc<TemplateCatalog>, DomainError> {
    match name_or_dir {
        None => builtin::shared(),
        Some(name) if builtin::is_builtin(name) => builtin::shared(),
        Some(dir) => {
            debug!(dir, "loading catalog directory");
            CatalogDirLoader::new(Path::new(dir)).load().map(Arc::new)
        }
    }
}
