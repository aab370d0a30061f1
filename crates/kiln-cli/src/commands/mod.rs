pub mod completions;
pub mod config;
pub mod init;
pub mod list;
pub mod new;

use std::sync::Arc;

use kiln_adapters::resolve_catalog;
use kiln_core::domain::TemplateCatalog;

use crate::{config::AppConfig, error::CliResult};

/// `--catalog`, else `templates.catalog_path` from config, else the
/// built-in catalog.
pub(crate) fn load_catalog(
    flag: Option<&str>,
    config: &AppConfig,
) -> CliResult<Arc<TemplateCatalog>> {
    let configured = config
        .templates
        .catalog_path
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned());
    Ok(resolve_catalog(flag.or(configured.as_deref()))?)
}
