//! Infrastructure adapters for kiln.
//!
//! This crate implements the ports defined in `kiln-core::application::ports`
//! and owns every piece of I/O the core stays free of:
//!
//! - [`filesystem`]: local disk and in-memory [`Filesystem`](kiln_core::application::Filesystem)s
//! - [`catalog`]: `catalog.toml` parsing, catalog directories and the
//!   embedded `python@1.0.0` catalog
//! - [`answers`]: `--data` / `--data-file` answer sources and the answers
//!   record

pub mod answers;
pub mod catalog;
pub mod filesystem;

pub use answers::{LayeredAnswerSource, MapAnswerSource};
pub use catalog::{BUILTIN_PYTHON, CatalogDirLoader, builtin_catalog, resolve_catalog};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
