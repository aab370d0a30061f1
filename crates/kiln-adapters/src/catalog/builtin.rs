//! The catalog shipped inside the binary.

use std::sync::Arc;

use kiln_core::domain::{DomainError, TemplateCatalog};

use super::manifest::build_catalog;

/// Id of the embedded Python catalog.
pub const BUILTIN_PYTHON: &str = "python@1.0.0";

macro_rules! embedded {
    ($($rel:literal),+ $(,)?) => {
        &[$(($rel, include_str!(concat!("../../catalog/python/template/", $rel)))),+]
    };
}

const MANIFEST: &str = include_str!("../../catalog/python/catalog.toml");

const SOURCES: &[(&str, &str)] = embedded![
    ".github/workflows/pre-commit.yaml",
    ".github/workflows/release.yaml",
    ".github/workflows/test.yaml",
    "Dockerfile",
    "Makefile",
    "README.md",
    "env.example",
    "gitignore",
    "pre-commit-config.yaml",
    "pyproject.toml",
    "scripts/bootstrap.sh",
    "tests/__init__.py",
    "tests/test_main.py",
    "{{package_name}}/__init__.py",
    "{{package_name}}/main.py",
    "{{package_name}}/settings.py",
];

/// Parse the embedded Python catalog.
pub fn builtin_catalog() -> Result<TemplateCatalog, DomainError> {
    build_catalog(MANIFEST, SOURCES.iter().copied())
}

/// Names accepted for the embedded catalog: `python` or `python@1.0.0`.
pub fn is_builtin(name: &str) -> bool {
    name == BUILTIN_PYTHON || BUILTIN_PYTHON.split('@').next() == Some(name)
}

/// Shared handle to the embedded catalog.
pub fn shared() -> Result<Arc<TemplateCatalog>, DomainError> {
    builtin_catalog().map(Arc::new)
}
