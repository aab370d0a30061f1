//! Driven (output) ports - implemented by infrastructure.

use std::path::Path;

use crate::domain::{Question, Value};
use crate::error::KilnResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `kiln_adapters::filesystem::LocalFilesystem` (production)
/// - `kiln_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> KilnResult<()>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &str) -> KilnResult<()>;

    /// Set or clear the executable bit.
    fn set_permissions(&self, path: &Path, executable: bool) -> KilnResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> KilnResult<()>;
}

/// Port for obtaining answers, one question at a time.
///
/// Implemented by:
/// - `kiln_adapters::answers::MapAnswerSource` (pre-supplied record)
/// - `kiln_adapters::answers::LayeredAnswerSource` (record over a prompt)
/// - the terminal prompt in `kiln-cli`
pub trait AnswerSource {
    /// Interactive sources are re-asked after a validation failure;
    /// non-interactive ones fail the run.
    fn is_interactive(&self) -> bool;

    /// Ask `question`.
    ///
    /// `default` is the resolved default shown to the user. `error` is set
    /// when re-asking after an invalid answer. `Ok(None)` means "no answer,
    /// use the default".
    fn ask(
        &mut self,
        question: &Question,
        default: Option<&Value>,
        error: Option<&str>,
    ) -> KilnResult<Option<Value>>;

    /// Keys this source was pre-supplied with, checked against the
    /// questionnaire before asking anything.
    fn provided_keys(&self) -> Vec<String> {
        Vec::new()
    }
}
