//! Disk-backed [`Filesystem`] on top of `std::fs`.

use std::io;
use std::path::Path;

use kiln_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{KilnError, KilnResult},
};

/// Production filesystem used by `kiln new`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> KilnResult<()> {
        std::fs::create_dir_all(path).map_err(|e| io_failure(path, "create directory", e))
    }

    fn write_file(&self, path: &Path, content: &str) -> KilnResult<()> {
        std::fs::write(path, content).map_err(|e| io_failure(path, "write file", e))
    }

    #[cfg(unix)]
    fn set_permissions(&self, path: &Path, executable: bool) -> KilnResult<()> {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = std::fs::metadata(path)
            .map_err(|e| io_failure(path, "read metadata", e))?
            .permissions();
        let mode = perms.mode();
        perms.set_mode(if executable { mode | 0o111 } else { mode & !0o111 });
        std::fs::set_permissions(path, perms).map_err(|e| io_failure(path, "set permissions", e))
    }

    // No executable bit outside unix; the flag is accepted and dropped.
    #[cfg(not(unix))]
    fn set_permissions(&self, _path: &Path, _executable: bool) -> KilnResult<()> {
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn remove_dir_all(&self, path: &Path) -> KilnResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| io_failure(path, "remove directory", e))
    }
}

fn io_failure(path: &Path, operation: &str, e: io::Error) -> KilnError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("failed to {operation}: {e}"),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFilesystem::new();
        let nested = dir.path().join("pkg/sub");

        fs.create_dir_all(&nested).unwrap();
        fs.write_file(&nested.join("a.py"), "x = 1\n").unwrap();

        assert!(fs.is_dir(&nested));
        assert!(!fs.is_dir(&nested.join("a.py")));
        assert_eq!(std::fs::read_to_string(nested.join("a.py")).unwrap(), "x = 1\n");
    }

    #[cfg(unix)]
    #[test]
    fn toggles_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFilesystem::new();
        let script = dir.path().join("run.sh");
        fs.write_file(&script, "#!/bin/sh\n").unwrap();

        fs.set_permissions(&script, true).unwrap();
        let mode = std::fs::metadata(&script).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);

        fs.set_permissions(&script, false).unwrap();
        let mode = std::fs::metadata(&script).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0);
    }

    #[test]
    fn write_into_missing_directory_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing/file.txt");
        let err = LocalFilesystem::new().write_file(&target, "x").unwrap_err();
        assert!(matches!(
            err,
            KilnError::Application(ApplicationError::FilesystemError { ref path, .. }) if *path == target
        ));
    }
}
