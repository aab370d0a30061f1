use crate::domain::{
    entities::common::{Permissions, RelativePath},
    error::DomainError,
};

/// Composed project, ready for materialization.
///
/// Ordered as the catalog is. Contains no business logic, only data; paths
/// are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputFileSet {
    files: Vec<OutputFile>,
}

impl OutputFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file. A second file with the same path is rejected.
    pub fn push(&mut self, file: OutputFile) -> Result<(), DomainError> {
        if self.files.iter().any(|f| f.path == file.path) {
            return Err(DomainError::DuplicatePath {
                path: file.path.to_string(),
            });
        }
        self.files.push(file);
        Ok(())
    }

    pub fn files(&self) -> impl Iterator<Item = &OutputFile> {
        self.files.iter()
    }

    /// Forward-slash paths in output order.
    pub fn paths(&self) -> impl Iterator<Item = String> + '_ {
        self.files.iter().map(|f| f.path.as_str())
    }

    pub fn get(&self, path: &str) -> Option<&OutputFile> {
        self.files.iter().find(|f| f.path.as_str() == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(OutputFile::size).sum()
    }
}

impl IntoIterator for OutputFileSet {
    type Item = OutputFile;
    type IntoIter = std::vec::IntoIter<OutputFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputFile {
    pub path: RelativePath,
    pub content: String,
    pub permissions: Permissions,
}

impl OutputFile {
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> RelativePath {
        RelativePath::try_new(p).unwrap()
    }

    fn file(p: &str, content: &str) -> OutputFile {
        OutputFile {
            path: path(p),
            content: content.into(),
            permissions: Permissions::read_write(),
        }
    }

    #[test]
    fn keeps_insertion_order() {
        let mut set = OutputFileSet::new();
        set.push(file("README.md", "# x")).unwrap();
        set.push(file("pkg/main.py", "")).unwrap();
        assert_eq!(set.paths().collect::<Vec<_>>(), ["README.md", "pkg/main.py"]);
        assert_eq!(set.total_bytes(), 3);
        assert!(set.get("pkg/main.py").unwrap().is_empty());
    }

    #[test]
    fn rejects_duplicate_paths() {
        let mut set = OutputFileSet::new();
        set.push(file("a.txt", "")).unwrap();
        assert_eq!(
            set.push(file("./a.txt", "")),
            Err(DomainError::DuplicatePath {
                path: "a.txt".into()
            })
        );
        assert_eq!(set.len(), 1);
    }
}
