// std imports
use std::fs::{create_dir_all, read_dir, write};
use std::path::{Path, PathBuf};

// 3rd party imports
use anyhow::{bail, Context, Result};

/// Resolves uploaded files of a session to their location on disk
///
pub trait FileStore: Send + Sync {
    /// Returns the path of the file or `None` if the session has no such file
    ///
    /// # Arguments
    /// * `session_id` - Session ID
    /// * `file_id` - File ID
    ///
    fn resolve(&self, session_id: &str, file_id: &str) -> Result<Option<PathBuf>>;
}

/// Keeps each file in its own directory `root/<session_id>/<file_id>/<file name>`
///
pub struct DirectoryFileStore {
    root: PathBuf,
}

impl DirectoryFileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Stores a file, an existing file with the same ID is replaced
    ///
    /// # Arguments
    /// * `session_id` - Session ID
    /// * `file_id` - File ID
    /// * `file_name` - Original file name, the extension selects the reader
    /// * `content` - File content
    ///
    pub fn add_file(
        &self,
        session_id: &str,
        file_id: &str,
        file_name: &str,
        content: &[u8],
    ) -> Result<PathBuf> {
        for id in [session_id, file_id] {
            if id.is_empty() || id.contains(['/', '\\']) || id == ".." {
                bail!("Invalid ID `{}`", id);
            }
        }
        let file_name = match Path::new(file_name).file_name() {
            Some(file_name) => file_name,
            None => bail!("Invalid file name `{}`", file_name),
        };
        let file_dir = self.root.join(session_id).join(file_id);
        if file_dir.is_dir() {
            std::fs::remove_dir_all(&file_dir)?;
        }
        create_dir_all(&file_dir)
            .with_context(|| format!("Cannot create {}", file_dir.display()))?;
        let path = file_dir.join(file_name);
        write(&path, content)?;
        Ok(path)
    }
}

impl FileStore for DirectoryFileStore {
    fn resolve(&self, session_id: &str, file_id: &str) -> Result<Option<PathBuf>> {
        if [session_id, file_id]
            .iter()
            .any(|id| id.contains(['/', '\\']) || *id == "..")
        {
            return Ok(None);
        }
        let file_dir = self.root.join(session_id).join(file_id);
        if !file_dir.is_dir() {
            return Ok(None);
        }
        for entry in read_dir(&file_dir)? {
            let path = entry?.path();
            if path.is_file() {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod test {
    // 3rd party imports
    use tempfile::tempdir;

    // internal imports
    use super::*;

    #[test]
    fn test_add_and_resolve() {
        let root = tempdir().unwrap();
        let store = DirectoryFileStore::new(root.path().to_path_buf());
        let path = store
            .add_file("session", "file1", "peptides.csv", b"start,end\n1,5\n")
            .unwrap();
        assert_eq!(store.resolve("session", "file1").unwrap(), Some(path));
        assert_eq!(store.resolve("session", "file2").unwrap(), None);
        assert_eq!(store.resolve("other", "file1").unwrap(), None);
        assert_eq!(store.resolve("..", "file1").unwrap(), None);
    }

    #[test]
    fn test_invalid_ids() {
        let root = tempdir().unwrap();
        let store = DirectoryFileStore::new(root.path().to_path_buf());
        assert!(store.add_file("../escape", "file1", "a.csv", b"").is_err());
        assert!(store.add_file("session", "", "a.csv", b"").is_err());
    }
}
