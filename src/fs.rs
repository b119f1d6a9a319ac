//! File system access injected into the locator and updaters.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use walkdir::WalkDir;

/// Read/write/exists/mkdir plus a recursive listing used for glob expansion
pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Every regular file below `root`, in a stable order
    fn list_files(&self, root: &Path) -> io::Result<Vec<PathBuf>>;
}

/// The real file system
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn list_files(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(io::Error::other)?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

/// In-memory file system for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: Mutex<BTreeMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        if let Ok(mut files) = self.files.lock() {
            files.insert(path.into(), contents.into());
        }
        self
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.lock().ok()?.get(path.as_ref()).cloned()
    }

    fn poisoned() -> io::Error {
        io::Error::other("memory file system lock poisoned")
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let files = self.files.lock().map_err(|_| Self::poisoned())?;
        files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut files = self.files.lock().map_err(|_| Self::poisoned())?;
        files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files
            .lock()
            .map(|files| files.keys().any(|p| p == path || p.starts_with(path)))
            .unwrap_or(false)
    }

    fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }

    fn list_files(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let files = self.files.lock().map_err(|_| Self::poisoned())?;
        Ok(files
            .keys()
            .filter(|p| p.starts_with(root))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_os_file_system_lists_nested_files() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("locales/en");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("common.json"), "{}").unwrap();
        std::fs::write(temp_dir.path().join("README.md"), "docs").unwrap();

        let files = OsFileSystem.list_files(temp_dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|p| p.ends_with("locales/en/common.json")));
    }

    #[test]
    fn test_memory_file_system_round_trip() {
        let fs = MemoryFileSystem::new().with_file("/app/locales/en.json", "{}");
        assert!(fs.exists(Path::new("/app/locales/en.json")));
        assert!(fs.exists(Path::new("/app/locales")));
        assert!(!fs.exists(Path::new("/app/locales/fr.json")));

        fs.write(Path::new("/app/locales/fr.json"), "{\"a\": 1}")
            .unwrap();
        assert_eq!(fs.get("/app/locales/fr.json").unwrap(), "{\"a\": 1}");
        assert_eq!(fs.list_files(Path::new("/app")).unwrap().len(), 2);
        assert!(fs.read_to_string(Path::new("/nope")).is_err());
    }
}
