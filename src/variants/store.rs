//! Where the variants file lives.

use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{Error, Result};

/// Storage of the rendered variants module.
pub trait VariantsStore {
    /// Returns the stored text, or `None` if nothing was stored yet.
    fn load(&self) -> Result<Option<String>>;

    /// Replaces the stored text.
    fn save(&mut self, contents: &str) -> Result<()>;
}

// ============================================================================
// FileStore
// ============================================================================

/// Stores the module in a file, creating parent directories on save.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VariantsStore for FileStore {
    fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }

    fn save(&mut self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(&self.path, contents).map_err(|e| Error::io(&self.path, e))
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    contents: Rc<RefCell<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `contents`.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Rc::new(RefCell::new(Some(contents.into()))),
        }
    }

    /// The last saved text.
    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl VariantsStore for MemoryStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.contents())
    }

    fn save(&mut self, contents: &str) -> Result<()> {
        *self.contents.borrow_mut() = Some(contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("variants.js"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn save_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("src/icons/variants.js"));
        store.save("export {};").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("export {};"));
    }

    #[test]
    fn memory_clones_share_contents() {
        let store = MemoryStore::new();
        let mut writer = store.clone();
        writer.save("x").unwrap();
        assert_eq!(store.contents().as_deref(), Some("x"));
    }
}
