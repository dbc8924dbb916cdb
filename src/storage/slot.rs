//! The durable medium: a single named slot holding the whole collection.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// A get/set pair over one named unit of storage.
///
/// The slot holds the entire serialized collection; there is no per-record
/// access.
pub trait Slot {
    /// Reads the slot.
    ///
    /// Returns `Ok(None)` if nothing has been written yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium exists but cannot be read.
    fn get(&self) -> io::Result<Option<Vec<u8>>>;

    /// Replaces the slot's contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the write did not complete. The previous contents
    /// must then still be readable.
    fn set(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// A slot backed by a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    /// A slot stored at `path`.
    ///
    /// Nothing is touched until the first read or write.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The file backing this slot.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(ToOwned::to_owned)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Slot for FileSlot {
    fn get(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No store at {}, starting empty", self.path.display());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Writes to a sibling temporary file, then renames it over the slot.
    ///
    /// Parent directories are created automatically if they don't exist.
    fn set(&mut self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let staging = self.staging_path();
        fs::write(&staging, bytes)?;
        fs::rename(&staging, &self.path).inspect_err(|_| {
            let _ = fs::remove_file(&staging);
        })
    }
}

/// An in-memory slot, for tests and embedding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySlot {
    bytes: Option<Vec<u8>>,
}

impl MemorySlot {
    /// An empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: None }
    }

    /// A slot pre-filled with `bytes`.
    #[must_use]
    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Some(bytes.into()),
        }
    }

    /// The current contents, if any.
    #[must_use]
    pub fn contents(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }
}

impl Slot for MemorySlot {
    fn get(&self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.bytes.clone())
    }

    fn set(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.bytes = Some(bytes.to_vec());
        Ok(())
    }
}
