//! Read-only virtual filesystem seen by the tileset scanner.
//!
//! Paths are `/`-separated and relative to the mount root.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    #[error("`{0}` not found")]
    NotFound(String),

    #[error("`{0}` leaves the mount root")]
    OutsideRoot(String),

    #[error("`{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub trait Vfs: Send + Sync {
    /// Names of the files directly inside `path`, in no particular order.
    fn list_directory(&self, path: &str) -> Result<Vec<String>, VfsError>;

    /// Opens `path` for reading.
    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>, VfsError>;
}

/// Joins a directory and an entry name.
pub fn join(base: &str, name: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{base}/{name}")
    }
}

// ── DirVfs ────────────────────────────────────────────────────────────────

/// A VFS backed by a host directory.
#[derive(Debug, Clone)]
pub struct DirVfs {
    root: PathBuf,
}

impl DirVfs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, VfsError> {
        let rel = Path::new(path.trim_start_matches('/'));
        if rel.components().any(|c| !matches!(c, Component::Normal(_) | Component::CurDir)) {
            return Err(VfsError::OutsideRoot(path.to_string()));
        }
        Ok(self.root.join(rel))
    }

    fn io_error(path: &str, source: std::io::Error) -> VfsError {
        if source.kind() == std::io::ErrorKind::NotFound {
            VfsError::NotFound(path.to_string())
        } else {
            VfsError::Io { path: path.to_string(), source }
        }
    }
}

impl Vfs for DirVfs {
    fn list_directory(&self, path: &str) -> Result<Vec<String>, VfsError> {
        let dir = self.resolve(path)?;
        let entries = std::fs::read_dir(&dir).map_err(|e| Self::io_error(path, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Self::io_error(path, e))?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => log::warn!("ignoring non-UTF-8 file name {raw:?} in `{path}`"),
            }
        }
        Ok(names)
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>, VfsError> {
        let file = File::open(self.resolve(path)?).map_err(|e| Self::io_error(path, e))?;
        Ok(Box::new(file))
    }
}

// ── MemoryVfs ─────────────────────────────────────────────────────────────

/// An in-memory VFS. Listing order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryVfs {
    files: Vec<(String, Vec<u8>)>,
}

impl MemoryVfs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a file.
    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let path = path.into();
        let bytes = bytes.into();
        match self.files.iter_mut().find(|(p, _)| *p == path) {
            Some(slot) => slot.1 = bytes,
            None => self.files.push((path, bytes)),
        }
    }

    pub fn with_file(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }
}

impl Vfs for MemoryVfs {
    fn list_directory(&self, path: &str) -> Result<Vec<String>, VfsError> {
        let prefix = join(path, "");
        let names: Vec<String> = self
            .files
            .iter()
            .filter_map(|(p, _)| p.strip_prefix(&prefix))
            .filter(|rest| !rest.is_empty() && !rest.contains('/'))
            .map(str::to_string)
            .collect();
        if names.is_empty() {
            return Err(VfsError::NotFound(path.to_string()));
        }
        Ok(names)
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>, VfsError> {
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, bytes)| Box::new(Cursor::new(bytes.clone())) as Box<dyn Read + Send>)
            .ok_or_else(|| VfsError::NotFound(path.to_string()))
    }
}
