use hashbrown::HashMap as FastHashMap;
use parking_lot::RwLock;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("artifact store I/O failed for '{key}' at {path}: {source}")]
    Io {
        key: String,
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("cannot create artifact directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },
}

/// Keyed storage for serialized dispatch programs. Payloads are opaque text;
/// decoding and validation happen in the dispatcher.
pub trait ArtifactStore: Send + Sync + fmt::Debug {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn store(&self, key: &str, artifact: &str) -> Result<(), StoreError>;
    /// Returns whether an entry existed.
    fn remove(&self, key: &str) -> Result<bool, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    entries: RwLock<FastHashMap<String, String>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn store(&self, key: &str, artifact: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .insert(key.to_string(), artifact.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.write().remove(key).is_some())
    }
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    dir: PathBuf,
}

impl FileArtifactStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| StoreError::CreateDir {
            path: dir.clone(),
            source: Arc::new(err),
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("routes-{safe}.json"))
    }

    fn io_error(key: &str, path: &Path, source: io::Error) -> StoreError {
        StoreError::Io {
            key: key.to_string(),
            path: path.to_path_buf(),
            source: Arc::new(source),
        }
    }
}

impl ArtifactStore for FileArtifactStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Self::io_error(key, &path, err)),
        }
    }

    fn store(&self, key: &str, artifact: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        // readers never observe a half-written file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, artifact).map_err(|err| Self::io_error(key, &tmp, err))?;
        fs::rename(&tmp, &path).map_err(|err| Self::io_error(key, &path, err))
    }

    fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(Self::io_error(key, &path, err)),
        }
    }
}
