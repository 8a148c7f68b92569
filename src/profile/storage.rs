use std::{
    collections::{BTreeMap, HashMap},
    fmt, fs,
    io::{BufWriter, Write},
    path::PathBuf,
    sync::{Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};

const STORE_VERSION: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageError {
    pub key: Option<String>,
    pub message: String,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            key: None,
            message: message.into(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{} (key={})", self.message, key),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for StorageError {}

/// String-keyed persistent storage. No transactions, no queries.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// All keys in one versioned JSON document, replaced atomically on every write.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    version: u64,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<StoreDocument, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoreDocument {
                    version: STORE_VERSION,
                    entries: BTreeMap::new(),
                });
            }
            Err(err) => {
                return Err(StorageError::new(format!(
                    "failed to read store '{}': {err}",
                    self.path.display()
                )));
            }
        };

        let document: StoreDocument = serde_json::from_str(&content).map_err(|err| {
            StorageError::new(format!(
                "failed to parse store '{}': {err}",
                self.path.display()
            ))
        })?;
        if document.version != STORE_VERSION {
            return Err(StorageError::new(format!(
                "unsupported store version {} at '{}'",
                document.version,
                self.path.display()
            )));
        }

        Ok(document)
    }

    fn save(&self, document: &StoreDocument) -> Result<(), StorageError> {
        let parent = self.path.parent().ok_or_else(|| {
            StorageError::new(format!("store path '{}' has no parent", self.path.display()))
        })?;
        fs::create_dir_all(parent).map_err(|err| {
            StorageError::new(format!(
                "failed to create store directory '{}': {err}",
                parent.display()
            ))
        })?;

        let tmp_path = self.path.with_extension("tmp");
        let file = fs::File::create(&tmp_path).map_err(|err| {
            StorageError::new(format!(
                "failed to create store temp file '{}': {err}",
                tmp_path.display()
            ))
        })?;
        {
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, document).map_err(|err| {
                StorageError::new(format!(
                    "failed to serialize store '{}': {err}",
                    tmp_path.display()
                ))
            })?;
            writer.write_all(b"\n").map_err(|err| {
                StorageError::new(format!(
                    "failed to finalize store '{}': {err}",
                    tmp_path.display()
                ))
            })?;
            writer.flush().map_err(|err| {
                StorageError::new(format!(
                    "failed to flush store '{}': {err}",
                    tmp_path.display()
                ))
            })?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|err| {
            StorageError::new(format!(
                "failed to replace store '{}' from '{}': {err}",
                self.path.display(),
                tmp_path.display()
            ))
        })
    }

    fn update(
        &self,
        key: &str,
        apply: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), StorageError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut document = self.load().map_err(|err| err.with_key(key))?;
        apply(&mut document.entries);
        document.version = STORE_VERSION;
        self.save(&document).map_err(|err| err.with_key(key))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let document = self.load().map_err(|err| err.with_key(key))?;
        Ok(document.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(key, |entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(key, |entries| {
            entries.remove(key);
        })
    }
}
