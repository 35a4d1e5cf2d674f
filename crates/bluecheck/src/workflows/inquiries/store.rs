use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::domain::{Inquiry, InquiryId, InquiryStatus, StatusChange};
use super::repository::{InquiryRepository, RepositoryError};

/// Volatile store keyed by inquiry id.
#[derive(Debug, Default)]
pub struct InMemoryInquiryStore {
    records: RwLock<HashMap<InquiryId, Inquiry>>,
}

impl InMemoryInquiryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store. Later records win when ids repeat.
    pub fn with_records(records: impl IntoIterator<Item = Inquiry>) -> Self {
        let records = records
            .into_iter()
            .map(|inquiry| (inquiry.id.clone(), inquiry))
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<InquiryId, Inquiry>>, RepositoryError> {
        self.records
            .read()
            .map_err(|_| RepositoryError::Unavailable("inquiry store lock poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<InquiryId, Inquiry>>, RepositoryError> {
        self.records
            .write()
            .map_err(|_| RepositoryError::Unavailable("inquiry store lock poisoned".to_string()))
    }

    fn remove(&self, id: &InquiryId) -> Result<Option<Inquiry>, RepositoryError> {
        Ok(self.write()?.remove(id))
    }

    fn restore(&self, inquiry: Inquiry) -> Result<(), RepositoryError> {
        self.write()?.insert(inquiry.id.clone(), inquiry);
        Ok(())
    }
}

fn newest_first(records: &mut [Inquiry]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

impl InquiryRepository for InMemoryInquiryStore {
    fn insert(&self, inquiry: Inquiry) -> Result<Inquiry, RepositoryError> {
        let mut guard = self.write()?;
        if guard.contains_key(&inquiry.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(inquiry.id.clone(), inquiry.clone());
        Ok(inquiry)
    }

    fn fetch(&self, id: &InquiryId) -> Result<Option<Inquiry>, RepositoryError> {
        Ok(self.read()?.get(id).cloned())
    }

    fn list(&self, status: Option<InquiryStatus>) -> Result<Vec<Inquiry>, RepositoryError> {
        let mut records: Vec<Inquiry> = self
            .read()?
            .values()
            .filter(|inquiry| status.map_or(true, |wanted| inquiry.status == wanted))
            .cloned()
            .collect();
        newest_first(&mut records);
        Ok(records)
    }

    fn set_status(
        &self,
        id: &InquiryId,
        status: InquiryStatus,
        at: DateTime<Utc>,
    ) -> Result<StatusChange, RepositoryError> {
        let mut guard = self.write()?;
        let inquiry = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let previous = inquiry.status;
        if previous != status {
            inquiry.status = status;
            inquiry.updated_at = at;
        }
        Ok(StatusChange {
            previous,
            inquiry: inquiry.clone(),
        })
    }

    fn snapshot(&self) -> Result<Vec<Inquiry>, RepositoryError> {
        Ok(self.read()?.values().cloned().collect())
    }
}

/// Store that mirrors every mutation into a JSON file so inquiries survive restarts.
///
/// The file holds one array of records, oldest first. Writes go to a sibling temp file that
/// is renamed over the live file. A failed write rolls the in-memory change back.
#[derive(Debug)]
pub struct JsonFileInquiryStore {
    path: PathBuf,
    memory: InMemoryInquiryStore,
    write_lock: Mutex<()>,
}

impl JsonFileInquiryStore {
    /// Load `path` if it exists, otherwise start empty. The file is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let records = load_records(&path)?;
        info!(path = %path.display(), records = records.len(), "inquiry store opened");

        Ok(Self {
            memory: InMemoryInquiryStore::with_records(records),
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_writes(&self) -> Result<std::sync::MutexGuard<'_, ()>, RepositoryError> {
        self.write_lock
            .lock()
            .map_err(|_| RepositoryError::Unavailable("inquiry file lock poisoned".to_string()))
    }

    fn flush(&self) -> Result<(), RepositoryError> {
        let mut records = self.memory.snapshot()?;
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        write_records(&self.path, &records)?;
        debug!(path = %self.path.display(), records = records.len(), "inquiry store flushed");
        Ok(())
    }
}

impl InquiryRepository for JsonFileInquiryStore {
    fn insert(&self, inquiry: Inquiry) -> Result<Inquiry, RepositoryError> {
        let _writes = self.lock_writes()?;
        let stored = self.memory.insert(inquiry)?;
        if let Err(err) = self.flush() {
            self.memory.remove(&stored.id)?;
            return Err(err);
        }
        Ok(stored)
    }

    fn fetch(&self, id: &InquiryId) -> Result<Option<Inquiry>, RepositoryError> {
        self.memory.fetch(id)
    }

    fn list(&self, status: Option<InquiryStatus>) -> Result<Vec<Inquiry>, RepositoryError> {
        self.memory.list(status)
    }

    fn set_status(
        &self,
        id: &InquiryId,
        status: InquiryStatus,
        at: DateTime<Utc>,
    ) -> Result<StatusChange, RepositoryError> {
        let _writes = self.lock_writes()?;
        let before = self.memory.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        let change = self.memory.set_status(id, status, at)?;
        if !change.is_effective() {
            return Ok(change);
        }
        if let Err(err) = self.flush() {
            self.memory.restore(before)?;
            return Err(err);
        }
        Ok(change)
    }

    fn snapshot(&self) -> Result<Vec<Inquiry>, RepositoryError> {
        self.memory.snapshot()
    }
}

fn load_records(path: &Path) -> Result<Vec<Inquiry>, RepositoryError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(RepositoryError::Persistence {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    serde_json::from_slice(&bytes).map_err(|source| RepositoryError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

fn write_records(path: &Path, records: &[Inquiry]) -> Result<(), RepositoryError> {
    let persistence = |source: std::io::Error| RepositoryError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(persistence)?;
    }

    let payload = serde_json::to_vec_pretty(records).map_err(|err| RepositoryError::Persistence {
        path: path.to_path_buf(),
        source: err.into(),
    })?;

    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    fs::write(&temp, payload).map_err(persistence)?;
    fs::rename(&temp, path).map_err(persistence)
}
