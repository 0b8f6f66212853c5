use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::{
    accounts::Account,
    error::{HrError, HrResult},
};

/// Durable slot holding the last authenticated account.
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> HrResult<Option<Account>>;
    fn save(&self, account: &Account) -> HrResult<()>;
    fn clear(&self) -> HrResult<()>;
}

fn storage_err(e: impl std::fmt::Display) -> HrError {
    HrError::SessionStorage(e.to_string())
}

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> HrResult<Option<Account>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path).map_err(storage_err)?;
        serde_json::from_str(&json).map(Some).map_err(storage_err)
    }

    fn save(&self, account: &Account) -> HrResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(storage_err)?;
        }
        let json = serde_json::to_string_pretty(&account.redacted()).map_err(storage_err)?;
        fs::write(&self.path, json).map_err(storage_err)
    }

    fn clear(&self) -> HrResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(storage_err)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    slot: Mutex<Option<String>>,
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> HrResult<Option<Account>> {
        let slot = self.slot.lock().map_err(storage_err)?;
        slot.as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(storage_err)
    }

    fn save(&self, account: &Account) -> HrResult<()> {
        let json = serde_json::to_string(&account.redacted()).map_err(storage_err)?;
        *self.slot.lock().map_err(storage_err)? = Some(json);
        Ok(())
    }

    fn clear(&self) -> HrResult<()> {
        *self.slot.lock().map_err(storage_err)? = None;
        Ok(())
    }
}
