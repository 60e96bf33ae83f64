use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use tracing::debug;

use super::{validate_label, KeyCustody};
use crate::{
    error::{Error, Result},
    key::Ed25519Key,
};

/// Type alias for the label-keyed storage map
type LabelMap = RwLock<HashMap<String, Arc<Ed25519Key>>>;

/// In-memory key custody implementation
///
/// Keys live only for the process lifetime. Intended for tests and for
/// deployments where leaf keys are deliberately discarded on restart.
pub struct MemoryKeyCustody {
    keys: LabelMap,
}

impl MemoryKeyCustody {
    pub fn new() -> Self {
        Self {
            keys: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryKeyCustody {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyCustody for MemoryKeyCustody {
    fn generate(&self, label: &str) -> Result<Arc<Ed25519Key>> {
        validate_label(label)?;
        let key = Arc::new(Ed25519Key::generate()?);

        let mut keys = self
            .keys
            .write()
            .map_err(|_| Error::lock_error("Failed to acquire write lock"))?;

        if keys.insert(label.to_string(), key.clone()).is_some() {
            debug!(label, "replaced existing key under label");
        }

        Ok(key)
    }

    fn get(&self, label: &str) -> Result<Arc<Ed25519Key>> {
        let keys = self
            .keys
            .read()
            .map_err(|_| Error::lock_error("Failed to acquire read lock"))?;

        keys.get(label)
            .cloned()
            .ok_or_else(|| Error::key_not_found(label))
    }

    fn contains(&self, label: &str) -> Result<bool> {
        let keys = self
            .keys
            .read()
            .map_err(|_| Error::lock_error("Failed to acquire read lock"))?;

        Ok(keys.contains_key(label))
    }

    fn labels(&self) -> Result<Vec<String>> {
        let keys = self
            .keys
            .read()
            .map_err(|_| Error::lock_error("Failed to acquire read lock"))?;

        let mut labels: Vec<String> = keys.keys().cloned().collect();
        labels.sort();
        Ok(labels)
    }

    fn remove(&self, label: &str) -> Result<()> {
        let mut keys = self
            .keys
            .write()
            .map_err(|_| Error::lock_error("Failed to acquire write lock"))?;

        keys.remove(label)
            .ok_or_else(|| Error::key_not_found(label))
            .map(|_| ())
    }
}
