mod file;
mod memory;

use std::{path::PathBuf, sync::Arc};

pub use file::FileKeyCustody;
pub use memory::MemoryKeyCustody;

use crate::{
    error::{Error, Result},
    key::Ed25519Key,
};

/// Trait for key custody backends
///
/// Labels are opaque strings chosen by the caller. Generating a key for an
/// existing label replaces the prior key, so callers must pick globally
/// unique labels per subject to avoid accidental key reuse. Key material is
/// only ever handed out as an [`Ed25519Key`] handle, never in serialized
/// form.
pub trait KeyCustody: Send + Sync {
    /// Generate a fresh key pair under the label, replacing any existing key
    fn generate(&self, label: &str) -> Result<Arc<Ed25519Key>>;

    /// Retrieve the key pair stored under the label
    fn get(&self, label: &str) -> Result<Arc<Ed25519Key>>;

    /// Check whether a key exists for the label
    fn contains(&self, label: &str) -> Result<bool>;

    /// List all labels with stored keys
    fn labels(&self) -> Result<Vec<String>>;

    /// Remove the key stored under the label
    fn remove(&self, label: &str) -> Result<()>;
}

/// Key custody configuration
#[derive(Clone, Debug)]
pub enum CustodyConfig {
    Memory,
    File {
        path: PathBuf,
        encryption_key: Option<Vec<u8>>,
    },
}

/// Factory function to create a custody backend based on configuration
pub fn create_custody(config: CustodyConfig) -> Result<Arc<dyn KeyCustody>> {
    match config {
        CustodyConfig::Memory => Ok(Arc::new(MemoryKeyCustody::new())),
        CustodyConfig::File {
            path,
            encryption_key,
        } => Ok(Arc::new(FileKeyCustody::new(path, encryption_key)?)),
    }
}

/// Validate that a label is safe to use as a storage identifier
pub(crate) fn validate_label(label: &str) -> Result<()> {
    let well_formed = !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if !well_formed {
        return Err(Error::invalid_label(label));
    }
    Ok(())
}
