use std::{
    fs,
    path::PathBuf,
    sync::{Arc, RwLock},
};

use chacha20poly1305::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    ChaCha20Poly1305, Nonce,
};
use tracing::info;
use zeroize::Zeroizing;

use super::{validate_label, KeyCustody};
use crate::{
    error::{Error, Result},
    key::Ed25519Key,
};

/// File-based key custody with optional encryption at rest
///
/// Each label maps to one PKCS#8 file under the custody directory. Every
/// persist and removal is logged as an explicit custody event.
pub struct FileKeyCustody {
    path: PathBuf,
    cipher: Option<ChaCha20Poly1305>,
    lock: RwLock<()>,
}

impl FileKeyCustody {
    pub fn new(path: PathBuf, encryption_key: Option<Vec<u8>>) -> Result<Self> {
        // Validate encryption key if provided
        let cipher = if let Some(key) = encryption_key {
            if key.len() != 32 {
                return Err(Error::invalid_configuration(
                    "Encryption key must be 32 bytes for ChaCha20Poly1305",
                ));
            }
            let cipher = ChaCha20Poly1305::new_from_slice(&key)
                .map_err(Error::invalid_configuration)?;
            Some(cipher)
        } else {
            None
        };

        Ok(Self {
            path,
            cipher,
            lock: RwLock::new(()),
        })
    }

    /// Generate filename for key material files
    fn key_path(&self, label: &str) -> PathBuf {
        self.path.join(format!("{label}.key"))
    }

    /// Encrypt data using ChaCha20Poly1305, nonce prepended
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        if let Some(cipher) = &self.cipher {
            let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);

            let ciphertext = cipher
                .encrypt(&nonce, plaintext)
                .map_err(Error::encryption)?;

            let mut result = nonce.to_vec();
            result.extend_from_slice(&ciphertext);

            Ok(result)
        } else {
            Ok(plaintext.to_vec())
        }
    }

    /// Decrypt data using ChaCha20Poly1305
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        if let Some(cipher) = &self.cipher {
            if ciphertext.len() < 12 {
                return Err(Error::decryption("Invalid ciphertext length"));
            }

            let (nonce_bytes, encrypted) = ciphertext.split_at(12);
            let nonce = Nonce::from_slice(nonce_bytes);

            cipher
                .decrypt(nonce, encrypted)
                .map(Zeroizing::new)
                .map_err(Error::decryption)
        } else {
            Ok(Zeroizing::new(ciphertext.to_vec()))
        }
    }

    fn persist(&self, label: &str, key: &Ed25519Key) -> Result<()> {
        if !self.path.exists() {
            fs::create_dir_all(&self.path)?;
        }

        let der = Zeroizing::new(key.to_pkcs8_der()?);
        let material = self.encrypt(&der)?;
        fs::write(self.key_path(label), material)?;

        info!(
            label,
            fingerprint = %key.fingerprint(),
            "persisted key material to custody storage"
        );
        Ok(())
    }

    fn load(&self, label: &str) -> Result<Ed25519Key> {
        let path = self.key_path(label);
        if !path.exists() {
            return Err(Error::key_not_found(label));
        }

        let material = fs::read(&path)?;
        let der = self.decrypt(&material)?;
        Ed25519Key::from_pkcs8_der(&der)
    }
}

impl KeyCustody for FileKeyCustody {
    fn generate(&self, label: &str) -> Result<Arc<Ed25519Key>> {
        validate_label(label)?;

        let _guard = self
            .lock
            .write()
            .map_err(|_| Error::lock_error("Failed to acquire write lock"))?;

        let key = Ed25519Key::generate()?;
        self.persist(label, &key)?;
        Ok(Arc::new(key))
    }

    fn get(&self, label: &str) -> Result<Arc<Ed25519Key>> {
        validate_label(label)?;

        let _guard = self
            .lock
            .read()
            .map_err(|_| Error::lock_error("Failed to acquire read lock"))?;

        self.load(label).map(Arc::new)
    }

    fn contains(&self, label: &str) -> Result<bool> {
        validate_label(label)?;
        Ok(self.key_path(label).exists())
    }

    fn labels(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut labels = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("key") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    labels.push(stem.to_string());
                }
            }
        }

        labels.sort();
        Ok(labels)
    }

    fn remove(&self, label: &str) -> Result<()> {
        validate_label(label)?;

        let _guard = self
            .lock
            .write()
            .map_err(|_| Error::lock_error("Failed to acquire write lock"))?;

        let path = self.key_path(label);
        if !path.exists() {
            return Err(Error::key_not_found(label));
        }

        fs::remove_file(path)?;
        info!(label, "removed key material from custody storage");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_file_custody_roundtrip() {
        let dir = TempDir::new().unwrap();
        let custody = FileKeyCustody::new(dir.path().to_path_buf(), None).unwrap();

        let key = custody.generate("service-a").unwrap();
        let loaded = custody.get("service-a").unwrap();
        assert_eq!(key.public_key_bytes(), loaded.public_key_bytes());

        assert_eq!(custody.labels().unwrap(), vec!["service-a".to_string()]);
    }

    #[test]
    fn test_file_custody_survives_reopen() {
        let dir = TempDir::new().unwrap();

        let public_key = {
            let custody = FileKeyCustody::new(dir.path().to_path_buf(), None).unwrap();
            custody.generate("durable").unwrap().public_key_bytes()
        };

        // A fresh custody over the same directory sees the same key
        let custody = FileKeyCustody::new(dir.path().to_path_buf(), None).unwrap();
        let loaded = custody.get("durable").unwrap();
        assert_eq!(public_key, loaded.public_key_bytes());
    }

    #[test]
    fn test_file_custody_encrypted_roundtrip() {
        let dir = TempDir::new().unwrap();
        let secret = vec![9u8; 32];
        let custody =
            FileKeyCustody::new(dir.path().to_path_buf(), Some(secret.clone())).unwrap();

        let key = custody.generate("enc-key").unwrap();

        // The raw file on disk must not contain the PKCS#8 DER in clear
        let raw = fs::read(dir.path().join("enc-key.key")).unwrap();
        let der = key.to_pkcs8_der().unwrap();
        assert!(!raw
            .windows(der.len())
            .any(|window| window == der.as_slice()));

        let loaded = custody.get("enc-key").unwrap();
        assert_eq!(key.public_key_bytes(), loaded.public_key_bytes());
    }

    #[test]
    fn test_file_custody_rejects_short_encryption_key() {
        let dir = TempDir::new().unwrap();
        let result = FileKeyCustody::new(dir.path().to_path_buf(), Some(vec![1u8; 16]));
        assert!(result.is_err());
    }

    #[test]
    fn test_file_custody_unknown_label() {
        let dir = TempDir::new().unwrap();
        let custody = FileKeyCustody::new(dir.path().to_path_buf(), None).unwrap();
        assert!(custody.get("missing").is_err());
        assert!(!custody.contains("missing").unwrap());
    }
}
