//! 进程内证书存储实现

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use time::OffsetDateTime;
use uuid::Uuid;

use super::CertificateStore;
use crate::{
    audit::AuditEntry,
    error::{CaError, Result},
    types::{CertificateRecord, CertificateState, RevocationEntry},
};

#[derive(Default)]
struct StoreInner {
    certificates: HashMap<String, CertificateRecord>,
    revocations: Vec<RevocationEntry>,
    audit: Vec<AuditEntry>,
}

/// 内存证书存储
///
/// 证书记录、撤销日志与审计日志在同一把锁之下，
/// mark_revoked因此天然是线性一致的单事务单元。
pub struct MemoryCertificateStore {
    inner: Mutex<StoreInner>,
}

impl MemoryCertificateStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreInner>> {
        self.inner
            .lock()
            .map_err(|_| CaError::PersistenceFailure("Store lock poisoned".to_string()))
    }
}

impl Default for MemoryCertificateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CertificateStore for MemoryCertificateStore {
    fn insert_certificate(&self, record: CertificateRecord) -> Result<()> {
        let mut inner = self.lock()?;

        if inner.certificates.contains_key(&record.serial_number) {
            return Err(CaError::SerialExists(record.serial_number.clone()));
        }

        inner
            .certificates
            .insert(record.serial_number.clone(), record);
        Ok(())
    }

    fn find_by_serial(&self, serial_number: &str) -> Result<Option<CertificateRecord>> {
        let inner = self.lock()?;
        Ok(inner.certificates.get(serial_number).cloned())
    }

    fn mark_revoked(
        &self,
        serial_number: &str,
        revoked_at: OffsetDateTime,
        reason: &str,
    ) -> Result<RevocationEntry> {
        let mut inner = self.lock()?;

        let record = inner
            .certificates
            .get_mut(serial_number)
            .ok_or_else(|| CaError::CertificateNotFound(serial_number.to_string()))?;

        if record.state == CertificateState::Revoked {
            return Err(CaError::AlreadyRevoked(serial_number.to_string()));
        }

        record.state = CertificateState::Revoked;
        record.revoked_at = Some(revoked_at);
        record.revocation_reason = Some(reason.to_string());

        let entry = RevocationEntry {
            id: Uuid::new_v4(),
            serial_number: serial_number.to_string(),
            revocation_date: revoked_at,
            reason: reason.to_string(),
        };
        inner.revocations.push(entry.clone());

        Ok(entry)
    }

    fn list_revocations(&self) -> Result<Vec<RevocationEntry>> {
        let inner = self.lock()?;
        Ok(inner.revocations.clone())
    }

    fn append_audit(&self, entry: AuditEntry) -> Result<()> {
        let mut inner = self.lock()?;
        inner.audit.push(entry);
        Ok(())
    }

    fn list_audit(&self, limit: usize) -> Result<Vec<AuditEntry>> {
        let inner = self.lock()?;
        Ok(inner.audit.iter().rev().take(limit).cloned().collect())
    }
}
