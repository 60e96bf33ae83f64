//! 证书状态查询模块
//!
//! 提供：
//! - OCSP风格的单序列号点查询，无需拉取完整撤销列表
//! - 证书详情查询
//! - CRL（证书吊销列表）生成

pub mod crl;

pub use crl::build_crl;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    error::{CaError, Result},
    store::CertificateStore,
    types::{CertificateDetail, CertificateState},
};

/// 证书状态查询结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CertificateStatus {
    /// 有效证书
    Good,
    /// 已撤销证书
    Revoked {
        /// 撤销时间
        #[serde(with = "time::serde::rfc3339")]
        revoked_at: OffsetDateTime,
        /// 撤销时记录的原因
        reason: String,
    },
    /// 未知序列号
    Unknown,
}

/// 查询单个序列号的当前状态
///
/// 纯读操作，无副作用；任何序列号都会得到一个确定的结果。
pub fn resolve_status(
    store: &dyn CertificateStore,
    serial_number: &str,
) -> Result<CertificateStatus> {
    let record = match store.find_by_serial(serial_number)? {
        Some(record) => record,
        None => return Ok(CertificateStatus::Unknown),
    };

    match record.state {
        CertificateState::Revoked => {
            // 状态为Revoked时撤销时间必然在场
            let revoked_at = record.revoked_at.ok_or_else(|| {
                CaError::PersistenceFailure(format!(
                    "revoked record {serial_number} is missing its revocation timestamp"
                ))
            })?;
            Ok(CertificateStatus::Revoked {
                revoked_at,
                reason: record.revocation_reason.unwrap_or_default(),
            })
        }
        CertificateState::Valid => Ok(CertificateStatus::Good),
    }
}

/// 查询证书详情
///
/// 返回主体、序列号、状态与时间字段；绝不包含密钥材料。
pub fn certificate_detail(
    store: &dyn CertificateStore,
    serial_number: &str,
) -> Result<CertificateDetail> {
    store
        .find_by_serial(serial_number)?
        .map(CertificateDetail::from)
        .ok_or_else(|| CaError::CertificateNotFound(serial_number.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use custodia_key::MemoryKeyCustody;

    use super::*;
    use crate::{
        ca::{CaConfig, CaContext},
        lifecycle::{issue, revoke, IssueRequest},
        store::MemoryCertificateStore,
    };

    fn test_context() -> CaContext {
        CaContext::initialize(
            Arc::new(MemoryKeyCustody::new()),
            CaConfig::root_ca("Test Root CA", "Test Org"),
        )
        .unwrap()
    }

    fn issue_one(ctx: &CaContext, store: &MemoryCertificateStore) -> String {
        let request = IssueRequest {
            common_name: "status.example".to_string(),
            organization: "Test Org".to_string(),
            country: "US".to_string(),
            validity_days: 30,
        };
        issue(ctx, store, &request).unwrap().serial_number
    }

    #[test]
    fn test_status_good_after_issuance() {
        let ctx = test_context();
        let store = MemoryCertificateStore::new();
        let serial = issue_one(&ctx, &store);

        assert_eq!(
            resolve_status(&store, &serial).unwrap(),
            CertificateStatus::Good
        );
    }

    #[test]
    fn test_status_revoked_preserves_reason_and_time() {
        let ctx = test_context();
        let store = MemoryCertificateStore::new();
        let serial = issue_one(&ctx, &store);

        let receipt = revoke(&ctx, &store, &serial, "keyCompromise").unwrap();

        match resolve_status(&store, &serial).unwrap() {
            CertificateStatus::Revoked { revoked_at, reason } => {
                assert_eq!(revoked_at, receipt.revoked_at);
                assert_eq!(reason, "keyCompromise");
            }
            other => panic!("expected revoked status, got {other:?}"),
        }
    }

    #[test]
    fn test_status_unknown_serial() {
        let store = MemoryCertificateStore::new();
        assert_eq!(
            resolve_status(&store, "deadbeef").unwrap(),
            CertificateStatus::Unknown
        );
    }

    #[test]
    fn test_certificate_detail() {
        let ctx = test_context();
        let store = MemoryCertificateStore::new();
        let serial = issue_one(&ctx, &store);

        let detail = certificate_detail(&store, &serial).unwrap();
        assert_eq!(detail.serial_number, serial);
        assert_eq!(detail.common_name, "status.example");
        assert_eq!(detail.state, CertificateState::Valid);
        assert!(detail.issued_at < detail.expires_at);

        assert!(matches!(
            certificate_detail(&store, "missing"),
            Err(CaError::CertificateNotFound(_))
        ));
    }
}
