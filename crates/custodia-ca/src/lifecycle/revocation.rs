//! 证书撤销引擎

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{error, info};

use crate::{
    audit::{self, AuditAction, AuditEntry},
    ca::CaContext,
    error::{CaError, Result},
    store::CertificateStore,
    types::CertificateState,
};

/// 撤销确认
#[derive(Debug, Clone, Serialize)]
pub struct RevocationReceipt {
    /// 证书序列号
    pub serial_number: String,
    /// 转移后的状态
    pub state: CertificateState,
    /// 撤销时间
    #[serde(with = "time::serde::rfc3339")]
    pub revoked_at: OffsetDateTime,
    /// 记录的撤销原因
    pub reason: String,
}

/// 撤销证书
///
/// 状态检查、Valid → Revoked 转移与撤销条目追加由存储端在单个
/// 事务单元内完成；重复撤销是无操作错误。无论成败都会写入审计条目。
pub fn revoke(
    ctx: &CaContext,
    store: &dyn CertificateStore,
    serial_number: &str,
    reason: &str,
) -> Result<RevocationReceipt> {
    let actor = ctx.config().name.as_str();
    let revoked_at = OffsetDateTime::now_utc();

    match store.mark_revoked(serial_number, revoked_at, reason) {
        Ok(entry) => {
            info!(serial = %serial_number, reason = %reason, "revoked certificate");
            audit::append_entry(
                store,
                AuditEntry::success(AuditAction::RevokeCertificate, actor, serial_number),
            );
            Ok(RevocationReceipt {
                serial_number: entry.serial_number,
                state: CertificateState::Revoked,
                revoked_at: entry.revocation_date,
                reason: entry.reason,
            })
        }
        // 未找到与重复撤销不携带敏感信息，精确上报
        Err(e @ (CaError::CertificateNotFound(_) | CaError::AlreadyRevoked(_))) => {
            audit::append_entry(
                store,
                AuditEntry::failure(
                    AuditAction::RevokeCertificate,
                    actor,
                    serial_number,
                    &e.to_string(),
                ),
            );
            Err(e)
        }
        Err(e) => {
            error!(serial = %serial_number, error = %e, "revocation aborted by store failure");
            audit::append_entry(
                store,
                AuditEntry::failure(
                    AuditAction::RevokeCertificate,
                    actor,
                    serial_number,
                    "store failure",
                ),
            );
            Err(CaError::PersistenceFailure(
                "revocation was not applied".to_string(),
            ))
        }
    }
}
