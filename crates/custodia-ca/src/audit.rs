//! 审计追踪
//!
//! 每次签发与撤销尝试（无论成败）都会产生一条审计条目；
//! 条目经由证书存储追加，传输与归档由外部审计管道负责。

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::{error::Result, store::CertificateStore};

/// 审计动作类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// 证书签发
    IssueCertificate,
    /// 证书撤销
    RevokeCertificate,
}

/// 审计条目（追加式，不可变）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// 条目标识
    pub id: Uuid,
    /// 审计动作
    pub action: AuditAction,
    /// 操作主体（引擎以CA名称作为主体）
    pub actor: String,
    /// 操作对象（序列号或主体通用名）
    pub target: String,
    /// 记录时间
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// 操作是否成功
    pub success: bool,
    /// 结果说明（仅限非敏感信息）
    pub detail: Option<String>,
}

impl AuditEntry {
    /// 创建成功条目
    pub fn success(action: AuditAction, actor: &str, target: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            actor: actor.to_string(),
            target: target.to_string(),
            timestamp: OffsetDateTime::now_utc(),
            success: true,
            detail: None,
        }
    }

    /// 创建失败条目
    pub fn failure(action: AuditAction, actor: &str, target: &str, detail: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            actor: actor.to_string(),
            target: target.to_string(),
            timestamp: OffsetDateTime::now_utc(),
            success: false,
            detail: Some(detail.to_string()),
        }
    }
}

/// 按时间倒序列出审计事件
pub fn list_audit_events(store: &dyn CertificateStore, limit: usize) -> Result<Vec<AuditEntry>> {
    store.list_audit(limit)
}

/// 追加审计条目
///
/// 审计失败不会中断主操作，只记录警告日志。
pub(crate) fn append_entry(store: &dyn CertificateStore, entry: AuditEntry) {
    if let Err(e) = store.append_audit(entry) {
        warn!(error = %e, "failed to append audit entry");
    }
}
