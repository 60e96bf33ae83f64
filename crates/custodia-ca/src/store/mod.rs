//! 证书存储契约
//!
//! 引擎组件对持久化层的读写契约。生产部署由外部持久化引擎实现本接口；
//! 这里提供进程内参考实现用于测试与嵌入场景。

mod memory;

pub use memory::MemoryCertificateStore;
use time::OffsetDateTime;

use crate::{
    audit::AuditEntry,
    error::Result,
    types::{CertificateRecord, RevocationEntry},
};

/// 证书存储后端接口
pub trait CertificateStore: Send + Sync {
    /// 保存新签发的证书记录
    ///
    /// 序列号唯一性由存储端约束保证；冲突时返回SerialExists而非覆盖。
    fn insert_certificate(&self, record: CertificateRecord) -> Result<()>;

    /// 按序列号查找证书记录
    fn find_by_serial(&self, serial_number: &str) -> Result<Option<CertificateRecord>>;

    /// 原子化撤销
    ///
    /// 状态检查、Valid → Revoked 转移与撤销条目追加在单个事务单元内完成，
    /// 要么全部生效要么全部回滚。并发调用同一序列号时恰有一个调用观察到
    /// 状态转移，其余调用得到AlreadyRevoked。
    fn mark_revoked(
        &self,
        serial_number: &str,
        revoked_at: OffsetDateTime,
        reason: &str,
    ) -> Result<RevocationEntry>;

    /// 列出全部撤销条目（时间点快照）
    fn list_revocations(&self) -> Result<Vec<RevocationEntry>>;

    /// 追加审计条目
    fn append_audit(&self, entry: AuditEntry) -> Result<()>;

    /// 按时间倒序列出审计条目
    fn list_audit(&self, limit: usize) -> Result<Vec<AuditEntry>>;
}
