//! Custodia CA - 证书生命周期引擎
//!
//! 提供单根CA下的完整证书生命周期功能，包括：
//! - 通过托管边界的密钥供给
//! - 证书签发与有效期管理
//! - 带原因代码的证书撤销
//! - CRL（证书吊销列表）生成
//! - OCSP风格的单序列号状态查询

pub mod audit;
pub mod ca;
pub mod cert;
pub mod error;
pub mod lifecycle;
pub mod status;
pub mod store;
pub mod types;

// 重新导出常用类型
pub use audit::{list_audit_events, AuditAction, AuditEntry};
pub use ca::{CaConfig, CaContext, CA_KEY_LABEL};
pub use cert::{generate_serial_number, parse_certificate, CertificateSummary};
pub use error::{CaError, Result};
pub use lifecycle::{issue, revoke, IssueRequest, IssuedCertificate, RevocationReceipt};
pub use status::{build_crl, certificate_detail, resolve_status, CertificateStatus};
pub use store::{CertificateStore, MemoryCertificateStore};
pub use types::{
    CertificateDetail, CertificateRecord, CertificateState, RevocationEntry, RevocationReason,
};

/// 预导入模块，包含最常用的类型和函数
pub mod prelude {
    pub use crate::{
        audit::list_audit_events,
        ca::{CaConfig, CaContext},
        error::{CaError, Result},
        lifecycle::{issue, revoke, IssueRequest},
        status::{build_crl, certificate_detail, resolve_status, CertificateStatus},
        store::{CertificateStore, MemoryCertificateStore},
        types::{CertificateState, RevocationReason},
    };
}
