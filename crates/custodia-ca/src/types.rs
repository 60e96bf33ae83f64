use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// 证书生命周期状态
///
/// Valid → Revoked 是单向转移，不可逆。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum CertificateState {
    /// 有效
    Valid,
    /// 已撤销
    Revoked,
}

/// 撤销原因代码（RFC 5280）
///
/// 撤销记录保存操作者提供的自由文本原因；
/// 本枚举只在CRL组装时作为标准原因代码使用。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RevocationReason {
    /// 未指定
    Unspecified,
    /// 密钥泄露
    KeyCompromise,
    /// CA密钥泄露
    CACompromise,
    /// 从属关系改变
    AffiliationChanged,
    /// 被取代
    Superseded,
    /// 停止操作
    CessationOfOperation,
    /// 证书暂停
    CertificateHold,
    /// 从CRL中移除
    RemoveFromCRL,
    /// 特权撤销
    PrivilegeWithdrawn,
    /// AA泄露
    AACompromise,
}

impl RevocationReason {
    /// 从自由文本解析撤销原因
    ///
    /// 大小写、连字符、下划线与空格均不敏感；无法识别时返回Unspecified。
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "keycompromise" => Self::KeyCompromise,
            "cacompromise" => Self::CACompromise,
            "affiliationchanged" => Self::AffiliationChanged,
            "superseded" => Self::Superseded,
            "cessationofoperation" => Self::CessationOfOperation,
            "certificatehold" => Self::CertificateHold,
            "removefromcrl" => Self::RemoveFromCRL,
            "privilegewithdrawn" => Self::PrivilegeWithdrawn,
            "aacompromise" => Self::AACompromise,
            _ => Self::Unspecified,
        }
    }

    /// 映射到rcgen的CRL原因代码
    pub(crate) fn to_rcgen(self) -> rcgen::RevocationReason {
        match self {
            Self::Unspecified => rcgen::RevocationReason::Unspecified,
            Self::KeyCompromise => rcgen::RevocationReason::KeyCompromise,
            Self::CACompromise => rcgen::RevocationReason::CaCompromise,
            Self::AffiliationChanged => rcgen::RevocationReason::AffiliationChanged,
            Self::Superseded => rcgen::RevocationReason::Superseded,
            Self::CessationOfOperation => rcgen::RevocationReason::CessationOfOperation,
            Self::CertificateHold => rcgen::RevocationReason::CertificateHold,
            Self::RemoveFromCRL => rcgen::RevocationReason::RemoveFromCrl,
            Self::PrivilegeWithdrawn => rcgen::RevocationReason::PrivilegeWithdrawn,
            Self::AACompromise => rcgen::RevocationReason::AaCompromise,
        }
    }
}

/// 已签发证书记录
///
/// 不变量：`expires_at > issued_at`；`revoked_at`存在时不早于`issued_at`；
/// `revocation_reason`当且仅当状态为Revoked时在场。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateRecord {
    /// 记录标识
    pub id: Uuid,
    /// 证书序列号（全局唯一）
    pub serial_number: String,
    /// 主体通用名
    pub common_name: String,
    /// 主体组织
    pub organization: String,
    /// 主体国家
    pub country: String,
    /// 证书（PEM编码）
    pub certificate_pem: String,
    /// 私钥在托管边界中的标签（记录中绝不保存私钥本身）
    pub key_label: String,
    /// 生命周期状态
    pub state: CertificateState,
    /// 签发时间
    #[serde(with = "time::serde::rfc3339")]
    pub issued_at: OffsetDateTime,
    /// 过期时间
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    /// 撤销时间（仅设置一次）
    #[serde(with = "time::serde::rfc3339::option")]
    pub revoked_at: Option<OffsetDateTime>,
    /// 撤销原因（操作者提供的自由文本，仅设置一次）
    pub revocation_reason: Option<String>,
}

/// 撤销事件条目
///
/// 追加式审计记录，创建后不再更新或删除；是CRL组装的事实来源。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevocationEntry {
    /// 条目标识
    pub id: Uuid,
    /// 证书序列号
    pub serial_number: String,
    /// 撤销时间
    #[serde(with = "time::serde::rfc3339")]
    pub revocation_date: OffsetDateTime,
    /// 撤销原因（自由文本）
    pub reason: String,
}

/// 证书详情（对外查询视图，不含任何密钥材料）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateDetail {
    /// 证书序列号
    pub serial_number: String,
    /// 主体通用名
    pub common_name: String,
    /// 主体组织
    pub organization: String,
    /// 主体国家
    pub country: String,
    /// 生命周期状态
    pub state: CertificateState,
    /// 签发时间
    #[serde(with = "time::serde::rfc3339")]
    pub issued_at: OffsetDateTime,
    /// 过期时间
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    /// 撤销时间
    #[serde(with = "time::serde::rfc3339::option")]
    pub revoked_at: Option<OffsetDateTime>,
    /// 撤销原因
    pub revocation_reason: Option<String>,
}

impl From<CertificateRecord> for CertificateDetail {
    fn from(record: CertificateRecord) -> Self {
        Self {
            serial_number: record.serial_number,
            common_name: record.common_name,
            organization: record.organization,
            country: record.country,
            state: record.state,
            issued_at: record.issued_at,
            expires_at: record.expires_at,
            revoked_at: record.revoked_at,
            revocation_reason: record.revocation_reason,
        }
    }
}
