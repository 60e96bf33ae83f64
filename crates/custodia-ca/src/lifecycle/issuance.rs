//! 证书签发引擎

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    audit::{self, AuditAction, AuditEntry},
    ca::CaContext,
    cert,
    error::{CaError, Result},
    store::CertificateStore,
    types::{CertificateRecord, CertificateState},
};

/// 序列号冲突时的最大签发尝试次数
const MAX_SERIAL_ATTEMPTS: u32 = 5;

/// 签发请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRequest {
    /// 主体通用名
    pub common_name: String,
    /// 主体组织
    pub organization: String,
    /// 主体国家
    pub country: String,
    /// 请求有效期（天）
    pub validity_days: u32,
}

impl IssueRequest {
    /// 校验请求字段
    fn validate(&self, ctx: &CaContext) -> Result<()> {
        if self.common_name.trim().is_empty() {
            return Err(CaError::ValidationError(
                "common_name cannot be empty".to_string(),
            ));
        }
        if self.organization.trim().is_empty() {
            return Err(CaError::ValidationError(
                "organization cannot be empty".to_string(),
            ));
        }
        if self.country.trim().is_empty() {
            return Err(CaError::ValidationError(
                "country cannot be empty".to_string(),
            ));
        }
        if self.validity_days == 0 {
            return Err(CaError::ValidationError(
                "validity_days must be positive".to_string(),
            ));
        }
        if self.validity_days > ctx.config().max_cert_validity_days {
            return Err(CaError::ValidationError(format!(
                "validity_days exceeds the configured maximum of {} days",
                ctx.config().max_cert_validity_days
            )));
        }

        // 叶子证书不得超过CA自身的剩余有效期
        let not_after = OffsetDateTime::now_utc() + Duration::days(self.validity_days as i64);
        if not_after > ctx.not_after() {
            return Err(CaError::ValidationError(
                "validity_days exceeds the remaining CA validity".to_string(),
            ));
        }

        Ok(())
    }
}

/// 签发结果
#[derive(Debug, Clone, Serialize)]
pub struct IssuedCertificate {
    /// 证书序列号
    pub serial_number: String,
    /// 证书（PEM编码）
    pub certificate_pem: String,
    /// 生效时间
    #[serde(with = "time::serde::rfc3339")]
    pub not_before: OffsetDateTime,
    /// 过期时间
    #[serde(with = "time::serde::rfc3339")]
    pub not_after: OffsetDateTime,
}

/// 签发叶子证书
///
/// 证书记录持久化成功之后签发才算完成；持久化失败时不返回证书。
/// 校验错误精确上报；密码学与持久化失败只以粗粒度的IssuanceFailed
/// 上报，完整细节仅进入内部日志。
pub fn issue(
    ctx: &CaContext,
    store: &dyn CertificateStore,
    request: &IssueRequest,
) -> Result<IssuedCertificate> {
    let actor = ctx.config().name.as_str();

    if let Err(e) = request.validate(ctx) {
        audit::append_entry(
            store,
            AuditEntry::failure(
                AuditAction::IssueCertificate,
                actor,
                &request.common_name,
                &e.to_string(),
            ),
        );
        return Err(e);
    }

    match issue_inner(ctx, store, request) {
        Ok(issued) => {
            info!(
                serial = %issued.serial_number,
                common_name = %request.common_name,
                "issued certificate"
            );
            audit::append_entry(
                store,
                AuditEntry::success(AuditAction::IssueCertificate, actor, &issued.serial_number),
            );
            Ok(issued)
        }
        Err(e) => {
            // 完整细节只进入日志，对外只暴露粗粒度类别
            error!(
                common_name = %request.common_name,
                error = %e,
                "certificate issuance failed"
            );
            audit::append_entry(
                store,
                AuditEntry::failure(
                    AuditAction::IssueCertificate,
                    actor,
                    &request.common_name,
                    "issuance failed",
                ),
            );
            Err(CaError::IssuanceFailed)
        }
    }
}

fn issue_inner(
    ctx: &CaContext,
    store: &dyn CertificateStore,
    request: &IssueRequest,
) -> Result<IssuedCertificate> {
    // 为该主体分配全新的密钥标签，避免标签复用
    let key_label = format!("leaf-{}", Uuid::new_v4());
    let leaf_key = ctx.custody().generate(&key_label)?;
    let leaf_keypair = cert::signing_keypair(&leaf_key)?;
    let ca_keypair = ctx.signing_keypair()?;

    let not_before = OffsetDateTime::now_utc();
    let not_after = not_before + Duration::days(request.validity_days as i64);

    for attempt in 1 ..= MAX_SERIAL_ATTEMPTS {
        let serial_number = cert::generate_serial_number()?;
        let params = cert::build_leaf_params(
            &request.common_name,
            &request.organization,
            &request.country,
            &serial_number,
            not_before,
            not_after,
        )?;

        let certificate = params
            .signed_by(&leaf_keypair, ctx.issuer_certificate(), &ca_keypair)
            .map_err(|e| CaError::CryptoFailure(format!("Failed to sign certificate: {e}")))?;
        let certificate_pem = certificate.pem();

        let record = CertificateRecord {
            id: Uuid::new_v4(),
            serial_number: serial_number.clone(),
            common_name: request.common_name.clone(),
            organization: request.organization.clone(),
            country: request.country.clone(),
            certificate_pem: certificate_pem.clone(),
            key_label: key_label.clone(),
            state: CertificateState::Valid,
            issued_at: not_before,
            expires_at: not_after,
            revoked_at: None,
            revocation_reason: None,
        };

        match store.insert_certificate(record) {
            Ok(()) => {
                return Ok(IssuedCertificate {
                    serial_number,
                    certificate_pem,
                    not_before,
                    not_after,
                })
            }
            // 依赖存储端的唯一性约束：冲突后换序列号重新签名，
            // 密钥材料保持不变
            Err(CaError::SerialExists(serial)) => {
                warn!(attempt, serial = %serial, "serial number collision, regenerating");
            }
            Err(e) => return Err(e),
        }
    }

    Err(CaError::CryptoFailure(format!(
        "serial number allocation exhausted after {MAX_SERIAL_ATTEMPTS} attempts"
    )))
}
