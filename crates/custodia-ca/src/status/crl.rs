//! CRL生成
//!
//! 从撤销条目快照构建由CA密钥签名的证书吊销列表

use rcgen::{CertificateRevocationListParams, KeyIdMethod, RevokedCertParams, SerialNumber};
use time::{Duration, OffsetDateTime};
use tracing::error;

use crate::{
    ca::CaContext,
    error::{CaError, Result},
    store::CertificateStore,
    types::{RevocationEntry, RevocationReason},
};

/// 生成PEM编码的签名CRL
///
/// 只读操作：对存储无任何写入；输出是调用时刻的时间点快照，
/// 与并发进行中的撤销相比可能立即过时。失败时完整细节进入日志，
/// 对外只暴露CrlGenerationFailed。
pub fn build_crl(ctx: &CaContext, store: &dyn CertificateStore) -> Result<String> {
    build_crl_inner(ctx, store).map_err(|e| {
        error!(error = %e, "CRL generation failed");
        CaError::CrlGenerationFailed
    })
}

fn build_crl_inner(ctx: &CaContext, store: &dyn CertificateStore) -> Result<String> {
    let entries = store.list_revocations()?;

    let this_update = OffsetDateTime::now_utc();
    let next_update = this_update + Duration::hours(ctx.config().crl_next_update_hours as i64);

    let revoked_certs = entries
        .iter()
        .map(revoked_cert_params)
        .collect::<Result<Vec<_>>>()?;

    let params = CertificateRevocationListParams {
        this_update,
        next_update,
        // CRL编号取this_update的Unix秒：跨重建单调递增，
        // 且只读操作无需持有可变状态
        crl_number: SerialNumber::from(this_update.unix_timestamp() as u64),
        issuing_distribution_point: None,
        revoked_certs,
        key_identifier_method: KeyIdMethod::Sha256,
    };

    let ca_keypair = ctx.signing_keypair()?;
    let crl = params
        .signed_by(ctx.issuer_certificate(), &ca_keypair)
        .map_err(|e| CaError::CryptoFailure(format!("Failed to sign CRL: {e}")))?;

    crl.pem()
        .map_err(|e| CaError::CryptoFailure(format!("Failed to encode CRL: {e}")))
}

/// 将撤销条目映射为CRL撤销记录
///
/// 自由文本原因映射到标准原因代码，无法识别时回退到unspecified。
fn revoked_cert_params(entry: &RevocationEntry) -> Result<RevokedCertParams> {
    let serial = hex::decode(&entry.serial_number).map_err(|e| {
        CaError::ParseError(format!(
            "Invalid serial number {}: {e}",
            entry.serial_number
        ))
    })?;

    Ok(RevokedCertParams {
        serial_number: SerialNumber::from(serial),
        revocation_time: entry.revocation_date,
        reason_code: Some(RevocationReason::from_label(&entry.reason).to_rcgen()),
        invalidity_date: None,
    })
}
