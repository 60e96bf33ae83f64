//! 证书构造与解析工具
//!
//! 基于rcgen构造CA与叶子证书参数，基于x509-cert解析证书内容

use custodia_key::Ed25519Key;
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};
use time::OffsetDateTime;
use x509_cert::der::{oid::AssociatedOid, Decode};
use x509_cert::ext::pkix::BasicConstraints;

use crate::{
    ca::CaConfig,
    error::{CaError, Result},
};

/// 生成证书序列号
///
/// 16字节密码学安全随机数，hex编码。唯一性由存储端约束保证。
/// 首字节收敛到0x01..=0x7F：DER正整数编码不产生前导补零字节，
/// 证书内的序列号与存储的hex逐字节一致。
pub fn generate_serial_number() -> Result<String> {
    let mut serial = [0u8; 16];
    getrandom::fill(&mut serial)
        .map_err(|e| CaError::CryptoFailure(format!("Failed to generate serial number: {e}")))?;

    serial[0] &= 0x7f;
    if serial[0] == 0 {
        serial[0] = 0x01;
    }

    Ok(hex::encode(serial))
}

/// 将hex序列号解码为DER整数字节
fn serial_bytes(serial_number: &str) -> Result<Vec<u8>> {
    hex::decode(serial_number)
        .map_err(|e| CaError::ParseError(format!("Invalid serial number {serial_number}: {e}")))
}

/// 从托管密钥构造rcgen签名密钥对
///
/// 使用私钥PKCS#8 PEM格式创建KeyPair；密钥材料不离开本次调用。
pub(crate) fn signing_keypair(key: &Ed25519Key) -> Result<KeyPair> {
    let private_key_pem = key.to_pkcs8_pem()?;
    KeyPair::from_pkcs8_pem_and_sign_algo(&private_key_pem, &rcgen::PKCS_ED25519)
        .map_err(|e| CaError::CryptoFailure(format!("Failed to create key pair: {e}")))
}

/// 渲染主体名称字符串
pub(crate) fn render_subject(common_name: &str, organization: &str, country: &str) -> String {
    format!("CN={common_name}, O={organization}, C={country}")
}

/// 构造根CA证书参数
///
/// 主体与颁发者相同（自签名），携带CA基本约束与证书/CRL签名用途。
pub(crate) fn build_ca_params(
    config: &CaConfig,
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
) -> Result<CertificateParams> {
    let mut params = CertificateParams::new(vec![config.name.clone()])
        .map_err(|e| CaError::CryptoFailure(format!("Failed to create params: {e}")))?;

    // 设置证书主体信息
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, &config.name);
    dn.push(DnType::CountryName, &config.country);
    dn.push(DnType::StateOrProvinceName, &config.state);
    dn.push(DnType::LocalityName, &config.locality);
    dn.push(DnType::OrganizationName, &config.organization);
    if let Some(ou) = &config.organizational_unit {
        dn.push(DnType::OrganizationalUnitName, ou);
    }
    params.distinguished_name = dn;

    // 设置有效期
    params.not_before = not_before;
    params.not_after = not_after;

    // 设置序列号
    params.serial_number = Some(serial_bytes(&generate_serial_number()?)?.into());

    // CA标记与密钥用途
    params.is_ca = rcgen::IsCa::Ca(rcgen::BasicConstraints::Unconstrained);
    params.key_usages = vec![
        rcgen::KeyUsagePurpose::KeyCertSign,
        rcgen::KeyUsagePurpose::CrlSign,
        rcgen::KeyUsagePurpose::DigitalSignature,
    ];

    Ok(params)
}

/// 构造叶子证书参数
///
/// 颁发者名称在签名时由CA证书提供；这里只负责主体、序列号与用途。
pub(crate) fn build_leaf_params(
    common_name: &str,
    organization: &str,
    country: &str,
    serial_number: &str,
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
) -> Result<CertificateParams> {
    let mut params = CertificateParams::new(vec![common_name.to_string()])
        .map_err(|e| CaError::CryptoFailure(format!("Failed to create params: {e}")))?;

    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    dn.push(DnType::OrganizationName, organization);
    dn.push(DnType::CountryName, country);
    params.distinguished_name = dn;

    params.not_before = not_before;
    params.not_after = not_after;

    params.serial_number = Some(serial_bytes(serial_number)?.into());

    // 叶子证书不允许签发下级证书
    params.is_ca = rcgen::IsCa::NoCa;
    params.key_usages = vec![
        rcgen::KeyUsagePurpose::DigitalSignature,
        rcgen::KeyUsagePurpose::KeyEncipherment,
        rcgen::KeyUsagePurpose::ContentCommitment,
    ];
    params.extended_key_usages = vec![
        rcgen::ExtendedKeyUsagePurpose::ServerAuth,
        rcgen::ExtendedKeyUsagePurpose::ClientAuth,
    ];

    Ok(params)
}

/// 证书摘要信息
#[derive(Debug, Clone)]
pub struct CertificateSummary {
    /// 证书序列号（hex编码）
    pub serial_number: String,
    /// 主体名称（RFC 4514格式）
    pub subject: String,
    /// 颁发者名称（RFC 4514格式）
    pub issuer: String,
    /// 生效时间
    pub not_before: OffsetDateTime,
    /// 过期时间
    pub not_after: OffsetDateTime,
    /// 是否为CA证书
    pub is_ca: bool,
}

/// 解析证书内容（PEM或DER格式）
pub fn parse_certificate(cert_data: &[u8]) -> Result<CertificateSummary> {
    // 尝试解析PEM格式
    let der_data = if cert_data.starts_with(b"-----BEGIN CERTIFICATE-----") {
        pem::parse(cert_data)
            .map_err(|e| CaError::ParseError(format!("Failed to parse PEM: {e}")))?
            .contents()
            .to_vec()
    } else {
        cert_data.to_vec()
    };

    // 解析DER格式证书
    let cert = x509_cert::Certificate::from_der(&der_data)
        .map_err(|e| CaError::ParseError(format!("Failed to parse DER: {e}")))?;

    let tbs = &cert.tbs_certificate;

    let serial_number = hex::encode(tbs.serial_number.as_bytes());
    let subject = tbs.subject.to_string();
    let issuer = tbs.issuer.to_string();

    let not_before = OffsetDateTime::from(tbs.validity.not_before.to_system_time());
    let not_after = OffsetDateTime::from(tbs.validity.not_after.to_system_time());

    // 从基本约束扩展判断是否为CA证书
    let mut is_ca = false;
    if let Some(extensions) = &tbs.extensions {
        for ext in extensions.iter() {
            if ext.extn_id == BasicConstraints::OID {
                let constraints = BasicConstraints::from_der(ext.extn_value.as_bytes())
                    .map_err(|e| {
                        CaError::ParseError(format!("Failed to parse basic constraints: {e}"))
                    })?;
                is_ca = constraints.ca;
            }
        }
    }

    Ok(CertificateSummary {
        serial_number,
        subject,
        issuer,
        not_before,
        not_after,
        is_ca,
    })
}
