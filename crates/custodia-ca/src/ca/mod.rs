//! CA身份与进程内上下文
//!
//! 提供根CA的一次性初始化；上下文以引用方式传入各引擎操作，
//! 不使用任何进程级全局状态。

pub mod config;

use std::sync::Arc;

pub use config::CaConfig;
use custodia_key::KeyCustody;
use time::OffsetDateTime;
use tracing::info;

use crate::{
    cert,
    error::{CaError, Result},
};

/// 根CA密钥在托管边界中的标签
pub const CA_KEY_LABEL: &str = "ca-root";

/// 进程内CA上下文
///
/// 持有自签名根证书与托管边界句柄；CA私钥只存在于托管边界之后，
/// 每次签名操作按需取用。
pub struct CaContext {
    config: CaConfig,
    custody: Arc<dyn KeyCustody>,
    ca_cert: rcgen::Certificate,
    certificate_pem: String,
    subject: String,
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
    key_label: String,
}

impl CaContext {
    /// 初始化根CA身份
    ///
    /// 生成CA密钥对并自签名根证书。任何失败都是致命的：
    /// 没有CA身份就没有有效的运行状态。
    pub fn initialize(custody: Arc<dyn KeyCustody>, config: CaConfig) -> Result<Self> {
        config.validate().map_err(CaError::ValidationError)?;

        let ca_key = custody.generate(CA_KEY_LABEL)?;
        let key_pair = cert::signing_keypair(&ca_key)?;

        let not_before = OffsetDateTime::now_utc();
        let not_after = not_before + time::Duration::days(config.validity_days as i64);

        let params = cert::build_ca_params(&config, not_before, not_after)?;
        let ca_cert = params.self_signed(&key_pair).map_err(|e| {
            CaError::CryptoFailure(format!("Failed to self-sign CA certificate: {e}"))
        })?;
        let certificate_pem = ca_cert.pem();

        let subject = cert::render_subject(&config.name, &config.organization, &config.country);

        info!(subject = %subject, not_after = %not_after, "initialized root CA identity");

        Ok(Self {
            config,
            custody,
            ca_cert,
            certificate_pem,
            subject,
            not_before,
            not_after,
            key_label: CA_KEY_LABEL.to_string(),
        })
    }

    /// 获取CA证书（PEM编码）
    pub fn certificate_pem(&self) -> &str {
        &self.certificate_pem
    }

    /// 获取CA主体名称
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// 获取CA配置
    pub fn config(&self) -> &CaConfig {
        &self.config
    }

    /// CA证书生效时间
    pub fn not_before(&self) -> OffsetDateTime {
        self.not_before
    }

    /// CA证书到期时间
    pub fn not_after(&self) -> OffsetDateTime {
        self.not_after
    }

    /// 剩余有效天数
    pub fn days_until_expiry(&self) -> i64 {
        (self.not_after - OffsetDateTime::now_utc()).whole_days()
    }

    /// 获取托管边界句柄
    pub fn custody(&self) -> &Arc<dyn KeyCustody> {
        &self.custody
    }

    /// 作为颁发者使用的rcgen证书
    pub(crate) fn issuer_certificate(&self) -> &rcgen::Certificate {
        &self.ca_cert
    }

    /// 从托管边界取出CA签名密钥对
    ///
    /// 仅供引擎内部的签名操作使用，不对外暴露。
    pub(crate) fn signing_keypair(&self) -> Result<rcgen::KeyPair> {
        let ca_key = self.custody.get(&self.key_label)?;
        cert::signing_keypair(&ca_key)
    }
}
