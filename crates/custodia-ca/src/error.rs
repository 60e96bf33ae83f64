use thiserror::Error;

/// 证书生命周期引擎的错误类型
#[derive(Error, Debug)]
pub enum CaError {
    /// 证书未找到
    #[error("Certificate not found: {0}")]
    CertificateNotFound(String),

    /// 证书已撤销
    #[error("Certificate already revoked: {0}")]
    AlreadyRevoked(String),

    /// 序列号已存在
    #[error("Serial number already exists: {0}")]
    SerialExists(String),

    /// 请求校验错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 密码学操作失败
    #[error("Crypto failure: {0}")]
    CryptoFailure(String),

    /// 持久化失败
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// 解析错误
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 签发失败（粗粒度类别，内部细节只进入日志）
    #[error("Certificate issuance failed")]
    IssuanceFailed,

    /// CRL生成失败（粗粒度类别，内部细节只进入日志）
    #[error("CRL generation failed")]
    CrlGenerationFailed,

    /// 密钥托管错误
    #[error("Key custody error: {0}")]
    KeyCustodyError(#[from] custodia_key::Error),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result类型别名
pub type Result<T> = std::result::Result<T, CaError>;
