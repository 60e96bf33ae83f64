use super::Error;

/// 托管存储相关的错误扩展
impl Error {
    /// 密钥未找到错误
    pub fn key_not_found(label: &str) -> Self {
        Error::KeyError(format!("Key not found: {label}"))
    }

    /// 无效标签错误
    pub fn invalid_label(label: &str) -> Self {
        Error::InvalidLabel(label.to_string())
    }

    /// 加密错误
    pub fn encryption(err: impl std::fmt::Display) -> Self {
        Error::KeyError(format!("Encryption error: {err}"))
    }

    /// 解密错误
    pub fn decryption(err: impl std::fmt::Display) -> Self {
        Error::KeyError(format!("Decryption error: {err}"))
    }

    /// 无效配置
    pub fn invalid_configuration(msg: impl std::fmt::Display) -> Self {
        Error::Other(format!("Invalid configuration: {msg}"))
    }

    /// 锁错误
    pub fn lock_error(msg: impl std::fmt::Display) -> Self {
        Error::Other(format!("Lock error: {msg}"))
    }
}
