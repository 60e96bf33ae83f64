mod custody;

use thiserror::Error;

/// 密钥托管模块的错误类型
#[derive(Error, Debug)]
pub enum Error {
    /// 密钥相关错误
    #[error("Key error: {0}")]
    KeyError(String),

    /// 签名相关错误
    #[error("Signature error: {0}")]
    SignatureError(String),

    /// 密钥导入错误
    #[error("Import error: {0}")]
    ImportError(String),

    /// 密钥导出错误
    #[error("Export error: {0}")]
    ExportError(String),

    /// 无效的托管标签
    #[error("Invalid label: {0}")]
    InvalidLabel(String),

    /// IO错误
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

/// Result类型别名
pub type Result<T> = std::result::Result<T, Error>;
