use std::path::{Path, PathBuf};
use thiserror::Error;

/// 对象存储统一错误类型
#[derive(Error, Debug)]
pub enum ObjectStoreError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("{provider} {message} failed: {source}")]
    Provider {
        provider: String,
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("multipart upload failed: {message}")]
    MultipartUpload { message: String },
}

impl ObjectStoreError {
    /// 从厂商 SDK 错误转换
    pub fn from_provider<E>(err: E, provider: &str, context: &str) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ObjectStoreError::Provider {
            provider: provider.to_string(),
            message: context.to_string(),
            source: Box::new(err),
        }
    }

    /// 本地文件读取错误，附带文件路径
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        ObjectStoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<glob::PatternError> for ObjectStoreError {
    fn from(err: glob::PatternError) -> Self {
        ObjectStoreError::InvalidInput(format!("invalid glob pattern: {}", err))
    }
}

impl From<glob::GlobError> for ObjectStoreError {
    fn from(err: glob::GlobError) -> Self {
        let path = err.path().to_path_buf();
        ObjectStoreError::Io {
            path,
            source: err.into_error(),
        }
    }
}
