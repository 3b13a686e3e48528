//! cos-upload - 上传本地文件到 S3 兼容的对象存储
//!
//! ## 模块
//!
//! - **oss**: 对象存储抽象与基于 aws-sdk-s3 的实现
//! - **upload**: 源文件解析、对象名生成与上传编排
//!
//! ## 示例
//!
//! ```no_run
//! use std::sync::Arc;
//! use cos_upload::{CosConnector, HmacCredentials, UploadRequest, Uploader};
//!
//! # async fn run() -> Result<(), cos_upload::UploadError> {
//! let uploader = Uploader::new(
//!     Arc::new(CosConnector::default()),
//!     HmacCredentials::new("access-key-id", "secret-access-key"),
//! );
//!
//! let request = UploadRequest {
//!     prefix: Some("models".to_string()),
//!     recursive: true,
//!     ..UploadRequest::new("my-bucket", "data/")
//! };
//! let count = uploader.upload(&request).await?;
//! println!("uploaded {} files", count);
//! # Ok(())
//! # }
//! ```

pub mod oss;
pub mod upload;

// 重新导出主要的公共 API
pub use oss::{CosConnector, CosObjectStore, CosObjectStoreConfig};
pub use oss::{HmacCredentials, ObjectMeta, ObjectStore, ObjectStoreError, StoreConnector};
pub use upload::{derive_key, UploadError, UploadProgress, UploadRequest, Uploader};
