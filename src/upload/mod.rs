//! 上传编排模块
//!
//! 将本地文件（单个文件、glob 模式或目录）映射为对象名，
//! 并通过 [`ObjectStore`](crate::oss::ObjectStore) 顺序上传。

mod error;
mod key;
mod source;
mod uploader;

pub use error::UploadError;
pub use key::derive_key;
pub use source::{resolve_source, ResolvedSource};
pub use uploader::{UploadProgress, UploadRequest, Uploader};
