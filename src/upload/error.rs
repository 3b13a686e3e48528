use thiserror::Error;

use crate::oss::ObjectStoreError;

/// 上传流程错误
///
/// 除 [`UploadError::NoMatchingFiles`] 外，每个变体都携带底层原因。
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Parameter \"{0}\" is required")]
    InvalidParameter(&'static str),

    #[error("Cannot access Cloud Object Storage: {0}")]
    Connection(#[source] ObjectStoreError),

    #[error("Clearing of bucket \"{bucket}\" failed: {source}")]
    Wipe {
        bucket: String,
        #[source]
        source: ObjectStoreError,
    },

    #[error("No files match the source specification {source_spec}")]
    NoMatchingFiles { source_spec: String },

    #[error("Upload to bucket \"{bucket}\" failed: {source}")]
    Transfer {
        bucket: String,
        #[source]
        source: ObjectStoreError,
    },
}
