use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::oss::{HmacCredentials, ObjectStore, ObjectStoreError, StoreConnector};
use crate::upload::{derive_key, resolve_source, UploadError};

/// 一次上传的全部参数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadRequest {
    /// 目标存储桶
    pub bucket: String,
    /// 单个文件、glob 模式或目录
    pub source_spec: String,
    /// 对象名前缀
    pub prefix: Option<String>,
    /// 上传前清空存储桶
    pub wipe: bool,
    /// 对象名中去掉目录信息
    pub squash: bool,
    /// 包含子目录中的文件
    pub recursive: bool,
}

impl UploadRequest {
    pub fn new(bucket: impl Into<String>, source_spec: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            source_spec: source_spec.into(),
            ..Default::default()
        }
    }
}

/// 上传过程回调
pub trait UploadProgress: Send + Sync {
    /// 开始清空存储桶之前调用
    fn on_clear_bucket(&self, bucket: &str);

    /// 每个文件开始上传之前调用
    fn on_upload(&self, local_path: &Path, key: &str);
}

/// 上传编排器
///
/// 顺序执行：参数校验、创建客户端、（可选）清空存储桶、逐个上传文件。
/// 第一个失败即终止，不做重试。
pub struct Uploader {
    connector: Arc<dyn StoreConnector>,
    credentials: HmacCredentials,
    progress: Option<Arc<dyn UploadProgress>>,
}

impl Uploader {
    pub fn new(connector: Arc<dyn StoreConnector>, credentials: HmacCredentials) -> Self {
        Self {
            connector,
            credentials,
            progress: None,
        }
    }

    /// 设置进度回调
    pub fn with_progress(mut self, progress: Arc<dyn UploadProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// 上传 `request` 描述的文件，返回上传的文件数
    pub async fn upload(&self, request: &UploadRequest) -> Result<usize, UploadError> {
        self.validate(request)?;

        let store = self
            .connector
            .connect(&self.credentials)
            .await
            .map_err(UploadError::Connection)?;

        if request.wipe {
            if let Some(progress) = &self.progress {
                progress.on_clear_bucket(&request.bucket);
            }
            store
                .clear_bucket(&request.bucket)
                .await
                .map_err(|source| UploadError::Wipe {
                    bucket: request.bucket.clone(),
                    source,
                })?;
        }

        match self.upload_files(store.as_ref(), request).await {
            Ok(0) => Err(UploadError::NoMatchingFiles {
                source_spec: request.source_spec.clone(),
            }),
            Ok(count) => {
                log::info!("uploaded {} files to bucket {}", count, request.bucket);
                Ok(count)
            }
            Err(source) => Err(UploadError::Transfer {
                bucket: request.bucket.clone(),
                source,
            }),
        }
    }

    fn validate(&self, request: &UploadRequest) -> Result<(), UploadError> {
        let required = [
            ("bucket", request.bucket.as_str()),
            ("source_spec", request.source_spec.as_str()),
            ("access_key_id", self.credentials.access_key_id.as_str()),
            ("secret_access_key", self.credentials.secret_access_key.as_str()),
        ];

        match required.iter().find(|(_, value)| value.is_empty()) {
            Some((name, _)) => Err(UploadError::InvalidParameter(*name)),
            None => Ok(()),
        }
    }

    async fn upload_files(
        &self,
        store: &dyn ObjectStore,
        request: &UploadRequest,
    ) -> Result<usize, ObjectStoreError> {
        let source = resolve_source(&request.source_spec, request.recursive)?;
        let mut count = 0;

        for file in &source.files {
            let key = derive_key(
                &source.base_dir,
                file,
                request.squash,
                request.prefix.as_deref(),
            );

            if let Some(progress) = &self.progress {
                progress.on_upload(file, &key);
            }
            log::debug!("uploading {} to {}/{}", file.display(), request.bucket, key);

            store.upload_object(file, &request.bucket, &key).await?;
            count += 1;
        }

        Ok(count)
    }
}

impl fmt::Debug for Uploader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Uploader")
            .field("credentials", &self.credentials)
            .field("progress", &self.progress.as_ref().map(|_| "..."))
            .finish()
    }
}
