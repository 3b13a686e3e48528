use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use bytes::Bytes;
use garde::Validate;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::fmt::Debug;
use std::path::Path;
use tokio::io::AsyncReadExt;

use crate::oss::{
    HmacCredentials, ObjectMeta, ObjectStore, ObjectStoreError, PartInfo, StoreConnector,
};

/// S3 协议允许的最小分片大小（最后一片除外）
pub const MIN_PART_SIZE: usize = 5 * 1024 * 1024;

const PROVIDER: &str = "COS";

/// 连接失败与超时归为网络错误，其余保留 SDK 原始错误
fn sdk_error<E, R>(err: SdkError<E, R>, operation: &str) -> ObjectStoreError
where
    E: std::error::Error + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => ObjectStoreError::Network(
            format!("{} {}: {}", PROVIDER, operation, DisplayErrorContext(&err)),
        ),
        _ => ObjectStoreError::from_provider(err, PROVIDER, operation),
    }
}

/// Cloud Object Storage 配置
///
/// 访问密钥不属于配置，连接时通过 [`HmacCredentials`] 显式传入。
/// 任何兼容 S3 的服务（IBM COS、MinIO 等）都可以通过 `endpoint` 接入。
#[derive(Debug, Deserialize, Serialize, SmartDefault, Clone, Validate)]
#[serde(default)]
pub struct CosObjectStoreConfig {
    /// 服务端点，必须是 http(s) URL
    #[garde(pattern(r"^https?://[^\s]+$"))]
    #[default = "https://s3.us.cloud-object-storage.appdomain.cloud"]
    pub endpoint: String,

    /// 区域
    #[garde(length(min = 1))]
    #[default = "us"]
    pub region: String,

    /// 是否使用 path-style URL，大多数 S3 兼容存储需要开启
    #[garde(skip)]
    #[default = true]
    pub force_path_style: bool,

    /// 使用分片上传的阈值（默认 100MB）
    #[garde(skip)]
    #[default = 104857600]
    pub multipart_threshold: u64,

    /// 分片大小（默认 8MB）
    #[garde(range(min = MIN_PART_SIZE))]
    #[default = 8388608]
    pub part_size: usize,
}

/// 基于 aws-sdk-s3 的 ObjectStore 实现
pub struct CosObjectStore {
    client: Client,
    config: CosObjectStoreConfig,
}

impl CosObjectStore {
    /// 校验配置与凭证并创建客户端
    pub async fn connect(
        config: CosObjectStoreConfig,
        credentials: &HmacCredentials,
    ) -> Result<Self, ObjectStoreError> {
        if let Err(errors) = config.validate() {
            return Err(ObjectStoreError::Configuration(format!("{}", errors)));
        }

        if credentials.access_key_id.is_empty() || credentials.secret_access_key.is_empty() {
            return Err(ObjectStoreError::Configuration(
                "access key id and secret access key must not be empty".to_string(),
            ));
        }

        let client = Self::create_client(&config, credentials).await;
        log::debug!(
            "created object storage client for {} ({})",
            config.endpoint,
            config.region
        );

        Ok(Self { client, config })
    }

    async fn create_client(config: &CosObjectStoreConfig, credentials: &HmacCredentials) -> Client {
        let provider = Credentials::new(
            &credentials.access_key_id,
            &credentials.secret_access_key,
            None,
            None,
            "cos-upload",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(provider)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .endpoint_url(&config.endpoint)
            .force_path_style(config.force_path_style)
            .build();

        Client::from_conf(s3_config)
    }

    pub fn config(&self) -> &CosObjectStoreConfig {
        &self.config
    }

    async fn put_file(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
        size: u64,
    ) -> Result<(), ObjectStoreError> {
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| {
                ObjectStoreError::from_provider(
                    e,
                    PROVIDER,
                    &format!("read {}", local_path.display()),
                )
            })?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_length(size as i64)
            .body(body)
            .send()
            .await
            .map_err(|e| sdk_error(e, "put_object"))?;

        Ok(())
    }

    async fn put_file_multipart(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
    ) -> Result<(), ObjectStoreError> {
        let upload_id = self.create_multipart_upload(bucket, key).await?;

        let result = self
            .upload_parts(local_path, bucket, key, &upload_id)
            .await;

        match result {
            Ok(parts) => {
                self.complete_multipart_upload(bucket, key, &upload_id, parts)
                    .await
            }
            Err(e) => {
                // 出错时取消分片上传（忽略取消错误）
                if let Err(abort_err) = self.abort_multipart_upload(bucket, key, &upload_id).await {
                    log::warn!("failed to abort multipart upload of {}: {}", key, abort_err);
                }
                Err(e)
            }
        }
    }

    async fn upload_parts(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> Result<Vec<PartInfo>, ObjectStoreError> {
        let part_size = self.config.part_size;
        let mut file = tokio::fs::File::open(local_path)
            .await
            .map_err(|e| ObjectStoreError::io(local_path, e))?;
        let mut parts: Vec<PartInfo> = Vec::new();
        let mut part_number: u32 = 1;

        loop {
            let mut buffer = vec![0u8; part_size];
            let mut buffer_len = 0;

            while buffer_len < part_size {
                let n = file
                    .read(&mut buffer[buffer_len..])
                    .await
                    .map_err(|e| ObjectStoreError::io(local_path, e))?;
                if n == 0 {
                    break;
                }
                buffer_len += n;
            }

            if buffer_len == 0 {
                break;
            }

            buffer.truncate(buffer_len);

            let part = self
                .upload_part(bucket, key, upload_id, part_number, Bytes::from(buffer))
                .await?;
            log::debug!("uploaded part {} of {} ({} bytes)", part_number, key, part.size);

            parts.push(part);
            part_number += 1;
        }

        if parts.is_empty() {
            return Err(ObjectStoreError::MultipartUpload {
                message: format!("{} has no content", local_path.display()),
            });
        }

        Ok(parts)
    }

    // === 分片上传接口 ===
    async fn create_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<String, ObjectStoreError> {
        let output = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error(e, "create_multipart_upload"))?;

        output.upload_id.ok_or_else(|| ObjectStoreError::MultipartUpload {
            message: "no upload id returned".to_string(),
        })
    }

    async fn upload_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: u32,
        data: Bytes,
    ) -> Result<PartInfo, ObjectStoreError> {
        let size = data.len() as u64;

        let output = self
            .client
            .upload_part()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number as i32)
            .content_length(size as i64)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| sdk_error(e, "upload_part"))?;

        let etag = output.e_tag.ok_or_else(|| ObjectStoreError::MultipartUpload {
            message: format!("no ETag returned for part {}", part_number),
        })?;

        Ok(PartInfo {
            part_number,
            etag,
            size,
        })
    }

    async fn complete_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        parts: Vec<PartInfo>,
    ) -> Result<(), ObjectStoreError> {
        let completed_parts: Vec<CompletedPart> = parts
            .into_iter()
            .map(|p| {
                CompletedPart::builder()
                    .part_number(p.part_number as i32)
                    .e_tag(p.etag)
                    .build()
            })
            .collect();

        let completed_upload = CompletedMultipartUpload::builder()
            .set_parts(Some(completed_parts))
            .build();

        self.client
            .complete_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(completed_upload)
            .send()
            .await
            .map_err(|e| sdk_error(e, "complete_multipart_upload"))?;

        Ok(())
    }

    async fn abort_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> Result<(), ObjectStoreError> {
        self.client
            .abort_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
            .map_err(|e| sdk_error(e, "abort_multipart_upload"))?;

        Ok(())
    }
}

#[async_trait]
impl ObjectStore for CosObjectStore {
    async fn upload_object(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
    ) -> Result<(), ObjectStoreError> {
        let size = tokio::fs::metadata(local_path)
            .await
            .map_err(|e| ObjectStoreError::io(local_path, e))?
            .len();

        // 空文件与小文件走单次上传，大文件走分片上传
        if size < self.config.multipart_threshold {
            log::debug!("put_object {}/{} ({} bytes)", bucket, key, size);
            self.put_file(local_path, bucket, key, size).await
        } else {
            log::debug!("multipart upload {}/{} ({} bytes)", bucket, key, size);
            self.put_file_multipart(local_path, bucket, key).await
        }
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<ObjectMeta>, ObjectStoreError> {
        let mut result = Vec::new();
        let mut continuation_token = None;

        loop {
            let mut builder = self.client.list_objects_v2().bucket(bucket);

            if let Some(p) = prefix {
                builder = builder.prefix(p);
            }

            if let Some(token) = &continuation_token {
                builder = builder.continuation_token(token);
            }

            let output = builder
                .send()
                .await
                .map_err(|e| sdk_error(e, "list_objects"))?;

            if let Some(objects) = output.contents {
                for obj in objects {
                    result.push(ObjectMeta {
                        key: obj.key.unwrap_or_default(),
                        size: obj.size.unwrap_or(0) as u64,
                        last_modified: obj
                            .last_modified
                            .and_then(|dt| {
                                chrono::DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())
                            })
                            .unwrap_or_else(chrono::Utc::now),
                        etag: obj.e_tag,
                    });
                }
            }

            continuation_token = output.next_continuation_token;

            if continuation_token.is_none() {
                break;
            }
        }

        Ok(result)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ObjectStoreError> {
        log::debug!("delete_object {}/{}", bucket, key);

        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error(e, "delete_object"))?;

        Ok(())
    }
}

/// 使用固定配置创建 [`CosObjectStore`] 的连接器
#[derive(Debug, Clone, Default)]
pub struct CosConnector {
    config: CosObjectStoreConfig,
}

impl CosConnector {
    pub fn new(config: CosObjectStoreConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl StoreConnector for CosConnector {
    async fn connect(
        &self,
        credentials: &HmacCredentials,
    ) -> Result<Box<dyn ObjectStore>, ObjectStoreError> {
        let store = CosObjectStore::connect(self.config.clone(), credentials).await?;
        Ok(Box::new(store))
    }
}
