use async_trait::async_trait;
use std::path::Path;

use crate::oss::{HmacCredentials, ObjectMeta, ObjectStoreError};

/// 对象存储统一接口
///
/// 与常见的单桶客户端不同，这里每个操作都显式携带 bucket 名称，
/// 一个客户端实例可以服务多个存储桶。
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// 上传本地文件到 `bucket`，对象名为 `key`
    async fn upload_object(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
    ) -> Result<(), ObjectStoreError>;

    /// 循环分页获取 bucket 下（可选前缀）的全部对象
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<ObjectMeta>, ObjectStoreError>;

    /// 删除对象
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ObjectStoreError>;

    /// 清空存储桶，返回删除的对象个数
    ///
    /// 默认实现先列出全部对象再逐个删除，遇到第一个删除错误即返回。
    async fn clear_bucket(&self, bucket: &str) -> Result<usize, ObjectStoreError> {
        let objects = self.list_objects(bucket, None).await?;
        let total = objects.len();

        for obj in &objects {
            self.delete_object(bucket, &obj.key).await?;
        }

        log::info!("cleared {} objects from bucket {}", total, bucket);
        Ok(total)
    }
}

/// 根据凭证创建 [`ObjectStore`] 客户端
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(
        &self,
        credentials: &HmacCredentials,
    ) -> Result<Box<dyn ObjectStore>, ObjectStoreError>;
}
