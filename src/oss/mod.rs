//! 对象存储模块
//!
//! 定义统一的 [`ObjectStore`] 接口与 [`StoreConnector`] 连接器，
//! 并提供基于 aws-sdk-s3 的 S3 兼容实现 [`CosObjectStore`]。

mod cos_object_store;
mod error;
mod object_store;
mod object_store_types;

pub use cos_object_store::{CosConnector, CosObjectStore, CosObjectStoreConfig, MIN_PART_SIZE};
pub use error::ObjectStoreError;
pub use object_store::{ObjectStore, StoreConnector};
pub use object_store_types::{HmacCredentials, ObjectMeta, PartInfo};
