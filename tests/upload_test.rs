//! Uploader 的集成测试
//!
//! 使用内存中的记录型 ObjectStore，验证文件枚举、对象名生成与调用顺序。

use async_trait::async_trait;
use cos_upload::{
    HmacCredentials, ObjectMeta, ObjectStore, ObjectStoreError, StoreConnector, UploadError,
    UploadProgress, UploadRequest, Uploader,
};
use serial_test::serial;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ============================================================================
// 测试替身
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Connect,
    Clear(String),
    Upload { file: PathBuf, bucket: String, key: String },
}

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<Call>>,
    fail_connect: bool,
    fail_clear: bool,
    fail_upload_key: Option<String>,
}

impl Recorder {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn uploaded_keys(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Upload { key, .. } => Some(key),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

struct RecordingStore(Arc<Recorder>);

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn upload_object(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
    ) -> Result<(), ObjectStoreError> {
        self.0.record(Call::Upload {
            file: local_path.to_path_buf(),
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        if self.0.fail_upload_key.as_deref() == Some(key) {
            return Err(ObjectStoreError::Network("connection reset".to_string()));
        }
        Ok(())
    }

    async fn list_objects(
        &self,
        _bucket: &str,
        _prefix: Option<&str>,
    ) -> Result<Vec<ObjectMeta>, ObjectStoreError> {
        Ok(Vec::new())
    }

    async fn delete_object(&self, _bucket: &str, _key: &str) -> Result<(), ObjectStoreError> {
        Ok(())
    }

    async fn clear_bucket(&self, bucket: &str) -> Result<usize, ObjectStoreError> {
        self.0.record(Call::Clear(bucket.to_string()));
        if self.0.fail_clear {
            return Err(ObjectStoreError::Network("access denied".to_string()));
        }
        Ok(0)
    }
}

struct RecordingConnector(Arc<Recorder>);

#[async_trait]
impl StoreConnector for RecordingConnector {
    async fn connect(
        &self,
        _credentials: &HmacCredentials,
    ) -> Result<Box<dyn ObjectStore>, ObjectStoreError> {
        self.0.record(Call::Connect);
        if self.0.fail_connect {
            return Err(ObjectStoreError::Configuration("bad endpoint".to_string()));
        }
        Ok(Box::new(RecordingStore(self.0.clone())))
    }
}

#[derive(Default)]
struct RecordingProgress {
    lines: Mutex<Vec<String>>,
}

impl UploadProgress for RecordingProgress {
    fn on_clear_bucket(&self, bucket: &str) {
        self.lines.lock().unwrap().push(format!("clear {}", bucket));
    }

    fn on_upload(&self, _local_path: &Path, key: &str) {
        self.lines.lock().unwrap().push(format!("upload {}", key));
    }
}

fn uploader(recorder: &Arc<Recorder>) -> Uploader {
    Uploader::new(
        Arc::new(RecordingConnector(recorder.clone())),
        HmacCredentials::new("AKID", "SECRET"),
    )
}

/// root/a.txt, root/sub/b.txt
fn create_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    fs::write(dir.path().join("sub/b.txt"), "b").unwrap();
    dir
}

fn spec(dir: &TempDir, rest: &str) -> String {
    format!("{}/{}", dir.path().display(), rest)
}

// ============================================================================
// 测试用例
// ============================================================================

#[tokio::test]
async fn test_directory_non_recursive_uploads_top_level_only() {
    let dir = create_tree();
    let recorder = Arc::new(Recorder::default());

    let count = uploader(&recorder)
        .upload(&UploadRequest::new("bucket", spec(&dir, "")))
        .await
        .unwrap();

    assert_eq!(count, 1);
    assert_eq!(
        recorder.calls(),
        vec![
            Call::Connect,
            Call::Upload {
                file: dir.path().join("a.txt"),
                bucket: "bucket".to_string(),
                key: "a.txt".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_directory_recursive_uploads_everything() {
    let dir = create_tree();
    let recorder = Arc::new(Recorder::default());

    let request = UploadRequest {
        recursive: true,
        ..UploadRequest::new("bucket", dir.path().to_string_lossy())
    };
    let count = uploader(&recorder).upload(&request).await.unwrap();

    assert_eq!(count, 2);
    let mut keys = recorder.uploaded_keys();
    keys.sort();
    assert_eq!(keys, vec!["a.txt", "sub/b.txt"]);
}

/// 在 `dir` 下以相对路径执行上传，结束后恢复工作目录
async fn upload_from(dir: &Path, request: &UploadRequest, recorder: &Arc<Recorder>) {
    let cwd = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir).unwrap();
    let result = uploader(recorder).upload(request).await;
    std::env::set_current_dir(cwd).unwrap();
    result.unwrap();
}

#[tokio::test]
#[serial]
async fn test_relative_directory_with_current_dir_prefix() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("data/sub")).unwrap();
    fs::write(dir.path().join("data/a.txt"), "a").unwrap();
    fs::write(dir.path().join("data/sub/b.txt"), "b").unwrap();

    for source in ["./data", "./data/", "data"] {
        let recorder = Arc::new(Recorder::default());
        let request = UploadRequest {
            recursive: true,
            ..UploadRequest::new("bucket", source)
        };
        upload_from(dir.path(), &request, &recorder).await;

        let mut keys = recorder.uploaded_keys();
        keys.sort();
        assert_eq!(keys, vec!["a.txt", "sub/b.txt"], "source {}", source);
    }

    let recorder = Arc::new(Recorder::default());
    let request = UploadRequest {
        recursive: true,
        ..UploadRequest::new("bucket", "./data/*.txt")
    };
    upload_from(dir.path(), &request, &recorder).await;

    let mut keys = recorder.uploaded_keys();
    keys.sort();
    assert_eq!(keys, vec!["a.txt", "sub/b.txt"]);
}

#[tokio::test]
async fn test_directory_name_with_glob_characters() {
    let dir = TempDir::new().unwrap();
    let photos = dir.path().join("photos [2020]");
    fs::create_dir_all(&photos).unwrap();
    fs::write(photos.join("a.jpg"), "a").unwrap();

    let recorder = Arc::new(Recorder::default());
    uploader(&recorder)
        .upload(&UploadRequest::new("bucket", photos.to_string_lossy()))
        .await
        .unwrap();
    uploader(&recorder)
        .upload(&UploadRequest::new("bucket", photos.join("a.jpg").to_string_lossy()))
        .await
        .unwrap();

    assert_eq!(recorder.uploaded_keys(), vec!["a.jpg", "a.jpg"]);
}

#[tokio::test]
async fn test_squash_and_prefix() {
    let dir = create_tree();
    let recorder = Arc::new(Recorder::default());

    let request = UploadRequest {
        recursive: true,
        squash: true,
        prefix: Some("models/v1/".to_string()),
        ..UploadRequest::new("bucket", dir.path().to_string_lossy())
    };
    uploader(&recorder).upload(&request).await.unwrap();

    let mut keys = recorder.uploaded_keys();
    keys.sort();
    assert_eq!(keys, vec!["models/v1/a.txt", "models/v1/b.txt"]);
}

#[tokio::test]
async fn test_glob_pattern_recursive() {
    let dir = create_tree();
    fs::write(dir.path().join("sub/c.csv"), "c").unwrap();
    let recorder = Arc::new(Recorder::default());

    let request = UploadRequest {
        recursive: true,
        ..UploadRequest::new("bucket", spec(&dir, "*.txt"))
    };
    uploader(&recorder).upload(&request).await.unwrap();

    let mut keys = recorder.uploaded_keys();
    keys.sort();
    assert_eq!(keys, vec!["a.txt", "sub/b.txt"]);
}

#[tokio::test]
async fn test_single_file() {
    let dir = create_tree();
    let recorder = Arc::new(Recorder::default());

    let request = UploadRequest {
        prefix: Some("docs".to_string()),
        ..UploadRequest::new("bucket", spec(&dir, "sub/b.txt"))
    };
    let count = uploader(&recorder).upload(&request).await.unwrap();

    assert_eq!(count, 1);
    assert_eq!(recorder.uploaded_keys(), vec!["docs/b.txt"]);
}

#[tokio::test]
async fn test_no_matching_files() {
    let dir = create_tree();
    let recorder = Arc::new(Recorder::default());
    let source = spec(&dir, "*.json");

    let result = uploader(&recorder)
        .upload(&UploadRequest::new("bucket", source.clone()))
        .await;

    match result {
        Err(UploadError::NoMatchingFiles { source_spec }) => assert_eq!(source_spec, source),
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(recorder.uploaded_keys().is_empty());
}

#[tokio::test]
async fn test_empty_directory() {
    let dir = TempDir::new().unwrap();
    let recorder = Arc::new(Recorder::default());

    let result = uploader(&recorder)
        .upload(&UploadRequest::new("bucket", dir.path().to_string_lossy()))
        .await;

    assert!(matches!(result, Err(UploadError::NoMatchingFiles { .. })));
}

#[tokio::test]
async fn test_wipe_clears_once_before_uploads() {
    let dir = create_tree();
    let recorder = Arc::new(Recorder::default());

    let request = UploadRequest {
        wipe: true,
        recursive: true,
        ..UploadRequest::new("bucket", dir.path().to_string_lossy())
    };
    uploader(&recorder).upload(&request).await.unwrap();

    let calls = recorder.calls();
    let clears: Vec<usize> = calls
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, Call::Clear(_)))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(clears, vec![1]);
    assert_eq!(calls[1], Call::Clear("bucket".to_string()));
    assert!(calls[2..].iter().all(|c| matches!(c, Call::Upload { .. })));
    assert_eq!(calls.len(), 4);
}

#[tokio::test]
async fn test_wipe_failure() {
    let dir = create_tree();
    let recorder = Arc::new(Recorder {
        fail_clear: true,
        ..Default::default()
    });

    let request = UploadRequest {
        wipe: true,
        ..UploadRequest::new("bucket", dir.path().to_string_lossy())
    };
    let result = uploader(&recorder).upload(&request).await;

    match result {
        Err(err @ UploadError::Wipe { .. }) => {
            assert_eq!(
                err.to_string(),
                "Clearing of bucket \"bucket\" failed: network error: access denied"
            );
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(recorder.uploaded_keys().is_empty());
}

#[tokio::test]
async fn test_connect_failure_skips_storage_calls() {
    let dir = create_tree();
    let recorder = Arc::new(Recorder {
        fail_connect: true,
        ..Default::default()
    });

    let request = UploadRequest {
        wipe: true,
        ..UploadRequest::new("bucket", dir.path().to_string_lossy())
    };
    let result = uploader(&recorder).upload(&request).await;

    assert!(matches!(result, Err(UploadError::Connection(_))));
    assert_eq!(recorder.calls(), vec![Call::Connect]);
}

#[tokio::test]
async fn test_first_upload_failure_aborts() {
    let dir = create_tree();
    fs::write(dir.path().join("c.txt"), "c").unwrap();
    let recorder = Arc::new(Recorder {
        fail_upload_key: Some("a.txt".to_string()),
        ..Default::default()
    });

    let result = uploader(&recorder)
        .upload(&UploadRequest::new("bucket", spec(&dir, "*.txt")))
        .await;

    match result {
        Err(UploadError::Transfer { bucket, source }) => {
            assert_eq!(bucket, "bucket");
            assert!(matches!(source, ObjectStoreError::Network(_)));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    // c.txt 不会再被尝试
    assert_eq!(recorder.uploaded_keys(), vec!["a.txt"]);
}

#[tokio::test]
async fn test_progress_callback() {
    let dir = create_tree();
    let recorder = Arc::new(Recorder::default());
    let progress = Arc::new(RecordingProgress::default());

    let request = UploadRequest {
        wipe: true,
        ..UploadRequest::new("bucket", dir.path().to_string_lossy())
    };
    uploader(&recorder)
        .with_progress(progress.clone())
        .upload(&request)
        .await
        .unwrap();

    assert_eq!(
        *progress.lines.lock().unwrap(),
        vec!["clear bucket".to_string(), "upload a.txt".to_string()]
    );
}
