// Console output for cos-upload

use cos_upload::UploadProgress;
use std::path::Path;

/// Prints one line per bucket clear and per uploaded file to stdout
pub struct ConsoleProgress;

impl UploadProgress for ConsoleProgress {
    fn on_clear_bucket(&self, bucket: &str) {
        println!("{}", clear_message(bucket));
    }

    fn on_upload(&self, local_path: &Path, key: &str) {
        println!("{}", upload_message(local_path, key));
    }
}

fn clear_message(bucket: &str) -> String {
    format!("Clearing bucket \"{}\" ...", bucket)
}

fn upload_message(local_path: &Path, key: &str) -> String {
    format!("Uploading \"{}\" => \"{}\"", local_path.display(), key)
}
