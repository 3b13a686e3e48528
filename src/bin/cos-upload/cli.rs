// CLI argument definitions using clap

use clap::Parser;
use cos_upload::UploadRequest;

#[derive(Parser, Debug)]
#[command(name = "cos-upload")]
#[command(version)]
#[command(about = "Upload files to a Cloud Object Storage bucket.", long_about = None)]
#[command(
    after_help = "Environment variables AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be defined to run the utility."
)]
pub struct Cli {
    /// Bucket name
    pub bucket: String,

    /// File or directory spec (a file, a glob pattern or a directory)
    pub source: String,

    /// Key name prefix
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Include files in subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Exclude subdirectory name from key name
    #[arg(short, long)]
    pub squash: bool,

    /// Clear bucket prior to upload
    #[arg(short, long)]
    pub wipe: bool,

    /// Path to config file (default: ~/.cos-upload/config.yaml)
    #[arg(short, long)]
    pub config: Option<String>,
}

impl Cli {
    /// Build the upload request described by the command line
    pub fn to_request(&self) -> UploadRequest {
        UploadRequest {
            bucket: self.bucket.clone(),
            source_spec: self.source.clone(),
            prefix: self.prefix.clone(),
            wipe: self.wipe,
            squash: self.squash,
            recursive: self.recursive,
        }
    }
}
