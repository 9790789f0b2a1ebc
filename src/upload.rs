use crate::error::Error;
use crate::location::S3Location;
use aws_config::SdkConfig;
use aws_sdk_s3::primitives::ByteStream;
use eyre::Context;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Uploads run concurrently, a few at a time
const MAX_CONCURRENT_UPLOADS: usize = 4;

/// Publishes local template and parameter files to the artifacts location
pub struct Uploader {
    client: aws_sdk_s3::Client,
    location: S3Location,
}

impl Uploader {
    pub fn new(sdk_config: &SdkConfig, location: S3Location) -> Self {
        Uploader {
            client: aws_sdk_s3::Client::new(sdk_config),
            location,
        }
    }

    /// Upload every file under the directory, keyed by its relative path
    ///
    /// Returns the number of uploaded files.
    pub async fn publish_dir(&self, root: &Path) -> eyre::Result<usize> {
        let files = collect_files(root)?;
        let total = files.len();

        stream::iter(files)
            .map(|file| self.upload(root.to_path_buf(), file))
            .buffer_unordered(MAX_CONCURRENT_UPLOADS)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect::<eyre::Result<Vec<_>>>()?;

        Ok(total)
    }

    async fn upload(&self, root: PathBuf, file: PathBuf) -> eyre::Result<()> {
        let key = self.location.key_for(&root, &file)?;

        let body = ByteStream::from_path(&file)
            .await
            .wrap_err(format!("Failed to read {file:?}"))?;

        self.client
            .put_object()
            .bucket(self.location.bucket())
            .key(&key)
            .body(body)
            .send()
            .await
            .wrap_err(format!("Failed to upload {file:?}"))?;

        println!(
            "{} s3://{}/{}",
            console::style("    Uploaded").green().bold(),
            self.location.bucket(),
            key
        );

        Ok(())
    }
}

/// Regular files under the publish root
fn collect_files(root: &Path) -> eyre::Result<Vec<PathBuf>> {
    let files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect();

    if files.is_empty() {
        return Err(Error::new(
            &format!("Nothing to publish at {root:?}"),
            Some("Expected templates/ and parameters/ under the infrastructure directory"),
        )
        .into());
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn collects_files_recursively() {
        let dir = tempfile::tempdir().expect("tempdir");
        let templates = dir.path().join("templates");
        let parameters = dir.path().join("parameters");
        fs::create_dir_all(&templates).expect("mkdir");
        fs::create_dir_all(&parameters).expect("mkdir");
        fs::write(templates.join("template.json"), "{}").expect("write");
        fs::write(parameters.join("parameters-dev.json"), "[]").expect("write");

        let mut files = collect_files(dir.path()).expect("files");
        files.sort();

        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("parameters/parameters-dev.json"));
        assert!(files[1].ends_with("templates/template.json"));
    }

    #[test]
    fn empty_or_missing_root_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");

        assert!(collect_files(dir.path()).is_err());
        assert!(collect_files(&dir.path().join("does-not-exist")).is_err());
    }
}
