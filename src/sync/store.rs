// Object store client
//
// Seam between the checkpoint-sync callback and the bucket it uploads to.
// The production implementation is S3; tests substitute a recording store.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::primitives::ByteStream;
use walkdir::WalkDir;

/// Trait for object stores that accept recursive directory uploads
///
/// `remote` is a `{bucket}/{prefix}` path. Upload failures propagate to the
/// caller; there is deliberately no retry or backoff policy here.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Copy the directory tree rooted at `local` under `remote`.
    async fn put_recursive(&self, local: &Path, remote: &str) -> Result<()>;
}

/// Trait for constructing an object-store client
///
/// The callback constructs its client lazily and at most once; routing the
/// construction through a factory lets tests observe and count it.
#[async_trait]
pub trait ObjectStoreFactory: Send + Sync {
    async fn create(&self, region: &str) -> Result<Arc<dyn ObjectStore>>;
}

/// Factory producing S3-backed stores pinned to a region.
pub struct S3StoreFactory;

#[async_trait]
impl ObjectStoreFactory for S3StoreFactory {
    async fn create(&self, region: &str) -> Result<Arc<dyn ObjectStore>> {
        Ok(Arc::new(S3ObjectStore::connect(region).await))
    }
}

/// S3-backed object store
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    /// Connect with the default credential chain, pinned to `region`.
    pub async fn connect(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self {
            client: aws_sdk_s3::Client::new(&config),
        }
    }
}

/// Split a `{bucket}/{prefix}` remote path into its parts.
pub(crate) fn split_remote(remote: &str) -> Result<(&str, &str)> {
    match remote.split_once('/') {
        Some((bucket, prefix)) if !bucket.is_empty() && !prefix.is_empty() => Ok((bucket, prefix)),
        _ => bail!("Remote path '{remote}' is not of the form bucket/prefix"),
    }
}

/// Walk a local directory and pair each file with its object key under `prefix`.
pub(crate) fn file_keys(local: &Path, prefix: &str) -> Result<Vec<(std::path::PathBuf, String)>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(local).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("Failed to walk checkpoint directory {local:?}"))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(local)
            .with_context(|| format!("File {:?} escapes {local:?}", entry.path()))?;
        files.push((
            entry.path().to_path_buf(),
            format!("{}/{}", prefix, relative.display()),
        ));
    }

    Ok(files)
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_recursive(&self, local: &Path, remote: &str) -> Result<()> {
        let (bucket, prefix) = split_remote(remote)?;

        for (path, key) in file_keys(local, prefix)? {
            let body = ByteStream::from_path(&path)
                .await
                .with_context(|| format!("Failed to read {path:?}"))?;

            self.client
                .put_object()
                .bucket(bucket)
                .key(&key)
                .body(body)
                .send()
                .await
                .with_context(|| format!("Failed to upload {path:?} to s3://{bucket}/{key}"))?;

            tracing::debug!(key = %key, "Uploaded checkpoint file");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_file_keys_mirror_directory_layout() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("checkpoint-500");
        fs::create_dir_all(root.join("optimizer")).unwrap();
        fs::write(root.join("model.safetensors"), b"weights").unwrap();
        fs::write(root.join("optimizer/state.bin"), b"state").unwrap();

        let files = file_keys(&root, "run1/checkpoint-500").unwrap();
        let keys: Vec<&str> = files.iter().map(|(_, k)| k.as_str()).collect();

        assert_eq!(
            keys,
            vec![
                "run1/checkpoint-500/model.safetensors",
                "run1/checkpoint-500/optimizer/state.bin",
            ]
        );
    }

    #[test]
    fn test_file_keys_on_missing_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("does-not-exist");
        assert!(file_keys(&missing, "run1/checkpoint-1").is_err());
    }

    #[test]
    fn test_split_remote() {
        let (bucket, prefix) = split_remote("ckpts/run1/checkpoint-500").unwrap();
        assert_eq!(bucket, "ckpts");
        assert_eq!(prefix, "run1/checkpoint-500");
    }

    #[test]
    fn test_split_remote_rejects_bare_bucket() {
        assert!(split_remote("ckpts").is_err());
        assert!(split_remote("/prefix").is_err());
        assert!(split_remote("").is_err());
    }
}
