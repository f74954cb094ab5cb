//! Artifact upload.

use std::path::Path;

use async_trait::async_trait;

use pvgen_storage::{retry_async, ObjectStore, RetryConfig, StorageResult};

/// Destination for a user's rendered artifacts.
///
/// A trait seam so the pipeline can be driven against a local fake in tests.
#[async_trait]
pub trait ArtifactUploader: Send + Sync {
    /// Upload the rendered video, returning its public URL.
    async fn upload_video(&self, path: &Path, key: &str) -> StorageResult<String>;

    /// Upload the cover image, returning its public URL.
    async fn upload_cover(&self, path: &Path, key: &str) -> StorageResult<String>;
}

/// Uploader backed by the S3-compatible object store.
pub struct StoreUploader {
    store: ObjectStore,
    client_name: String,
}

impl StoreUploader {
    pub fn new(store: ObjectStore, client_name: impl Into<String>) -> Self {
        Self {
            store,
            client_name: client_name.into(),
        }
    }

    fn video_key(&self, key: &str) -> String {
        format!("videos/{}/{}.mp4", self.client_name, key)
    }

    fn cover_key(&self, key: &str) -> String {
        format!("cover_images/{}/{}.jpg", self.client_name, key)
    }
}

#[async_trait]
impl ArtifactUploader for StoreUploader {
    async fn upload_video(&self, path: &Path, key: &str) -> StorageResult<String> {
        let object_key = self.video_key(key);
        let config = RetryConfig::new("video_upload");
        retry_async(&config, || {
            self.store.upload_file(path, &object_key, "video/mp4")
        })
        .await
    }

    async fn upload_cover(&self, path: &Path, key: &str) -> StorageResult<String> {
        let object_key = self.cover_key(key);
        let config = RetryConfig::new("cover_upload");
        retry_async(&config, || {
            self.store.upload_file(path, &object_key, "image/jpeg")
        })
        .await
    }
}
