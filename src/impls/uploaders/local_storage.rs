use std::path::{Component, Path, PathBuf};

use crate::core::models::{UploadedFile, UploadedFileCreate};
use crate::core::uploader::Uploader;
use crate::error::Error;

/// Files on local disk, published under `public_base_url`.
pub struct LocalStorage {
    path: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub fn new(path: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            path: path.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url_of(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    /// Maps a stored reference back to its key below `path`.
    fn key_of<'r>(&self, reference: &'r str) -> Result<&'r str, Error> {
        let key = reference
            .strip_prefix(&self.public_base_url)
            .unwrap_or(reference)
            .trim_start_matches('/');
        let safe = !key.is_empty() && Path::new(key).components().all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(Error::UploadError(format!("invalid file reference: {}", reference)));
        }
        Ok(key)
    }
}

fn content_type_of(key: &str) -> &'static str {
    if key.to_lowercase().ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}

impl Uploader for LocalStorage {
    async fn put(&self, file: UploadedFileCreate) -> Result<String, Error> {
        let key = self.key_of(&file.key)?.to_owned();
        let target = self.path.join(&key);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, file.content).await?;
        Ok(self.url_of(&key))
    }

    async fn get(&self, reference: &str) -> Result<UploadedFile, Error> {
        let key = self.key_of(reference)?;
        let content = match tokio::fs::read(self.path.join(key)).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(Error::NotFound),
            Err(e) => return Err(e.into()),
        };
        Ok(UploadedFile {
            key: key.to_owned(),
            content_type: content_type_of(key).to_owned(),
            content,
        })
    }

    async fn delete(&self, reference: &str) -> Result<(), Error> {
        let key = self.key_of(reference)?;
        tokio::fs::remove_file(self.path.join(key)).await?;
        Ok(())
    }
}
