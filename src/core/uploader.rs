use crate::core::models::{UploadedFile, UploadedFileCreate};
use crate::error::Error;

/// Object store for uploaded files. References are what `put` returns and what
/// gets persisted on the owning record.
pub trait Uploader {
    async fn put(&self, file: UploadedFileCreate) -> Result<String, Error>;
    async fn get(&self, reference: &str) -> Result<UploadedFile, Error>;
    async fn delete(&self, reference: &str) -> Result<(), Error>;
}
