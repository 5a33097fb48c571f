pub mod admin;
pub mod application;
pub mod submission;
pub mod upload_file;

pub use upload_file::{UploadedFile, UploadedFileCreate};
