#[derive(Debug)]
pub struct UploadedFile {
    pub key: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

#[derive(Debug)]
pub struct UploadedFileCreate {
    pub key: String,
    pub content: Vec<u8>,
}
