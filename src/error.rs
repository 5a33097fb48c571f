use std::collections::BTreeMap;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

use crate::thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("jwt error: {0}")]
    JWTError(#[from] jsonwebtoken::errors::Error),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("multipart error: {0}")]
    MultipartError(#[from] actix_multipart::MultipartError),

    #[error("dotenv error: {0}")]
    DotEnvError(#[from] dotenv::Error),

    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("upload error: {0}")]
    UploadError(String),

    #[error("server error: {0}")]
    ServerError(String),

    #[error("bussiness error: {0}")]
    BusinessError(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Setup disabled or unauthorized")]
    Forbidden,

    #[error("Validation failed")]
    Validation(BTreeMap<String, String>),

    #[error("An application with this email already exists")]
    DuplicateEmail,

    #[error("Invalid submission")]
    InvalidSubmission,

    #[error("Too many requests. Please try again later.")]
    RateLimited,

    #[error("Application not found")]
    NotFound,

    #[error("Invalid status")]
    InvalidStatus,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to submit application")]
    SubmissionFailed,
}

impl Error {
    pub fn validation(field: &str, message: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(field.to_owned(), message.to_owned());
        Error::Validation(fields)
    }

    /// True for failures the client caused; anything else is an internal fault.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthorized | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::Validation(_) | Error::MultipartError(_) | Error::DuplicateEmail | Error::InvalidSubmission | Error::InvalidStatus | Error::InvalidRequest(_) | Error::BusinessError(_) => StatusCode::BAD_REQUEST,
            Error::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Error::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            Error::Validation(fields) => json!({ "error": self.to_string(), "fields": fields }),
            Error::BusinessError(msg) => json!({ "error": msg }),
            _ if status.is_server_error() => {
                if !matches!(self, Error::SubmissionFailed) {
                    log::error!("{}", self);
                }
                let message = match self {
                    Error::SubmissionFailed => self.to_string(),
                    _ => "Internal server error".to_owned(),
                };
                json!({ "error": message })
            }
            _ => json!({ "error": self.to_string() }),
        };
        HttpResponse::build(status).json(body)
    }
}
