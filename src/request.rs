use actix_web::web::{JsonConfig, QueryConfig};
use serde_json::Value;

use crate::core::models::application::{ApplicationStatus, Query};
use crate::error::Error;
use crate::serde::Deserialize;

/// Malformed JSON bodies answer with the same `{"error"}` shape as every other failure.
pub fn json_config() -> JsonConfig {
    JsonConfig::default().error_handler(|err, _| Error::InvalidRequest(err.to_string()).into())
}

pub fn query_config() -> QueryConfig {
    QueryConfig::default().error_handler(|err, _| Error::InvalidRequest(err.to_string()).into())
}

#[derive(Debug, Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
}

/// `None`, empty and `all` all mean "don't filter".
fn filter_value(v: &Option<String>) -> Option<String> {
    v.as_deref().map(str::trim).filter(|v| !v.is_empty() && *v != "all").map(str::to_owned)
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub search: Option<String>,
    pub role: Option<String>,
}

impl ListParams {
    pub fn to_query(&self) -> Result<Query, Error> {
        let status_eq = filter_value(&self.status).map(|s| s.parse::<ApplicationStatus>()).transpose()?;
        Ok(Query {
            status_eq,
            search: self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned),
            role_like: filter_value(&self.role),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
    pub status: Option<String>,
    pub role: Option<String>,
}

impl ExportParams {
    pub fn to_query(&self) -> Result<Query, Error> {
        ListParams {
            status: self.status.clone(),
            search: None,
            role: self.role.clone(),
        }
        .to_query()
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: Option<Value>,
}

impl StatusChange {
    /// Non-string values are treated like a missing status.
    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().and_then(Value::as_str)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackAction {
    pub application_id: Option<String>,
    pub action: Option<String>,
}
