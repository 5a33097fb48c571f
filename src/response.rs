use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::models::admin::Profile;
use crate::core::models::application::Application;
use crate::serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

impl Message {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

#[derive(Debug, Serialize)]
pub struct ApplicationList {
    applications: Vec<Application>,
    total: i64,
}

impl ApplicationList {
    pub fn new(applications: Vec<Application>, total: i64) -> Self {
        ApplicationList { applications, total }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submitted {
    pub message: &'static str,
    pub application_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct Updated {
    pub message: &'static str,
    pub application: Application,
}

#[derive(Debug, Serialize)]
pub struct LoggedIn {
    pub message: &'static str,
    pub token: String,
    pub admin: Profile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracked {
    pub message: &'static str,
    pub application_id: Uuid,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}
