use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::models::{
    admin::{Admin, Upsert as AdminUpsert, UpsertOutcome},
    application::{Application, ApplicationStatus, Insert as ApplicationInsert, Query as ApplicationQuery},
};
use crate::error::Error;

pub trait ApplicationCommon {
    async fn insert(&self, data: ApplicationInsert) -> Result<Uuid, Error>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, Error>;
    async fn get(&self, id: Uuid) -> Result<Option<Application>, Error>;
    /// Matching applications, newest submission first.
    async fn query(&self, query: &ApplicationQuery) -> Result<Vec<Application>, Error>;
    /// Writes every mutable column of `app`; false when the id no longer resolves.
    async fn replace(&self, app: &Application) -> Result<bool, Error>;
    async fn update_status(&self, id: Uuid, status: ApplicationStatus, updated_at: DateTime<Utc>) -> Result<Option<Application>, Error>;
    async fn delete(&self, id: Uuid) -> Result<bool, Error>;
    async fn count_by_status(&self) -> Result<Vec<(ApplicationStatus, i64)>, Error>;
}

pub trait AdminCommon {
    async fn get_active_by_username(&self, username: &str) -> Result<Option<Admin>, Error>;
    async fn upsert_by_email(&self, data: AdminUpsert) -> Result<UpsertOutcome, Error>;
}
