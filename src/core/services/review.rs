use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::models::application::{Application, ApplicationStatus, Query, StatusCounts, Update};
use crate::core::models::UploadedFile;
use crate::core::ports::repository::ApplicationCommon;
use crate::core::services::export::{self, ExportFormat};
use crate::core::uploader::Uploader;
use crate::error::Error;

/// Ids that don't parse can't name a stored application.
pub fn parse_id(id: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(id.trim()).map_err(|_| Error::NotFound)
}

pub async fn list<D>(db: &D, query: &Query) -> Result<(Vec<Application>, i64), Error>
where
    D: ApplicationCommon,
{
    let apps = db.query(query).await?;
    let total = apps.len() as i64;
    Ok((apps, total))
}

pub async fn detail<D>(db: &D, id: Uuid) -> Result<Application, Error>
where
    D: ApplicationCommon,
{
    db.get(id).await?.ok_or(Error::NotFound)
}

pub async fn update<D>(db: &D, id: Uuid, update: Update) -> Result<Application, Error>
where
    D: ApplicationCommon,
{
    let mut app = detail(db, id).await?;
    update.apply(&mut app);
    app.validate()?;
    app.updated_at = Utc::now();
    if !db.replace(&app).await? {
        return Err(Error::NotFound);
    }
    Ok(app)
}

pub async fn update_status<D>(db: &D, id: Uuid, status: Option<&str>) -> Result<Application, Error>
where
    D: ApplicationCommon,
{
    let status: ApplicationStatus = status.ok_or(Error::InvalidStatus)?.parse()?;
    db.update_status(id, status, Utc::now()).await?.ok_or(Error::NotFound)
}

/// Removes the record, then makes one attempt at removing its resume.
pub async fn delete<D, U>(db: &D, uploader: &U, id: Uuid) -> Result<(), Error>
where
    D: ApplicationCommon,
    U: Uploader,
{
    let app = detail(db, id).await?;
    if !db.delete(id).await? {
        return Err(Error::NotFound);
    }
    if !app.resume_path.is_empty() {
        match uploader.delete(&app.resume_path).await {
            Ok(()) => log::info!("deleted resume file {}", app.resume_path),
            Err(e) => log::warn!("failed to delete resume file {} for application {}: {}", app.resume_path, id, e),
        }
    }
    Ok(())
}

pub async fn resume<D, U>(db: &D, uploader: &U, id: Uuid) -> Result<UploadedFile, Error>
where
    D: ApplicationCommon,
    U: Uploader,
{
    let app = detail(db, id).await?;
    if app.resume_path.is_empty() {
        return Err(Error::NotFound);
    }
    uploader.get(&app.resume_path).await
}

#[derive(Debug)]
pub struct Export {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

pub async fn export<D>(db: &D, query: &Query, format: ExportFormat, today: DateTime<Utc>) -> Result<Export, Error>
where
    D: ApplicationCommon,
{
    let apps = db.query(query).await?;
    Ok(Export {
        filename: format!("applications_{}.{}", today.format("%Y-%m-%d"), format.extension()),
        content_type: format.content_type(),
        body: export::render(&apps, format)?,
    })
}

pub async fn stats<D>(db: &D) -> Result<StatusCounts, Error>
where
    D: ApplicationCommon,
{
    Ok(StatusCounts::from_groups(db.count_by_status().await?))
}

#[derive(Debug)]
pub struct Tracked {
    pub application_id: Uuid,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

pub async fn track<D>(db: &D, application_id: Option<&str>, action: Option<&str>) -> Result<Tracked, Error>
where
    D: ApplicationCommon,
{
    let (application_id, action) = match (application_id.filter(|s| !s.is_empty()), action.filter(|s| !s.is_empty())) {
        (Some(id), Some(action)) => (id, action),
        _ => return Err(Error::BusinessError("Application ID and action are required".into())),
    };
    let app = detail(db, parse_id(application_id)?).await?;
    let timestamp = Utc::now();
    log::info!("Application {} {} at {}", app.id, action, timestamp.to_rfc3339());
    Ok(Tracked {
        application_id: app.id,
        action: action.to_owned(),
        timestamp,
    })
}
