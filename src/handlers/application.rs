use actix_multipart::Multipart;
use actix_web::{
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    web::{Data, Json, Path, Query},
    HttpRequest, HttpResponse,
};
use chrono::Utc;
use futures_util::TryStreamExt;

use crate::context::AdminInfo;
use crate::core::limiter::RateLimitStore;
use crate::core::models::application::{Application, StatusCounts, Update};
use crate::core::models::submission::{ResumeUpload, Submission, MAX_FIELD_BYTES, MAX_RESUME_BYTES, RESUME_FIELD};
use crate::core::ports::repository::ApplicationCommon;
use crate::core::services::export::ExportFormat;
use crate::core::services::{intake, review};
use crate::core::uploader::Uploader;
use crate::error::Error;
use crate::request::{ExportParams, ListParams, StatusChange, TrackAction};
use crate::response::{ApplicationList, Message, Submitted, Tracked, Updated};

/// First hop of `x-forwarded-for`, then `x-real-ip`, else `unknown`.
fn client_address(req: &HttpRequest) -> String {
    let header = |name: &str| req.headers().get(name).and_then(|v| v.to_str().ok()).map(str::trim).filter(|v| !v.is_empty());
    header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header("x-real-ip"))
        .unwrap_or("unknown")
        .to_owned()
}

/// Reads every part of the form. Parts are kept at most one byte past their limit so
/// validation can still tell that they were too large.
async fn read_submission(mut payload: Multipart) -> Result<Submission, Error> {
    let mut submission = Submission::default();
    while let Some(mut field) = payload.try_next().await? {
        let name = field.name().to_owned();
        let limit = 1 + if name == RESUME_FIELD { MAX_RESUME_BYTES } else { MAX_FIELD_BYTES };
        let mut content = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if content.len() < limit {
                let take = chunk.len().min(limit - content.len());
                content.extend_from_slice(&chunk[..take]);
            }
        }
        if name == RESUME_FIELD {
            submission.set_resume(ResumeUpload {
                filename: field.content_disposition().get_filename().map(str::to_owned),
                content_type: field.content_type().map(|m| m.essence_str().to_owned()),
                content,
            });
        } else if content.len() > MAX_FIELD_BYTES {
            submission.mark_oversized(&name);
        } else {
            submission.push_field(&name, &String::from_utf8_lossy(&content));
        }
    }
    Ok(submission)
}

pub async fn submit<D, U, L>(req: HttpRequest, payload: Multipart, db: Data<D>, uploader: Data<U>, limiter: Data<L>) -> Result<HttpResponse, Error>
where
    D: ApplicationCommon + 'static,
    U: Uploader + 'static,
    L: RateLimitStore + 'static,
{
    let address = client_address(&req);
    if !limiter.check_and_increment(&address).await {
        return Err(Error::RateLimited);
    }
    let submitted = match read_submission(payload).await {
        Ok(submission) => intake::submit_application(db.get_ref(), uploader.get_ref(), submission).await,
        Err(e) => Err(e),
    };
    match submitted {
        Ok(application_id) => Ok(HttpResponse::Created().json(Submitted {
            message: "Application submitted successfully",
            application_id,
        })),
        Err(e) if e.is_client_error() => Err(e),
        Err(e) => {
            log::error!("Application submission error from {}: {}", address, e);
            Err(Error::SubmissionFailed)
        }
    }
}

pub async fn list<D>(_: AdminInfo, Query(params): Query<ListParams>, db: Data<D>) -> Result<Json<ApplicationList>, Error>
where
    D: ApplicationCommon + 'static,
{
    let (applications, total) = review::list(db.get_ref(), &params.to_query()?).await?;
    Ok(Json(ApplicationList::new(applications, total)))
}

pub async fn detail<D>(_: AdminInfo, id: Path<String>, db: Data<D>) -> Result<Json<Application>, Error>
where
    D: ApplicationCommon + 'static,
{
    let app = review::detail(db.get_ref(), review::parse_id(&id)?).await?;
    Ok(Json(app))
}

pub async fn update<D>(_: AdminInfo, id: Path<String>, Json(body): Json<Update>, db: Data<D>) -> Result<Json<Updated>, Error>
where
    D: ApplicationCommon + 'static,
{
    let application = review::update(db.get_ref(), review::parse_id(&id)?, body).await?;
    Ok(Json(Updated {
        message: "Application updated successfully",
        application,
    }))
}

pub async fn update_status<D>(_: AdminInfo, id: Path<String>, Json(body): Json<StatusChange>, db: Data<D>) -> Result<Json<Updated>, Error>
where
    D: ApplicationCommon + 'static,
{
    let application = review::update_status(db.get_ref(), review::parse_id(&id)?, body.status()).await?;
    Ok(Json(Updated {
        message: "Application status updated successfully",
        application,
    }))
}

pub async fn delete<D, U>(admin: AdminInfo, id: Path<String>, db: Data<D>, uploader: Data<U>) -> Result<Json<Message>, Error>
where
    D: ApplicationCommon + 'static,
    U: Uploader + 'static,
{
    let id = review::parse_id(&id)?;
    review::delete(db.get_ref(), uploader.get_ref(), id).await?;
    log::info!("application {} deleted by {} ({})", id, admin.username, admin.id);
    Ok(Json(Message::new("Application and associated files deleted successfully")))
}

pub async fn resume<D, U>(_: AdminInfo, id: Path<String>, db: Data<D>, uploader: Data<U>) -> Result<HttpResponse, Error>
where
    D: ApplicationCommon + 'static,
    U: Uploader + 'static,
{
    let file = review::resume(db.get_ref(), uploader.get_ref(), review::parse_id(&id)?).await?;
    let filename = file.key.rsplit('/').next().unwrap_or("resume.pdf").to_owned();
    Ok(HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, file.content_type))
        .insert_header((CONTENT_DISPOSITION, format!("inline; filename=\"{}\"", filename)))
        .body(file.content))
}

pub async fn export<D>(_: AdminInfo, Query(params): Query<ExportParams>, db: Data<D>) -> Result<HttpResponse, Error>
where
    D: ApplicationCommon + 'static,
{
    let format = ExportFormat::parse(params.format.as_deref());
    let export = review::export(db.get_ref(), &params.to_query()?, format, Utc::now()).await?;
    Ok(HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, export.content_type))
        .insert_header((CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", export.filename)))
        .body(export.body))
}

pub async fn stats<D>(_: AdminInfo, db: Data<D>) -> Result<Json<StatusCounts>, Error>
where
    D: ApplicationCommon + 'static,
{
    Ok(Json(review::stats(db.get_ref()).await?))
}

pub async fn track<D>(_: AdminInfo, Json(body): Json<TrackAction>, db: Data<D>) -> Result<Json<Tracked>, Error>
where
    D: ApplicationCommon + 'static,
{
    let tracked = review::track(db.get_ref(), body.application_id.as_deref(), body.action.as_deref()).await?;
    Ok(Json(Tracked {
        message: "Action tracked successfully",
        application_id: tracked.application_id,
        action: tracked.action,
        timestamp: tracked.timestamp,
    }))
}
