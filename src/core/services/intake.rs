use chrono::Utc;
use uuid::Uuid;

use crate::core::models::submission::Submission;
use crate::core::models::UploadedFileCreate;
use crate::core::ports::repository::ApplicationCommon;
use crate::core::uploader::Uploader;
use crate::error::Error;

/// Runs a parsed submission through the intake checks and persists it.
pub async fn submit_application<D, U>(db: &D, uploader: &U, mut submission: Submission) -> Result<Uuid, Error>
where
    D: ApplicationCommon,
    U: Uploader,
{
    // bots fill the hidden field; answer as vaguely as possible
    if submission.is_honeypot_tripped() {
        return Err(Error::InvalidSubmission);
    }
    if let Some(email) = submission.email() {
        if db.exists_by_email(&email).await? {
            return Err(Error::DuplicateEmail);
        }
    }
    submission.validate()?;
    let resume_path = match submission.take_resume() {
        Some(resume) => {
            let key = submission.resume_key(Utc::now().timestamp_millis());
            uploader
                .put(UploadedFileCreate {
                    key,
                    content: resume.content,
                })
                .await?
        }
        None => String::new(),
    };
    match db.insert(submission.into_insert(resume_path.clone())).await {
        Ok(id) => Ok(id),
        Err(e) => {
            if !resume_path.is_empty() {
                if let Err(cleanup) = uploader.delete(&resume_path).await {
                    log::warn!("failed to remove orphaned resume {}: {}", resume_path, cleanup);
                }
            }
            Err(e)
        }
    }
}
