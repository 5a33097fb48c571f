use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::models::application::{Application, ApplicationMetadata, PastExperience};
use crate::error::Error;

#[derive(Debug, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub whatsapp_number: String,
    pub branch: String,
    pub year: String,
    pub primary_role: String,
    pub secondary_role: String,
    pub why_this_role: String,
    pub past_experience: Json<PastExperience>,
    pub has_other_clubs: String,
    pub time_availability: String,
    pub resume_path: String,
    pub metadata: Json<ApplicationMetadata>,
    pub status: String,
    pub admin_remarks: Option<String>,
    pub feedback: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = Error;
    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|_| Error::ServerError(format!("application {} has unknown status {}", row.id, row.status)))?;
        Ok(Application {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            whatsapp_number: row.whatsapp_number,
            branch: row.branch,
            year: row.year,
            primary_role: row.primary_role,
            secondary_role: row.secondary_role,
            why_this_role: row.why_this_role,
            past_experience: row.past_experience.0,
            has_other_clubs: row.has_other_clubs,
            time_availability: row.time_availability,
            resume_path: row.resume_path,
            metadata: row.metadata.0,
            status,
            admin_remarks: row.admin_remarks,
            feedback: row.feedback,
            submitted_at: row.submitted_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
