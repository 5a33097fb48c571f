use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{query, query_as, query_scalar, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::models::{
    admin::{Admin, Upsert as AdminUpsert, UpsertOutcome},
    application::{Application, ApplicationStatus, Insert as ApplicationInsert, Query as ApplicationQuery},
};
use crate::core::ports::repository::{AdminCommon, ApplicationCommon};
use crate::database::models::application::ApplicationRow;
use crate::error::Error;

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgSqlx {
    pool: PgPool,
}

impl PgSqlx {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// The only unique constraint on applications is the email index.
fn map_unique_violation(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return Error::DuplicateEmail;
        }
    }
    err.into()
}

fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl ApplicationCommon for PgSqlx {
    async fn insert(&self, data: ApplicationInsert) -> Result<Uuid, Error> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        query(
            "INSERT INTO applications (
                id, full_name, email, whatsapp_number, branch, year, primary_role, secondary_role,
                why_this_role, past_experience, has_other_clubs, time_availability, resume_path, metadata,
                status, submitted_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16, $16)",
        )
        .bind(id)
        .bind(data.full_name)
        .bind(data.email)
        .bind(data.whatsapp_number)
        .bind(data.branch)
        .bind(data.year)
        .bind(data.primary_role)
        .bind(data.secondary_role)
        .bind(data.why_this_role)
        .bind(Json(data.past_experience))
        .bind(data.has_other_clubs)
        .bind(data.time_availability)
        .bind(data.resume_path)
        .bind(Json(data.metadata))
        .bind(ApplicationStatus::Pending.as_str())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;
        Ok(id)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, Error> {
        let exists = query_scalar("SELECT EXISTS(SELECT 1 FROM applications WHERE lower(email) = lower($1))")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Application>, Error> {
        let row: Option<ApplicationRow> = query_as("SELECT * FROM applications WHERE id = $1").bind(id).fetch_optional(&self.pool).await?;
        row.map(Application::try_from).transpose()
    }

    async fn query(&self, query: &ApplicationQuery) -> Result<Vec<Application>, Error> {
        let mut stmt = QueryBuilder::<Postgres>::new("SELECT * FROM applications WHERE 1 = 1");
        if let Some(status) = query.status_eq {
            stmt.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(role) = &query.role_like {
            let pattern = like_pattern(role);
            stmt.push(" AND (primary_role ILIKE ").push_bind(pattern.clone());
            stmt.push(" OR secondary_role ILIKE ").push_bind(pattern);
            stmt.push(")");
        }
        if let Some(search) = &query.search {
            let pattern = like_pattern(search);
            stmt.push(" AND (full_name ILIKE ").push_bind(pattern.clone());
            stmt.push(" OR email ILIKE ").push_bind(pattern.clone());
            stmt.push(" OR whatsapp_number ILIKE ").push_bind(pattern);
            stmt.push(")");
        }
        stmt.push(" ORDER BY submitted_at DESC");
        let rows: Vec<ApplicationRow> = stmt.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(Application::try_from).collect()
    }

    async fn replace(&self, app: &Application) -> Result<bool, Error> {
        let result = query(
            "UPDATE applications SET
                full_name = $2, email = $3, whatsapp_number = $4, branch = $5, year = $6,
                primary_role = $7, secondary_role = $8, why_this_role = $9, past_experience = $10,
                has_other_clubs = $11, time_availability = $12, resume_path = $13, metadata = $14,
                status = $15, admin_remarks = $16, feedback = $17, updated_at = $18
            WHERE id = $1",
        )
        .bind(app.id)
        .bind(&app.full_name)
        .bind(&app.email)
        .bind(&app.whatsapp_number)
        .bind(&app.branch)
        .bind(&app.year)
        .bind(&app.primary_role)
        .bind(&app.secondary_role)
        .bind(&app.why_this_role)
        .bind(Json(&app.past_experience))
        .bind(&app.has_other_clubs)
        .bind(&app.time_availability)
        .bind(&app.resume_path)
        .bind(Json(&app.metadata))
        .bind(app.status.as_str())
        .bind(&app.admin_remarks)
        .bind(&app.feedback)
        .bind(app.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_status(&self, id: Uuid, status: ApplicationStatus, updated_at: DateTime<Utc>) -> Result<Option<Application>, Error> {
        let row: Option<ApplicationRow> = query_as("UPDATE applications SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(status.as_str())
            .bind(updated_at)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Application::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, Error> {
        let result = query("DELETE FROM applications WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_by_status(&self) -> Result<Vec<(ApplicationStatus, i64)>, Error> {
        let groups: Vec<(String, i64)> = query_as("SELECT status, COUNT(*) FROM applications GROUP BY status").fetch_all(&self.pool).await?;
        let mut counts = Vec::with_capacity(groups.len());
        for (status, n) in groups {
            match status.parse::<ApplicationStatus>() {
                Ok(status) => counts.push((status, n)),
                Err(_) => log::warn!("ignoring {} applications with unknown status {}", n, status),
            }
        }
        Ok(counts)
    }
}

impl AdminCommon for PgSqlx {
    async fn get_active_by_username(&self, username: &str) -> Result<Option<Admin>, Error> {
        let admin = query_as("SELECT id, username, email, password, salt, is_active FROM admins WHERE username = $1 AND is_active")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(admin)
    }

    async fn upsert_by_email(&self, data: AdminUpsert) -> Result<UpsertOutcome, Error> {
        let mut tx = self.pool.begin().await?;
        let updated = query("UPDATE admins SET username = $1, password = $2, salt = $3, is_active = TRUE, updated_at = NOW() WHERE email = $4")
            .bind(&data.username)
            .bind(&data.password)
            .bind(&data.salt)
            .bind(&data.email)
            .execute(&mut tx)
            .await?;
        let outcome = if updated.rows_affected() > 0 {
            UpsertOutcome::Reset
        } else {
            query("INSERT INTO admins (id, username, email, password, salt, is_active) VALUES ($1, $2, $3, $4, $5, TRUE)")
                .bind(Uuid::new_v4())
                .bind(&data.username)
                .bind(&data.email)
                .bind(&data.password)
                .bind(&data.salt)
                .execute(&mut tx)
                .await?;
            UpsertOutcome::Created
        };
        tx.commit().await?;
        Ok(outcome)
    }
}
