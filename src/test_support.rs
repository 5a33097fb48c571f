//! In-memory adapters for the repository and uploader ports.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::core::models::admin::{Admin, Upsert as AdminUpsert, UpsertOutcome};
use crate::core::models::application::{Application, ApplicationMetadata, ApplicationStatus, Insert, Query};
use crate::core::models::{UploadedFile, UploadedFileCreate};
use crate::core::ports::repository::{AdminCommon, ApplicationCommon};
use crate::core::uploader::Uploader;
use crate::error::Error;

/// Counts CSV records, treating newlines inside quoted cells as part of the cell.
pub fn csv_records(csv: &str) -> usize {
    if csv.is_empty() {
        return 0;
    }
    let mut quoted = false;
    let mut records = 1;
    for c in csv.chars() {
        match c {
            '"' => quoted = !quoted,
            '\n' if !quoted => records += 1,
            _ => {}
        }
    }
    if csv.ends_with('\n') {
        records -= 1;
    }
    records
}

pub fn sample_application(email: &str) -> Application {
    let metadata = ApplicationMetadata {
        current_status: Some("Student".into()),
        highest_qualification: Some("B.E. / B.Tech".into()),
        specialization: Some("Cyber Security".into()),
        skill_level: Some("Intermediate".into()),
        domain_interests: vec!["Cloud Security".into()],
        contribution_areas: vec!["SOC / Blue Team".into(), "Tool Development / Automation".into()],
        declaration_accepted: true,
        ..Default::default()
    };
    let now = Utc::now();
    Application {
        id: Uuid::new_v4(),
        full_name: "Asha Rao".into(),
        email: email.to_lowercase(),
        whatsapp_number: "+910000000000".into(),
        branch: "PICT".into(),
        year: "2nd Year".into(),
        primary_role: "SOC / Blue Team".into(),
        secondary_role: "Tool Development / Automation".into(),
        why_this_role: "I want to learn offensive security with peers.\nAlso to play more CTFs.".into(),
        past_experience: metadata.past_experience(),
        has_other_clubs: String::new(),
        time_availability: "Student".into(),
        resume_path: String::new(),
        metadata,
        status: ApplicationStatus::Pending,
        admin_remarks: None,
        feedback: None,
        submitted_at: now,
        created_at: now,
        updated_at: now,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    apps: Mutex<Vec<Application>>,
    admins: Mutex<Vec<Admin>>,
    ticks: AtomicI64,
}

impl MemoryStore {
    /// Monotonic clock so that insertion order is also submission order.
    fn next_time(&self) -> DateTime<Utc> {
        let n = self.ticks.fetch_add(1, Ordering::SeqCst);
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(n)
    }

    pub fn seed(&self, mut app: Application) -> Uuid {
        let at = self.next_time();
        app.submitted_at = at;
        app.created_at = at;
        app.updated_at = at;
        let id = app.id;
        self.apps.lock().unwrap().push(app);
        id
    }

    pub fn deactivate_admin(&self, username: &str) {
        for admin in self.admins.lock().unwrap().iter_mut() {
            if admin.username == username {
                admin.is_active = false;
            }
        }
    }

    pub fn count(&self) -> usize {
        self.apps.lock().unwrap().len()
    }
}

impl ApplicationCommon for MemoryStore {
    async fn insert(&self, data: Insert) -> Result<Uuid, Error> {
        if self.exists_by_email(&data.email).await? {
            return Err(Error::DuplicateEmail);
        }
        let at = self.next_time();
        let app = Application {
            id: Uuid::new_v4(),
            full_name: data.full_name,
            email: data.email,
            whatsapp_number: data.whatsapp_number,
            branch: data.branch,
            year: data.year,
            primary_role: data.primary_role,
            secondary_role: data.secondary_role,
            why_this_role: data.why_this_role,
            past_experience: data.past_experience,
            has_other_clubs: data.has_other_clubs,
            time_availability: data.time_availability,
            resume_path: data.resume_path,
            metadata: data.metadata,
            status: ApplicationStatus::Pending,
            admin_remarks: None,
            feedback: None,
            submitted_at: at,
            created_at: at,
            updated_at: at,
        };
        let id = app.id;
        self.apps.lock().unwrap().push(app);
        Ok(id)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, Error> {
        let email = email.to_lowercase();
        Ok(self.apps.lock().unwrap().iter().any(|a| a.email.to_lowercase() == email))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Application>, Error> {
        Ok(self.apps.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Application>, Error> {
        let mut apps: Vec<Application> = self.apps.lock().unwrap().iter().filter(|a| query.matches(a)).cloned().collect();
        apps.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(apps)
    }

    async fn replace(&self, app: &Application) -> Result<bool, Error> {
        let mut apps = self.apps.lock().unwrap();
        let email = app.email.to_lowercase();
        if apps.iter().any(|a| a.id != app.id && a.email.to_lowercase() == email) {
            return Err(Error::DuplicateEmail);
        }
        match apps.iter_mut().find(|a| a.id == app.id) {
            Some(slot) => {
                *slot = app.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_status(&self, id: Uuid, status: ApplicationStatus, updated_at: DateTime<Utc>) -> Result<Option<Application>, Error> {
        let mut apps = self.apps.lock().unwrap();
        Ok(apps.iter_mut().find(|a| a.id == id).map(|a| {
            a.status = status;
            a.updated_at = updated_at;
            a.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, Error> {
        let mut apps = self.apps.lock().unwrap();
        let before = apps.len();
        apps.retain(|a| a.id != id);
        Ok(apps.len() < before)
    }

    async fn count_by_status(&self) -> Result<Vec<(ApplicationStatus, i64)>, Error> {
        let mut groups: HashMap<ApplicationStatus, i64> = HashMap::new();
        for app in self.apps.lock().unwrap().iter() {
            *groups.entry(app.status).or_default() += 1;
        }
        Ok(groups.into_iter().collect())
    }
}

impl AdminCommon for MemoryStore {
    async fn get_active_by_username(&self, username: &str) -> Result<Option<Admin>, Error> {
        Ok(self.admins.lock().unwrap().iter().find(|a| a.username == username && a.is_active).cloned())
    }

    async fn upsert_by_email(&self, data: AdminUpsert) -> Result<UpsertOutcome, Error> {
        let mut admins = self.admins.lock().unwrap();
        if let Some(admin) = admins.iter_mut().find(|a| a.email == data.email) {
            admin.username = data.username;
            admin.password = data.password;
            admin.salt = data.salt;
            admin.is_active = true;
            return Ok(UpsertOutcome::Reset);
        }
        admins.push(Admin {
            id: Uuid::new_v4(),
            username: data.username,
            email: data.email,
            password: data.password,
            salt: data.salt,
            is_active: true,
        });
        Ok(UpsertOutcome::Created)
    }
}

#[derive(Default)]
pub struct MemoryUploader {
    files: Mutex<HashMap<String, Vec<u8>>>,
    failing: bool,
}

impl MemoryUploader {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn store(&self, key: &str, content: &[u8]) -> String {
        let reference = format!("memory://{}", key);
        self.files.lock().unwrap().insert(reference.clone(), content.to_vec());
        reference
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), Error> {
        if self.failing {
            return Err(Error::UploadError("file store unreachable".into()));
        }
        Ok(())
    }
}

impl Uploader for MemoryUploader {
    async fn put(&self, file: UploadedFileCreate) -> Result<String, Error> {
        self.check()?;
        Ok(self.store(&file.key, &file.content))
    }

    async fn get(&self, reference: &str) -> Result<UploadedFile, Error> {
        self.check()?;
        let content = self.files.lock().unwrap().get(reference).cloned().ok_or(Error::NotFound)?;
        Ok(UploadedFile {
            key: reference.trim_start_matches("memory://").to_owned(),
            content_type: "application/pdf".into(),
            content,
        })
    }

    async fn delete(&self, reference: &str) -> Result<(), Error> {
        self.check()?;
        self.files.lock().unwrap().remove(reference).map(|_| ()).ok_or(Error::NotFound)
    }
}
