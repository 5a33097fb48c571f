use std::collections::{BTreeMap, HashMap};

use crate::core::models::application::{ApplicationMetadata, Insert};
use crate::error::Error;

pub const RESUME_FIELD: &str = "resumeFile";
pub const HONEYPOT_FIELD: &str = "companyWebsite";
pub const MAX_RESUME_BYTES: usize = 2 * 1024 * 1024;
pub const MAX_FIELD_BYTES: usize = 64 * 1024;

const OTHER_OPTION: &str = "Other (Please specify)";

#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

impl ResumeUpload {
    fn is_pdf(&self) -> bool {
        let by_type = self.content_type.as_deref().map(|t| t.eq_ignore_ascii_case("application/pdf")).unwrap_or(false);
        let by_name = self.filename.as_deref().map(|n| n.to_lowercase().ends_with(".pdf")).unwrap_or(false);
        by_type || by_name
    }
}

/// A parsed intake form: scalar parts, `[]`-suffixed list parts and the resume part.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    fields: HashMap<String, String>,
    lists: HashMap<String, Vec<String>>,
    resume: Option<ResumeUpload>,
    oversized: Vec<String>,
}

impl Submission {
    pub fn push_field(&mut self, key: &str, value: &str) {
        let value = value.trim().to_owned();
        match key.strip_suffix("[]") {
            Some(list_key) => self.lists.entry(list_key.to_owned()).or_default().push(value),
            None => {
                self.fields.insert(key.to_owned(), value);
            }
        }
    }

    /// Records a text part that exceeded [`MAX_FIELD_BYTES`] and was dropped.
    pub fn mark_oversized(&mut self, key: &str) {
        let key = key.strip_suffix("[]").unwrap_or(key);
        if !self.oversized.iter().any(|k| k == key) {
            self.oversized.push(key.to_owned());
        }
    }

    pub fn set_resume(&mut self, resume: ResumeUpload) {
        self.resume = Some(resume);
    }

    /// The attached resume, if one was sent with any content.
    pub fn resume(&self) -> Option<&ResumeUpload> {
        self.resume.as_ref().filter(|r| !r.content.is_empty())
    }

    pub fn take_resume(&mut self) -> Option<ResumeUpload> {
        self.resume.take().filter(|r| !r.content.is_empty())
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn list(&self, key: &str) -> &[String] {
        self.lists.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_honeypot_tripped(&self) -> bool {
        self.field(HONEYPOT_FIELD).is_some()
    }

    pub fn email(&self) -> Option<String> {
        self.field("email").map(|e| e.to_lowercase())
    }

    pub fn validate(&self) -> Result<(), Error> {
        let mut errors = BTreeMap::new();
        for key in ["fullName", "email", "whatsappNumber", "organizationName", "yearOfStudyOrWorkExp"] {
            if self.field(key).is_none() {
                errors.insert(key.to_owned(), "Required".to_owned());
            }
        }
        if let Some(email) = self.field("email") {
            if !email.contains('@') {
                errors.insert("email".to_owned(), "Invalid email".to_owned());
            }
        }
        if self.list("contributionAreas").iter().all(|r| r.is_empty()) {
            errors.insert("contributionAreas".to_owned(), "Select at least one role".to_owned());
        }
        for key in &self.oversized {
            errors.insert(key.clone(), "Too long".to_owned());
        }
        if let Some(resume) = self.resume() {
            if !resume.is_pdf() {
                errors.insert(RESUME_FIELD.to_owned(), "Only PDF allowed".to_owned());
            } else if resume.content.len() > MAX_RESUME_BYTES {
                errors.insert(RESUME_FIELD.to_owned(), "Max size 2MB".to_owned());
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }

    /// Storage key for the resume: `resumes/<sanitized email>_<millis>.pdf`.
    pub fn resume_key(&self, timestamp_millis: i64) -> String {
        let safe_email: String = self
            .email()
            .unwrap_or_default()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("resumes/{}_{}.pdf", safe_email, timestamp_millis)
    }

    fn text(&self, key: &str) -> String {
        self.field(key).unwrap_or_default().to_owned()
    }

    fn opt(&self, key: &str) -> Option<String> {
        self.field(key).map(str::to_owned)
    }

    fn choice(&self, key: &str, custom_key: &str) -> Option<String> {
        match self.field(key) {
            Some(OTHER_OPTION) => self.opt(custom_key).or_else(|| self.opt(key)),
            _ => self.opt(key),
        }
    }

    fn flag(&self, key: &str) -> bool {
        self.field(key)
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "on" | "yes" | "1"))
            .unwrap_or(false)
    }

    pub fn into_insert(self, resume_path: String) -> Insert {
        let contribution_areas: Vec<String> = self.list("contributionAreas").iter().filter(|r| !r.is_empty()).cloned().collect();
        let metadata = ApplicationMetadata {
            current_status: self.opt("currentStatus"),
            city_state: self.opt("cityState"),
            highest_qualification: self.choice("highestQualification", "highestQualificationCustom"),
            specialization: self.choice("specialization", "specializationCustom"),
            skill_level: self.opt("skillLevel"),
            hands_on_duration: self.opt("handsOnDuration"),
            domain_interests: self.list("domainInterests").to_vec(),
            platforms_used: self.text("platformsUsed"),
            profile_links: self.text("profileLinks"),
            ctf_participation: self.text("ctfParticipation"),
            ctf_achievements: self.text("ctfAchievements"),
            projects_description: self.text("projectsDescription"),
            portfolio_link: self.text("portfolioLink"),
            follows_ethics: self.text("followsEthics"),
            unauthorized_testing: self.text("unauthorizedTesting"),
            unauthorized_explanation: self.text("unauthorizedExplanation"),
            contribution_areas: contribution_areas.clone(),
            declaration_accepted: self.flag("declarationAccepted"),
        };
        Insert {
            full_name: self.text("fullName"),
            email: self.email().unwrap_or_default(),
            whatsapp_number: self.text("whatsappNumber"),
            branch: self.text("organizationName"),
            year: self.choice("yearOfStudyOrWorkExp", "yearOfStudyCustom").unwrap_or_default(),
            primary_role: contribution_areas.first().cloned().unwrap_or_default(),
            secondary_role: contribution_areas.get(1).cloned().unwrap_or_default(),
            why_this_role: self.text("whyJoinCyberX"),
            past_experience: metadata.past_experience(),
            has_other_clubs: self.text("ctfParticipation"),
            time_availability: self.text("currentStatus"),
            resume_path,
            metadata,
        }
    }
}
