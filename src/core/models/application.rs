use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Shortlisted,
    Selected,
    Rejected,
    Approved,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Selected,
        ApplicationStatus::Rejected,
        ApplicationStatus::Approved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Selected => "selected",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Approved => "approved",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "shortlisted" => Ok(Self::Shortlisted),
            "selected" => Ok(Self::Selected),
            "rejected" => Ok(Self::Rejected),
            "approved" => Ok(Self::Approved),
            _ => Err(Error::InvalidStatus),
        }
    }
}

/// Experience answers, kept apart from `metadata` for readers of the older layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PastExperience {
    pub current_status: Option<String>,
    pub city_state: Option<String>,
    pub highest_qualification: Option<String>,
    pub specialization: Option<String>,
    pub skill_level: Option<String>,
    pub hands_on_duration: Option<String>,
    pub domain_interests: Vec<String>,
    pub platforms_used: String,
    pub profile_links: String,
    pub ctf_participation: String,
    pub ctf_achievements: String,
    pub projects_description: String,
    pub portfolio_link: String,
    pub follows_ethics: String,
    pub unauthorized_testing: String,
    pub unauthorized_explanation: String,
}

/// Every extended form field the intake form can send.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationMetadata {
    pub current_status: Option<String>,
    pub city_state: Option<String>,
    pub highest_qualification: Option<String>,
    pub specialization: Option<String>,
    pub skill_level: Option<String>,
    pub hands_on_duration: Option<String>,
    pub domain_interests: Vec<String>,
    pub platforms_used: String,
    pub profile_links: String,
    pub ctf_participation: String,
    pub ctf_achievements: String,
    pub projects_description: String,
    pub portfolio_link: String,
    pub follows_ethics: String,
    pub unauthorized_testing: String,
    pub unauthorized_explanation: String,
    pub contribution_areas: Vec<String>,
    pub declaration_accepted: bool,
}

impl ApplicationMetadata {
    pub fn past_experience(&self) -> PastExperience {
        PastExperience {
            current_status: self.current_status.clone(),
            city_state: self.city_state.clone(),
            highest_qualification: self.highest_qualification.clone(),
            specialization: self.specialization.clone(),
            skill_level: self.skill_level.clone(),
            hands_on_duration: self.hands_on_duration.clone(),
            domain_interests: self.domain_interests.clone(),
            platforms_used: self.platforms_used.clone(),
            profile_links: self.profile_links.clone(),
            ctf_participation: self.ctf_participation.clone(),
            ctf_achievements: self.ctf_achievements.clone(),
            projects_description: self.projects_description.clone(),
            portfolio_link: self.portfolio_link.clone(),
            follows_ethics: self.follows_ethics.clone(),
            unauthorized_testing: self.unauthorized_testing.clone(),
            unauthorized_explanation: self.unauthorized_explanation.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub whatsapp_number: String,
    pub branch: String,
    pub year: String,
    pub primary_role: String,
    pub secondary_role: String,
    pub why_this_role: String,
    pub past_experience: PastExperience,
    pub has_other_clubs: String,
    pub time_availability: String,
    pub resume_path: String,
    pub metadata: ApplicationMetadata,
    pub status: ApplicationStatus,
    pub admin_remarks: Option<String>,
    pub feedback: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Checks the fields the store treats as required.
    pub fn validate(&self) -> Result<(), Error> {
        let mut fields = std::collections::BTreeMap::new();
        let required = [
            ("fullName", &self.full_name),
            ("email", &self.email),
            ("whatsappNumber", &self.whatsapp_number),
            ("branch", &self.branch),
            ("year", &self.year),
            ("primaryRole", &self.primary_role),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                fields.insert(name.to_owned(), "Required".to_owned());
            }
        }
        if !self.email.is_empty() && !self.email.contains('@') {
            fields.insert("email".to_owned(), "Invalid email".to_owned());
        }
        if fields.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(fields))
        }
    }
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub full_name: String,
    pub email: String,
    pub whatsapp_number: String,
    pub branch: String,
    pub year: String,
    pub primary_role: String,
    pub secondary_role: String,
    pub why_this_role: String,
    pub past_experience: PastExperience,
    pub has_other_clubs: String,
    pub time_availability: String,
    pub resume_path: String,
    pub metadata: ApplicationMetadata,
}

/// Mutable fields accepted by a full update; absent fields keep their stored value.
/// `resumePath` and `pastExperience` are not accepted: the resume is owned by intake and
/// the experience block is always derived from `metadata`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub whatsapp_number: Option<String>,
    pub branch: Option<String>,
    pub year: Option<String>,
    pub primary_role: Option<String>,
    pub secondary_role: Option<String>,
    pub why_this_role: Option<String>,
    pub has_other_clubs: Option<String>,
    pub time_availability: Option<String>,
    pub metadata: Option<ApplicationMetadata>,
    pub status: Option<ApplicationStatus>,
    pub admin_remarks: Option<String>,
    pub feedback: Option<String>,
}

impl Update {
    pub fn apply(self, app: &mut Application) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(v) = self.$field { app.$field = v; })*
            };
        }
        let roles_given = self.primary_role.is_some() || self.secondary_role.is_some();
        merge!(full_name, whatsapp_number, branch, year, why_this_role, has_other_clubs, time_availability, status);
        if let Some(email) = self.email {
            app.email = email.trim().to_lowercase();
        }
        if let Some(metadata) = self.metadata {
            if !roles_given && !metadata.contribution_areas.is_empty() {
                let areas = &metadata.contribution_areas;
                app.primary_role = areas[0].clone();
                app.secondary_role = areas.get(1).cloned().unwrap_or_default();
            }
            app.metadata = metadata;
        }
        // explicit roles lead contributionAreas; any further areas follow
        if roles_given {
            merge!(primary_role, secondary_role);
            let mut areas = vec![app.primary_role.clone()];
            if !app.secondary_role.is_empty() {
                areas.push(app.secondary_role.clone());
            }
            let rest: Vec<String> = app.metadata.contribution_areas.iter().skip(2).filter(|a| !areas.contains(a)).cloned().collect();
            areas.extend(rest);
            app.metadata.contribution_areas = areas;
        }
        app.past_experience = app.metadata.past_experience();
        if let Some(remarks) = self.admin_remarks {
            app.admin_remarks = Some(remarks);
        }
        if let Some(feedback) = self.feedback {
            app.feedback = Some(feedback);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Query {
    pub status_eq: Option<ApplicationStatus>,
    pub search: Option<String>,
    pub role_like: Option<String>,
}

impl Query {
    /// In-process evaluation of the filter; stores without a query language use this.
    pub fn matches(&self, app: &Application) -> bool {
        fn contains(haystack: &str, needle: &str) -> bool {
            haystack.to_lowercase().contains(&needle.to_lowercase())
        }
        if let Some(status) = self.status_eq {
            if app.status != status {
                return false;
            }
        }
        if let Some(role) = &self.role_like {
            if !contains(&app.primary_role, role) && !contains(&app.secondary_role, role) {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !contains(&app.full_name, search) && !contains(&app.email, search) && !contains(&app.whatsapp_number, search) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: i64,
    pub pending: i64,
    pub shortlisted: i64,
    pub selected: i64,
    pub rejected: i64,
    pub approved: i64,
}

impl StatusCounts {
    pub fn from_groups(groups: impl IntoIterator<Item = (ApplicationStatus, i64)>) -> Self {
        let mut counts = StatusCounts::default();
        for (status, n) in groups {
            let slot = match status {
                ApplicationStatus::Pending => &mut counts.pending,
                ApplicationStatus::Shortlisted => &mut counts.shortlisted,
                ApplicationStatus::Selected => &mut counts.selected,
                ApplicationStatus::Rejected => &mut counts.rejected,
                ApplicationStatus::Approved => &mut counts.approved,
            };
            *slot += n;
            counts.total += n;
        }
        counts
    }
}
