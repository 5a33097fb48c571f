use itertools::Itertools;

use crate::core::models::application::Application;
use crate::error::Error;

const CSV_HEADERS: [&str; 13] = [
    "Name",
    "Email",
    "Phone",
    "Current Status",
    "Education",
    "Specialization",
    "Experience",
    "Skill Level",
    "Domain Interests",
    "Contribution Areas",
    "Why Join",
    "Status",
    "Submitted At",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some(f) if f.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
        }
    }
}

fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn row(app: &Application) -> Vec<String> {
    let meta = &app.metadata;
    vec![
        app.full_name.clone(),
        app.email.clone(),
        app.whatsapp_number.clone(),
        meta.current_status.clone().unwrap_or_default(),
        meta.highest_qualification.clone().unwrap_or_default(),
        meta.specialization.clone().unwrap_or_default(),
        app.year.clone(),
        meta.skill_level.clone().unwrap_or_default(),
        meta.domain_interests.join("; "),
        meta.contribution_areas.join("; "),
        app.why_this_role.clone(),
        app.status.to_string(),
        app.submitted_at.to_rfc3339(),
    ]
}

pub fn to_csv(apps: &[Application]) -> String {
    let header = CSV_HEADERS.iter().map(|h| quote(h)).join(",");
    let rows = apps.iter().map(|app| row(app).iter().map(|c| quote(c)).join(","));
    std::iter::once(header).chain(rows).join("\n")
}

pub fn render(apps: &[Application], format: ExportFormat) -> Result<String, Error> {
    match format {
        ExportFormat::Csv => Ok(to_csv(apps)),
        ExportFormat::Json => Ok(serde_json::to_string_pretty(apps)?),
    }
}
