//! Shared output formatting for activity commands.

use activitylog_core::activity::{EntityRef, PopulatedActivity};
use activitylog_core::store::Document;
use serde::Serialize;
use serde_json::{Map, Value};

/// Formatted activity for JSON output.
#[derive(Debug, Serialize)]
pub struct ActivityOutput {
    pub id: Option<String>,
    pub log_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<EntityOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub causer: Option<EntityOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
    pub created_at: Option<String>,
}

/// Formatted reference plus the resolved document, if it still exists.
#[derive(Debug, Serialize)]
pub struct EntityOutput {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub document: Option<Map<String, Value>>,
}

impl EntityOutput {
    fn new(reference: &EntityRef, resolved: Option<&Document>) -> Self {
        Self {
            kind: reference.kind.clone(),
            id: reference.id.to_string(),
            document: resolved.map(|d| d.fields.clone()),
        }
    }
}

impl From<&PopulatedActivity> for ActivityOutput {
    fn from(activity: &PopulatedActivity) -> Self {
        let record = &activity.record;
        Self {
            id: record.id().map(ToString::to_string),
            log_name: record.log_name().to_string(),
            description: record.description().map(str::to_string),
            subject: record.subject_ref().map(|r| EntityOutput::new(r, activity.subject())),
            causer: record.causer_ref().map(|r| EntityOutput::new(r, activity.causer())),
            properties: record.properties().cloned(),
            created_at: record.created_at().map(|t| t.to_rfc3339()),
        }
    }
}

/// Print activities as a table.
pub fn print_activities_table(activities: &[PopulatedActivity]) {
    if activities.is_empty() {
        println!("(no activities found)");
        return;
    }

    // Calculate column widths
    let log_width =
        activities.iter().map(|a| a.record.log_name().len()).max().unwrap_or(3).clamp(3, 20);
    let desc_width = activities
        .iter()
        .map(|a| a.record.description().map_or(0, str::len))
        .max()
        .unwrap_or(11)
        .clamp(11, 40);
    let ref_width = 24; // "Kind:uuid" is clipped

    // Header
    println!(
        "{:<16}  {:<log_width$}  {:<desc_width$}  {:<ref_width$}  CAUSER",
        "CREATED", "LOG", "DESCRIPTION", "SUBJECT",
    );
    println!(
        "{:-<16}  {:-<log_width$}  {:-<desc_width$}  {:-<ref_width$}  {:-<ref_width$}",
        "", "", "", "", "",
    );

    // Rows
    for activity in activities {
        let record = &activity.record;
        let created = record
            .created_at()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let subject = describe_entity(record.subject_ref(), activity.subject());
        let causer = describe_entity(record.causer_ref(), activity.causer());

        println!(
            "{:<16}  {:<log_width$}  {:<desc_width$}  {:<ref_width$}  {}",
            created,
            truncate(record.log_name(), log_width),
            truncate(record.description().unwrap_or(""), desc_width),
            truncate(&subject, ref_width),
            causer,
        );
    }

    println!();
    println!("-- {} activities --", activities.len());
}

/// Print activities as JSON.
pub fn print_activities_json(activities: &[PopulatedActivity]) {
    let output: Vec<ActivityOutput> = activities.iter().map(ActivityOutput::from).collect();
    println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
}

/// Print one activity as JSON.
pub fn print_activity_json(activity: &PopulatedActivity) {
    let output = ActivityOutput::from(activity);
    println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
}

/// Print one activity as labelled lines.
pub fn print_activity_detail(activity: &PopulatedActivity) {
    let record = &activity.record;
    println!("id:          {}", record.id().map(ToString::to_string).unwrap_or_default());
    println!("log:         {}", record.log_name());
    println!("description: {}", record.description().unwrap_or(""));
    println!("subject:     {}", describe_entity(record.subject_ref(), activity.subject()));
    println!("causer:      {}", describe_entity(record.causer_ref(), activity.causer()));
    if let Some(created) = record.created_at() {
        println!("created:     {}", created.to_rfc3339());
    }
    if let Some(properties) = record.properties() {
        let rendered = serde_json::to_string(properties).unwrap_or_default();
        println!("properties:  {}", rendered);
    }
}

fn describe_entity(reference: Option<&EntityRef>, resolved: Option<&Document>) -> String {
    match (reference, resolved) {
        (None, _) => "-".to_string(),
        (Some(r), Some(_)) => r.to_string(),
        (Some(r), None) => format!("{} (missing)", r),
    }
}

/// Truncate string with ellipsis if needed.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
