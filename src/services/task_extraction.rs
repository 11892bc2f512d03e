//! Turns a manager's free-text chat message into task fields.
//!
//! The completion model is asked for exactly four `key=value` lines; the
//! reply is then line-parsed. Anything the model adds around those lines is
//! ignored.

use std::collections::HashMap;
use thiserror::Error;

use crate::services::gemini::CompletionClient;
use crate::utils::errors::ServiceError;

pub const REQUIRED_FIELDS: [&str; 4] = ["title", "description", "deadline", "employee_name"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTask {
    pub title: String,
    pub description: String,
    pub deadline: String,
    pub employee_name: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("invalid model output, missing: {}", .0.join(", "))]
    MissingFields(Vec<String>),
}

impl From<ExtractionError> for ServiceError {
    fn from(err: ExtractionError) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

pub fn build_prompt(text: &str, current_year: i32) -> String {
    format!(
        r#"
Extract task details from the text below and return ONLY and strictly in this format:

title=<task title>
description=<task description>
deadline=<deadline in ISO format with IST timezone>
employee_name=<lowercase employee name>

Rules:
- If no deadline is mentioned, assume 5 PM IST.
- Deadline format example: {year}-01-20T17:00:00+05:30
- No extra text.
- {year} is current year.

e.g. text: "Assign John Doe to complete the financial report by 12 dec."
Expected output:
title=Complete the financial report
description=Complete the financial report
deadline={year}-12-12T17:00:00+05:30
employee_name=john doe


Text:
{text}
"#,
        year = current_year,
        text = text
    )
}

pub fn parse_task_output(output: &str) -> Result<ExtractedTask, ExtractionError> {
    let mut fields: HashMap<&str, &str> = HashMap::new();
    for line in output.lines() {
        if let Some((key, value)) = line.trim().split_once('=') {
            fields.insert(key.trim(), value.trim());
        }
    }

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|key| !fields.contains_key(*key))
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        log::warn!("Model output missing fields: {:?}", missing);
        return Err(ExtractionError::MissingFields(missing));
    }

    let field = |key: &str| fields.get(key).map(|v| v.to_string()).unwrap_or_default();
    Ok(ExtractedTask {
        title: field("title"),
        description: field("description"),
        deadline: field("deadline"),
        employee_name: field("employee_name"),
    })
}

pub async fn extract_task(
    client: &dyn CompletionClient,
    text: &str,
    current_year: i32,
) -> Result<ExtractedTask, ServiceError> {
    let reply = client.complete(&build_prompt(text, current_year)).await?;
    log::debug!("Raw model output:\n{}", reply);
    Ok(parse_task_output(&reply)?)
}
