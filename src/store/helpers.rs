use anyhow::{anyhow, Context};
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Result;
use crate::models::Priority;

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field} '{value}'"))?;
    Ok(parsed)
}

pub fn parse_optional_datetime(value: Option<String>, field: &str) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(raw) => parse_datetime(&raw, field).map(Some),
        None => Ok(None),
    }
}

pub fn parse_priority(value: &str) -> Result<Priority> {
    match value {
        "Low" => Ok(Priority::Low),
        "Medium" => Ok(Priority::Medium),
        "High" => Ok(Priority::High),
        other => Err(anyhow!("unknown priority '{other}'").into()),
    }
}

/// Completed day keys persist as a JSON array of `YYYY-MM-DD` strings.
pub fn parse_day_keys(value: &str) -> Result<Vec<NaiveDate>> {
    let days: Vec<NaiveDate> =
        serde_json::from_str(value).context("failed to parse completed_dates")?;
    Ok(days)
}

pub fn day_keys_to_json(days: &[NaiveDate]) -> Result<String> {
    let json = serde_json::to_string(days).context("failed to serialize completed_dates")?;
    Ok(json)
}
