use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A dream as handed over by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDream {
    #[serde(deserialize_with = "text_or_number")]
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, deserialize_with = "opt_text_or_number")]
    pub date: Option<String>,
    /// Storage timestamp in any layout `parse_day` understands.
    #[serde(default, deserialize_with = "opt_text_or_number")]
    pub created_at: Option<String>,
    /// Stored AI analysis: serialized JSON text, an inline object, or null.
    #[serde(default)]
    pub analysis: Option<Value>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub mood_before_sleep: Option<i64>,
    #[serde(default)]
    pub mood_after_wakeup: Option<i64>,
    #[serde(default)]
    pub mood_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawJournalEntry {
    #[serde(deserialize_with = "text_or_number")]
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, deserialize_with = "opt_text_or_number")]
    pub date: Option<String>,
    /// Storage timestamp in any layout `parse_day` understands.
    #[serde(default, deserialize_with = "opt_text_or_number")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub mood: Option<i64>,
    #[serde(default)]
    pub include_in_analysis: bool,
}

/// Everything one aggregation request needs, as read by the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryInput {
    #[serde(default)]
    pub dreams: Vec<RawDream>,
    #[serde(default)]
    pub journal_entries: Vec<RawJournalEntry>,
    #[serde(default)]
    pub time_range: Option<String>,
}

/// Calendar day of a record: the explicit `date` when it parses, else
/// `created_at`. `None` only when neither field yields a day.
pub fn resolve_date(date: Option<&str>, created_at: Option<&str>) -> Option<NaiveDate> {
    fn present(v: Option<&str>) -> Option<&str> {
        v.map(str::trim).filter(|d| !d.is_empty())
    }
    if let Some(raw) = present(date) {
        match parse_day(raw) {
            Some(day) => return Some(day),
            None => tracing::debug!(date = raw, "unparseable entry date, falling back to createdAt"),
        }
    }
    let raw = present(created_at)?;
    let day = parse_day(raw);
    if day.is_none() {
        tracing::debug!(created_at = raw, "unparseable createdAt");
    }
    day
}

/// Storage ids and timestamps arrive as strings or as bare numbers.
fn text_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("expected a string or number, got {other}"))),
    }
}

fn opt_text_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(d)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(de::Error::custom(format!("expected a string or number, got {other}"))),
    }
}

/// Accepts RFC 3339 timestamps, plain `YYYY-MM-DD` days, a few common
/// date-time layouts and epoch seconds/milliseconds.
pub fn parse_day(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    let day_fmts = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];
    for f in day_fmts.iter() {
        if let Ok(d) = NaiveDate::parse_from_str(s, f) {
            return Some(d);
        }
    }
    let fmts = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
    ];
    for f in fmts.iter() {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, f) {
            return Some(ndt.date());
        }
    }
    parse_epoch_day(s)
}

fn parse_epoch_day(s: &str) -> Option<NaiveDate> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let n = s.parse::<i64>().ok()?;
    let dt = match s.len() {
        10 => DateTime::<Utc>::from_timestamp(n, 0),
        13 => DateTime::<Utc>::from_timestamp_millis(n),
        _ => None,
    };
    dt.map(|d| d.date_naive())
}
