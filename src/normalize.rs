use crate::error::{PipelineError, Result};
use crate::pipeline::AggregationOpts;
use crate::record::{resolve_date, RawDream, RawJournalEntry};
use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ELLIPSIS: char = '…';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dream,
    Journal,
}

/// Mood rating on the diary's 1-10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoodScore(u8);

impl MoodScore {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: i64) -> Option<Self> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Some(MoodScore(value as u8))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Fields lifted out of a dream's earlier AI analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorAnalysis {
    pub themes: Vec<String>,
    pub emotions: Vec<String>,
    pub symbols: Vec<String>,
}

impl PriorAnalysis {
    pub fn is_empty(&self) -> bool {
        self.themes.is_empty() && self.emotions.is_empty() && self.symbols.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DreamDetails {
    pub mood_before_sleep: Option<MoodScore>,
    pub mood_after_wakeup: Option<MoodScore>,
    pub mood_notes: Option<String>,
    pub analysis: Option<PriorAnalysis>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JournalDetails {
    pub mood: Option<MoodScore>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryDetails {
    Dream(DreamDetails),
    Journal(JournalDetails),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub id: String,
    pub title: String,
    pub occurred_on: NaiveDate,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub details: EntryDetails,
}

impl TimelineEntry {
    pub fn kind(&self) -> EntryKind {
        match self.details {
            EntryDetails::Dream(_) => EntryKind::Dream,
            EntryDetails::Journal(_) => EntryKind::Journal,
        }
    }

    /// All mood readings carried by the entry, in recording order.
    pub fn moods(&self) -> Vec<MoodScore> {
        match &self.details {
            EntryDetails::Dream(d) => d.mood_before_sleep.into_iter().chain(d.mood_after_wakeup).collect(),
            EntryDetails::Journal(j) => j.mood.into_iter().collect(),
        }
    }
}

/// Cuts `content` to `limit` characters and marks the cut with an ellipsis.
/// Applying it to its own output returns that output unchanged.
pub fn excerpt(content: &str, limit: usize) -> String {
    match content.char_indices().nth(limit) {
        Some((byte_idx, _)) => {
            let mut out = String::with_capacity(byte_idx + ELLIPSIS.len_utf8());
            out.push_str(&content[..byte_idx]);
            out.push(ELLIPSIS);
            out
        }
        None => content.to_string(),
    }
}

/// Fails only when the record carries no parseable `date` and no parseable `createdAt`.
pub fn normalize_dream(raw: &RawDream, opts: &AggregationOpts) -> Result<TimelineEntry> {
    let occurred_on = resolve_date(raw.date.as_deref(), raw.created_at.as_deref())
        .ok_or_else(|| PipelineError::UndatedEntry { kind: "dream", id: raw.id.clone() })?;
    let analysis = raw.analysis.as_ref().and_then(|a| parse_prior_analysis(a, &raw.id));
    Ok(TimelineEntry {
        id: raw.id.clone(),
        title: raw.title.clone(),
        occurred_on,
        excerpt: excerpt(&raw.content, opts.excerpt_chars),
        tags: clean_tags(raw.tags.as_deref()),
        details: EntryDetails::Dream(DreamDetails {
            mood_before_sleep: raw.mood_before_sleep.and_then(MoodScore::new),
            mood_after_wakeup: raw.mood_after_wakeup.and_then(MoodScore::new),
            mood_notes: raw.mood_notes.clone().filter(|n| !n.trim().is_empty()),
            analysis,
        }),
    })
}

pub fn normalize_journal(raw: &RawJournalEntry, opts: &AggregationOpts) -> Result<TimelineEntry> {
    let occurred_on = resolve_date(raw.date.as_deref(), raw.created_at.as_deref())
        .ok_or_else(|| PipelineError::UndatedEntry { kind: "journal", id: raw.id.clone() })?;
    Ok(TimelineEntry {
        id: raw.id.clone(),
        title: raw.title.clone(),
        occurred_on,
        excerpt: excerpt(&raw.content, opts.excerpt_chars),
        tags: clean_tags(raw.tags.as_deref()),
        details: EntryDetails::Journal(JournalDetails { mood: raw.mood.and_then(MoodScore::new) }),
    })
}

fn clean_tags(tags: Option<&[String]>) -> Vec<String> {
    tags.unwrap_or_default()
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .unique()
        .map(str::to_string)
        .collect()
}

/// A corrupt stored analysis only costs this one dream its derived fields.
fn parse_prior_analysis(value: &Value, dream_id: &str) -> Option<PriorAnalysis> {
    let parsed;
    let obj = match value {
        Value::String(text) => {
            parsed = match serde_json::from_str::<Value>(text) {
                Ok(v) => v,
                Err(err) => {
                    tracing::debug!(dream = dream_id, error = %err, "ignoring unparseable dream analysis");
                    return None;
                }
            };
            parsed.as_object()?
        }
        Value::Object(map) => map,
        _ => return None,
    };
    let analysis = PriorAnalysis {
        themes: label_list(obj.get("themes")),
        emotions: label_list(obj.get("emotions")),
        symbols: label_list(obj.get("symbols")),
    };
    if analysis.is_empty() {
        None
    } else {
        Some(analysis)
    }
}

const LABEL_KEYS: [&str; 5] = ["name", "symbol", "theme", "emotion", "label"];

fn label_list(v: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = v else { return Vec::new() };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Object(map) => LABEL_KEYS
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str))
                .map(|s| s.trim().to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}
