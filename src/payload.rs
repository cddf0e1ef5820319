use crate::normalize::{EntryDetails, EntryKind, MoodScore, TimelineEntry};
use crate::stats::{MoodSummary, TagCount, WeightedTerm, WordCount};
use crate::timeline::{DateSpan, PeriodBucket, Timeline};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryCounts {
    pub dreams: usize,
    pub journal_entries: usize,
    pub total: usize,
}

impl EntryCounts {
    pub fn of(timeline: &Timeline) -> Self {
        let dreams = timeline.count(EntryKind::Dream);
        let journal_entries = timeline.count(EntryKind::Journal);
        EntryCounts { dreams, journal_entries, total: dreams + journal_entries }
    }
}

/// Compact view of one entry for the external analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntrySummary {
    #[serde(rename_all = "camelCase")]
    Dream {
        title: String,
        date: String,
        content: String,
        tags: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        themes: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        emotions: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        symbols: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mood_before_sleep: Option<MoodScore>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mood_after_wakeup: Option<MoodScore>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mood_notes: Option<String>,
    },
    Journal {
        title: String,
        date: String,
        content: String,
        tags: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mood: Option<MoodScore>,
    },
}

impl EntrySummary {
    pub fn from_entry(e: &TimelineEntry) -> Self {
        let date = e.occurred_on.format("%Y-%m-%d").to_string();
        match &e.details {
            EntryDetails::Dream(d) => {
                let analysis = d.analysis.clone().unwrap_or_default();
                EntrySummary::Dream {
                    title: e.title.clone(),
                    date,
                    content: e.excerpt.clone(),
                    tags: e.tags.clone(),
                    themes: analysis.themes,
                    emotions: analysis.emotions,
                    symbols: analysis.symbols,
                    mood_before_sleep: d.mood_before_sleep,
                    mood_after_wakeup: d.mood_after_wakeup,
                    mood_notes: d.mood_notes.clone(),
                }
            }
            EntryDetails::Journal(j) => EntrySummary::Journal {
                title: e.title.clone(),
                date,
                content: e.excerpt.clone(),
                tags: e.tags.clone(),
                mood: j.mood,
            },
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            EntrySummary::Dream { .. } => EntryKind::Dream,
            EntrySummary::Journal { .. } => EntryKind::Journal,
        }
    }
}

/// Everything handed to the language model for one aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub time_range: String,
    pub counts: EntryCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<DateSpan>,
    pub entries: Vec<EntrySummary>,
    pub word_frequency: Vec<WordCount>,
    pub weighted_terms: Vec<WeightedTerm>,
    pub top_tags: Vec<TagCount>,
    pub mood: MoodSummary,
    pub periods: Vec<PeriodBucket>,
}

pub fn summarize_entries(timeline: &Timeline) -> Vec<EntrySummary> {
    timeline.entries().iter().map(EntrySummary::from_entry).collect()
}
