use crate::normalize::{EntryDetails, TimelineEntry};
use crate::timeline::Timeline;
use ahash::AHashMap;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\s]").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedTerm {
    pub word: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    #[default]
    Stable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodLabel {
    Positive,
    Neutral,
    Negative,
    #[default]
    Unknown,
}

impl MoodLabel {
    pub fn from_average(avg: Option<f64>) -> Self {
        match avg {
            Some(a) if a >= 7.0 => MoodLabel::Positive,
            Some(a) if a >= 4.0 => MoodLabel::Neutral,
            Some(_) => MoodLabel::Negative,
            None => MoodLabel::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodSummary {
    pub before_sleep_average: Option<f64>,
    pub after_wakeup_average: Option<f64>,
    pub journal_average: Option<f64>,
    pub overall_average: Option<f64>,
    pub readings: usize,
    pub label: MoodLabel,
    pub trend: Trend,
}

/// Minimum mean difference (mood points) between the older and newer half
/// before a series counts as rising or falling.
const MOOD_TREND_DELTA: f64 = 0.5;

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        None
    } else {
        Some(xs.iter().sum::<f64>() / xs.len() as f64)
    }
}

/// Lower-cased words of at least `min_chars` characters, punctuation removed.
pub fn tokenize(text: &str, min_chars: usize) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = RE_PUNCT.replace_all(&lowered, "");
    cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() >= min_chars)
        .map(str::to_string)
        .collect()
}

/// Exact occurrence counts over all excerpts, most frequent first.
pub fn word_frequency(entries: &[TimelineEntry], min_chars: usize, limit: usize) -> Vec<WordCount> {
    let mut counts: AHashMap<String, usize> = AHashMap::new();
    for e in entries {
        for w in tokenize(&e.excerpt, min_chars) {
            *counts.entry(w).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .take(limit)
        .map(|(word, count)| WordCount { word, count })
        .collect()
}

/// Tag usage across entries, case-insensitive, most used first.
pub fn tag_frequency<'a>(entries: impl IntoIterator<Item = &'a TimelineEntry>, limit: usize) -> Vec<TagCount> {
    let mut counts: AHashMap<String, usize> = AHashMap::new();
    for e in entries {
        for t in &e.tags {
            *counts.entry(t.to_lowercase()).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .take(limit)
        .map(|(tag, count)| TagCount { tag, count })
        .collect()
}

/// Word weights decaying with entry age: an occurrence `half_life_days`
/// older than the newest entry counts half.
pub fn weighted_terms(entries: &[TimelineEntry], min_chars: usize, half_life_days: f64, limit: usize) -> Vec<WeightedTerm> {
    let Some(newest) = entries.iter().map(|e| e.occurred_on).max() else {
        return Vec::new();
    };
    let half_life = if half_life_days > 0.0 { half_life_days } else { f64::INFINITY };
    let mut weights: AHashMap<String, f64> = AHashMap::new();
    for e in entries {
        let age = (newest - e.occurred_on).num_days().max(0) as f64;
        let w = 0.5f64.powf(age / half_life);
        for word in tokenize(&e.excerpt, min_chars) {
            *weights.entry(word).or_insert(0.0) += w;
        }
    }
    weights
        .into_iter()
        .sorted_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .take(limit)
        .map(|(word, weight)| WeightedTerm { word, weight: (weight * 1000.0).round() / 1000.0 })
        .collect()
}

/// Compares the mean of the older half of `series` (chronological order)
/// with the newer half.
pub fn trend_of(series: &[f64]) -> Trend {
    if series.len() < 4 {
        return Trend::Stable;
    }
    let mid = series.len() / 2;
    let (older, newer) = series.split_at(mid);
    match (mean(older), mean(newer)) {
        (Some(a), Some(b)) if b - a > MOOD_TREND_DELTA => Trend::Rising,
        (Some(a), Some(b)) if a - b > MOOD_TREND_DELTA => Trend::Falling,
        _ => Trend::Stable,
    }
}

pub fn mood_summary(timeline: &Timeline) -> MoodSummary {
    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut journal = Vec::new();
    let mut series = Vec::new();
    // timeline is newest first; the trend wants oldest first
    for e in timeline.entries().iter().rev() {
        match &e.details {
            EntryDetails::Dream(d) => {
                before.extend(d.mood_before_sleep.map(|m| m.get() as f64));
                after.extend(d.mood_after_wakeup.map(|m| m.get() as f64));
            }
            EntryDetails::Journal(j) => journal.extend(j.mood.map(|m| m.get() as f64)),
        }
        let moods: Vec<f64> = e.moods().into_iter().map(|m| m.get() as f64).collect();
        series.extend(mean(&moods));
    }
    let all: Vec<f64> = before.iter().chain(&after).chain(&journal).copied().collect();
    let overall = mean(&all);
    MoodSummary {
        before_sleep_average: mean(&before).map(round2),
        after_wakeup_average: mean(&after).map(round2),
        journal_average: mean(&journal).map(round2),
        overall_average: overall.map(round2),
        readings: all.len(),
        label: MoodLabel::from_average(overall),
        trend: trend_of(&series),
    }
}
