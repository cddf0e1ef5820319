use crate::normalize::{EntryKind, TimelineEntry};
use crate::stats::{self, TagCount};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub oldest: NaiveDate,
    pub newest: NaiveDate,
}

impl DateSpan {
    pub fn days(&self) -> i64 {
        (self.newest - self.oldest).num_days() + 1
    }
}

/// Dreams and eligible journal entries merged newest first.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, kind: EntryKind) -> usize {
        self.entries.iter().filter(|e| e.kind() == kind).count()
    }

    pub fn span(&self) -> Option<DateSpan> {
        // entries are sorted descending, so the ends are the bounds
        let newest = self.entries.first()?.occurred_on;
        let oldest = self.entries.last()?.occurred_on;
        Some(DateSpan { oldest, newest })
    }
}

/// Same-date entries keep their input order; kind never decides placement.
pub fn build_timeline(dreams: Vec<TimelineEntry>, journal: Vec<TimelineEntry>) -> Timeline {
    let mut entries = dreams;
    entries.extend(journal);
    entries.sort_by(|a, b| b.occurred_on.cmp(&a.occurred_on));
    Timeline { entries }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Week,
    #[default]
    Month,
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "week" | "weekly" => Ok(Granularity::Week),
            "month" | "monthly" => Ok(Granularity::Month),
            other => Err(format!("unknown granularity '{other}' (expected week or month)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodBucket {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub dream_count: usize,
    pub journal_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_mood: Option<f64>,
    pub top_tags: Vec<TagCount>,
}

fn floor_day(day: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Week => day - Duration::days(day.weekday().num_days_from_monday() as i64),
        Granularity::Month => day.with_day(1).unwrap_or(day),
    }
}

fn period_end(start: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Week => start + Duration::days(6),
        Granularity::Month => {
            let (y, m) = if start.month() == 12 { (start.year() + 1, 1) } else { (start.year(), start.month() + 1) };
            NaiveDate::from_ymd_opt(y, m, 1).map(|next| next - Duration::days(1)).unwrap_or(start)
        }
    }
}

fn period_label(start: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Week => {
            let iso = start.iso_week();
            format!("{}-W{:02}", iso.year(), iso.week())
        }
        Granularity::Month => start.format("%Y-%m").to_string(),
    }
}

/// Buckets the timeline into calendar periods, newest period first.
/// Periods without entries are not emitted.
pub fn segment(timeline: &Timeline, granularity: Granularity, top_tags: usize) -> Vec<PeriodBucket> {
    let mut buckets: BTreeMap<NaiveDate, Vec<&TimelineEntry>> = BTreeMap::new();
    for e in timeline.entries() {
        buckets.entry(floor_day(e.occurred_on, granularity)).or_default().push(e);
    }
    buckets
        .into_iter()
        .rev()
        .map(|(start, members)| {
            let moods: Vec<f64> = members.iter().flat_map(|e| e.moods()).map(|m| m.get() as f64).collect();
            let average_mood = if moods.is_empty() {
                None
            } else {
                Some(stats::round2(moods.iter().sum::<f64>() / moods.len() as f64))
            };
            PeriodBucket {
                label: period_label(start, granularity),
                start,
                end: period_end(start, granularity),
                dream_count: members.iter().filter(|e| e.kind() == EntryKind::Dream).count(),
                journal_count: members.iter().filter(|e| e.kind() == EntryKind::Journal).count(),
                average_mood,
                top_tags: stats::tag_frequency(members.iter().copied(), top_tags),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_period_bounds() {
        assert_eq!(floor_day(d(2024, 2, 17), Granularity::Month), d(2024, 2, 1));
        assert_eq!(period_end(d(2024, 2, 1), Granularity::Month), d(2024, 2, 29));
        assert_eq!(period_end(d(2023, 12, 1), Granularity::Month), d(2023, 12, 31));
        assert_eq!(period_label(d(2024, 2, 1), Granularity::Month), "2024-02");
    }

    #[test]
    fn week_period_bounds() {
        // 2024-03-14 is a Thursday
        let start = floor_day(d(2024, 3, 14), Granularity::Week);
        assert_eq!(start, d(2024, 3, 11));
        assert_eq!(period_end(start, Granularity::Week), d(2024, 3, 17));
        assert_eq!(period_label(start, Granularity::Week), "2024-W11");
    }

    #[test]
    fn parses_granularity() {
        assert_eq!("Week".parse::<Granularity>(), Ok(Granularity::Week));
        assert!("year".parse::<Granularity>().is_err());
    }
}
