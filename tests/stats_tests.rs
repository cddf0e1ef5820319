use chrono::NaiveDate;
use dreamscope::normalize::{DreamDetails, EntryDetails, JournalDetails, MoodScore, TimelineEntry};
use dreamscope::stats::{self, MoodLabel, Trend};
use dreamscope::timeline::build_timeline;

fn entry(excerpt: &str, on: NaiveDate) -> TimelineEntry {
    TimelineEntry {
        id: excerpt.to_string(),
        title: "t".to_string(),
        occurred_on: on,
        excerpt: excerpt.to_string(),
        tags: vec![],
        details: EntryDetails::Journal(JournalDetails { mood: None }),
    }
}

fn dream_with_moods(on: NaiveDate, before: i64, after: i64) -> TimelineEntry {
    TimelineEntry {
        id: on.to_string(),
        title: "d".to_string(),
        occurred_on: on,
        excerpt: String::new(),
        tags: vec![],
        details: EntryDetails::Dream(DreamDetails {
            mood_before_sleep: MoodScore::new(before),
            mood_after_wakeup: MoodScore::new(after),
            mood_notes: None,
            analysis: None,
        }),
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

#[test]
fn word_frequency_counts_across_entries() {
    let entries = vec![entry("dreaming dreaming forest", day(1)), entry("forest water dreaming", day(2))];
    let wf = stats::word_frequency(&entries, 5, 30);
    let pairs: Vec<(&str, usize)> = wf.iter().map(|w| (w.word.as_str(), w.count)).collect();
    assert_eq!(pairs, vec![("dreaming", 3), ("forest", 2), ("water", 1)]);
}

#[test]
fn word_frequency_ignores_case_punctuation_and_short_words() {
    let entries = vec![entry("The HOUSE, the house! A big house…", day(1))];
    let wf = stats::word_frequency(&entries, 5, 30);
    assert_eq!(wf.len(), 1);
    assert_eq!(wf[0].word, "house");
    assert_eq!(wf[0].count, 3);
}

#[test]
fn word_frequency_is_capped() {
    let text = (0..50).map(|i| format!("word{i:02}x")).collect::<Vec<_>>().join(" ");
    let wf = stats::word_frequency(&[entry(&text, day(1))], 5, 30);
    assert_eq!(wf.len(), 30);
    // equal counts fall back to alphabetical order
    assert_eq!(wf[0].word, "word00x");
}

#[test]
fn recent_words_weigh_more() {
    let entries = vec![entry("ocean", day(31)), entry("mountain mountain", day(1))];
    let terms = stats::weighted_terms(&entries, 5, 15.0, 10);
    assert_eq!(terms[0].word, "ocean");
    assert_eq!(terms[0].weight, 1.0);
    // 30 days old at a 15 day half-life: two occurrences at 0.25 each
    assert_eq!(terms[1].word, "mountain");
    assert_eq!(terms[1].weight, 0.5);
    assert!(stats::weighted_terms(&[], 5, 15.0, 10).is_empty());
}

#[test]
fn tag_frequency_is_case_insensitive() {
    let mut a = entry("x", day(1));
    a.tags = vec!["Family".into(), "work".into()];
    let mut b = entry("y", day(2));
    b.tags = vec!["family".into()];
    let tags = stats::tag_frequency(&[a, b], 10);
    assert_eq!(tags[0].tag, "family");
    assert_eq!(tags[0].count, 2);
    assert_eq!(tags[1].tag, "work");
}

#[test]
fn mood_summary_averages_and_trend() {
    let dreams = vec![
        dream_with_moods(day(1), 3, 3),
        dream_with_moods(day(2), 4, 4),
        dream_with_moods(day(3), 8, 8),
        dream_with_moods(day(4), 9, 9),
    ];
    let t = build_timeline(dreams, vec![]);
    let m = stats::mood_summary(&t);
    assert_eq!(m.readings, 8);
    assert_eq!(m.before_sleep_average, Some(6.0));
    assert_eq!(m.after_wakeup_average, Some(6.0));
    assert_eq!(m.journal_average, None);
    assert_eq!(m.label, MoodLabel::Neutral);
    assert_eq!(m.trend, Trend::Rising);
}

#[test]
fn mood_summary_without_readings_is_unknown() {
    let t = build_timeline(vec![], vec![entry("calm day", day(1))]);
    let m = stats::mood_summary(&t);
    assert_eq!(m.readings, 0);
    assert_eq!(m.overall_average, None);
    assert_eq!(m.label, MoodLabel::Unknown);
    assert_eq!(m.trend, Trend::Stable);
}
