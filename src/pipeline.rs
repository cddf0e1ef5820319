use crate::assembler::{self, AssemblyContext};
use crate::eligibility::{self, DEFAULT_MIN_ENTRIES};
use crate::error::Result;
use crate::normalize::{self, TimelineEntry};
use crate::payload::{self, AnalysisRequest, EntryCounts};
use crate::record::{RawDream, RawJournalEntry};
use crate::report::PatternReport;
use crate::stats;
use crate::timeline::{self, Granularity, Timeline};
use serde_json::Value;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct AggregationOpts {
    /// Dreams plus eligible journal entries required before analysis runs.
    pub min_entries: usize,
    pub excerpt_chars: usize,
    /// Shortest word counted in frequency tables.
    pub min_word_chars: usize,
    pub top_words: usize,
    pub top_tags: usize,
    pub top_weighted_terms: usize,
    pub half_life_days: f64,
    pub granularity: Granularity,
}

impl Default for AggregationOpts {
    fn default() -> Self {
        Self {
            min_entries: DEFAULT_MIN_ENTRIES,
            excerpt_chars: 300,
            min_word_chars: 5,
            top_words: 30,
            top_tags: 10,
            top_weighted_terms: 15,
            half_life_days: 30.0,
            granularity: Granularity::Month,
        }
    }
}

/// The external language model step.
pub trait AnalysisBackend {
    fn analyze(&self, request: &AnalysisRequest) -> Result<Value>;
}

impl<F> AnalysisBackend for F
where
    F: Fn(&AnalysisRequest) -> Result<Value>,
{
    fn analyze(&self, request: &AnalysisRequest) -> Result<Value> {
        self(request)
    }
}

/// Output of the deterministic half of the pipeline, waiting for the model.
#[derive(Debug, Clone)]
pub struct PreparedAnalysis {
    pub timeline: Timeline,
    pub request: AnalysisRequest,
}

impl PreparedAnalysis {
    pub fn context(&self) -> AssemblyContext {
        AssemblyContext {
            time_range: self.request.time_range.clone(),
            counts: self.request.counts,
            mood_label: self.request.mood.label,
        }
    }

    pub fn assemble(&self, raw: &Value) -> Result<PatternReport> {
        assembler::assemble(raw, &self.context())
    }
}

/// Filter, normalize, build and aggregate. `time_range` is a display label
/// only; callers wanting a window must pre-filter the records.
pub fn prepare(
    dreams: &[RawDream],
    journal_entries: &[RawJournalEntry],
    time_range: &str,
    opts: &AggregationOpts,
) -> Result<PreparedAnalysis> {
    let start = Instant::now();
    let eligible = eligibility::select_eligible(dreams, journal_entries, opts.min_entries)?;

    let dream_entries: Vec<TimelineEntry> =
        eligible.dreams.iter().map(|d| normalize::normalize_dream(d, opts)).collect::<Result<_>>()?;
    let journal: Vec<TimelineEntry> = eligible
        .journal_entries
        .iter()
        .map(|j| normalize::normalize_journal(j, opts))
        .collect::<Result<_>>()?;
    let timeline = timeline::build_timeline(dream_entries, journal);

    let entries = timeline.entries();
    let request = AnalysisRequest {
        time_range: time_range.to_string(),
        counts: EntryCounts::of(&timeline),
        span: timeline.span(),
        entries: payload::summarize_entries(&timeline),
        word_frequency: stats::word_frequency(entries, opts.min_word_chars, opts.top_words),
        weighted_terms: stats::weighted_terms(entries, opts.min_word_chars, opts.half_life_days, opts.top_weighted_terms),
        top_tags: stats::tag_frequency(entries, opts.top_tags),
        mood: stats::mood_summary(&timeline),
        periods: timeline::segment(&timeline, opts.granularity, opts.top_tags),
    };
    tracing::info!(
        dreams = request.counts.dreams,
        journal = request.counts.journal_entries,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "prepared analysis request"
    );
    Ok(PreparedAnalysis { timeline, request })
}

/// Whole pipeline with a blocking backend call in the middle.
pub fn run<B: AnalysisBackend + ?Sized>(
    backend: &B,
    dreams: &[RawDream],
    journal_entries: &[RawJournalEntry],
    time_range: &str,
    opts: &AggregationOpts,
) -> Result<PatternReport> {
    let prepared = prepare(dreams, journal_entries, time_range, opts)?;
    let raw = backend.analyze(&prepared.request)?;
    let report = prepared.assemble(&raw)?;
    tracing::info!(
        symbols = report.recurring_symbols.len(),
        themes = report.dominant_themes.len(),
        emotions = report.emotional_patterns.len(),
        "assembled pattern report"
    );
    Ok(report)
}
