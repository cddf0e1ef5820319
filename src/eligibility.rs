use crate::error::{PipelineError, Result};
use crate::record::{RawDream, RawJournalEntry};

pub const DEFAULT_MIN_ENTRIES: usize = 3;

/// Records allowed into one aggregation run.
#[derive(Debug, Clone, Default)]
pub struct EligibleSet {
    pub dreams: Vec<RawDream>,
    pub journal_entries: Vec<RawJournalEntry>,
}

impl EligibleSet {
    pub fn total(&self) -> usize {
        self.dreams.len() + self.journal_entries.len()
    }
}

/// Keeps every dream and the journal entries the user opted into analysis.
/// Fails before any further work when fewer than `min_entries` remain.
pub fn select_eligible(
    dreams: &[RawDream],
    journal_entries: &[RawJournalEntry],
    min_entries: usize,
) -> Result<EligibleSet> {
    let set = EligibleSet {
        dreams: dreams.to_vec(),
        journal_entries: journal_entries.iter().filter(|j| j.include_in_analysis).cloned().collect(),
    };
    let total = set.total();
    if total < min_entries {
        return Err(PipelineError::InsufficientData { total, required: min_entries });
    }
    tracing::debug!(
        dreams = set.dreams.len(),
        journal = set.journal_entries.len(),
        skipped = journal_entries.len() - set.journal_entries.len(),
        "selected eligible entries"
    );
    Ok(set)
}
