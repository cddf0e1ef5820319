use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("not enough entries for pattern analysis: {total} eligible, at least {required} required")]
    InsufficientData { total: usize, required: usize },
    #[error("{kind} entry {id} has neither a usable date nor createdAt")]
    UndatedEntry { kind: &'static str, id: String },
    #[error("analysis result is malformed ({section}): {reason}")]
    MalformedAnalysis { section: String, reason: String },
    #[error("analysis text is not valid json: {0}")]
    AnalysisJson(#[from] serde_json::Error),
    #[error("analysis backend failed: {0}")]
    Backend(String),
}

impl PipelineError {
    pub fn malformed(section: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::MalformedAnalysis { section: section.into(), reason: reason.into() }
    }

    /// Validation failures the user can fix by writing more entries.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, PipelineError::InsufficientData { .. })
    }

    /// Faults of the external analysis step; calling it again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::MalformedAnalysis { .. } | PipelineError::AnalysisJson(_) | PipelineError::Backend(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
