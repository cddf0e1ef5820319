pub mod error;
pub mod record;
pub mod normalize;
pub mod eligibility;
pub mod timeline;
pub mod stats;
pub mod payload;
pub mod prompt;
pub mod report;
pub mod assembler;
pub mod pipeline;

pub use error::{PipelineError, Result};
pub use pipeline::{prepare, run, AggregationOpts, AnalysisBackend, PreparedAnalysis};
pub use report::PatternReport;
