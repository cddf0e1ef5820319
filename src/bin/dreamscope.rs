use anyhow::Context;
use clap::Parser;
use dreamscope::record::DiaryInput;
use dreamscope::timeline::Granularity;
use dreamscope::{AggregationOpts, PipelineError};
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "dreamscope", version, about = "Pattern aggregation over dream and journal entries")]
struct Cli {
    /// Diary JSON ({"dreams": [...], "journalEntries": [...]}); `-` or nothing for stdin.
    input: Option<String>,

    /// Display label for the covered period, e.g. "30 Tage"
    #[arg(long = "time-range")]
    time_range: Option<String>,

    /// Print the rendered model prompt instead of the request JSON
    #[arg(long = "prompt", default_value_t = false)]
    prompt: bool,

    /// Model output to assemble into a pattern report (JSON, optionally fenced)
    #[arg(long = "analysis")]
    analysis: Option<String>,

    #[arg(long = "min-entries", default_value_t = dreamscope::eligibility::DEFAULT_MIN_ENTRIES)]
    min_entries: usize,
    #[arg(long = "top-words", default_value_t = 30)]
    top_words: usize,
    #[arg(long = "half-life-days", default_value_t = 30.0)]
    half_life_days: f64,
    /// Period size for the timeline scaffold: week | month
    #[arg(long = "granularity", default_value = "month")]
    granularity: Granularity,
}

fn init_logging() {
    let filter = std::env::var("DREAMSCOPE_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

fn read_source(path: Option<&str>) -> anyhow::Result<String> {
    match path {
        None | Some("-") => {
            if atty::is(atty::Stream::Stdin) {
                tracing::info!("reading diary JSON from stdin (end with Ctrl-D)");
            }
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            Ok(buf)
        }
        Some(p) => fs::read_to_string(p).with_context(|| format!("reading {p}")),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();

    let input: DiaryInput =
        serde_json::from_str(&read_source(cli.input.as_deref())?).context("parsing diary input")?;
    let time_range = cli
        .time_range
        .clone()
        .or_else(|| input.time_range.clone())
        .unwrap_or_else(|| "all entries".to_string());
    let opts = AggregationOpts {
        min_entries: cli.min_entries,
        top_words: cli.top_words,
        half_life_days: cli.half_life_days,
        granularity: cli.granularity,
        ..Default::default()
    };

    let prepared = match dreamscope::prepare(&input.dreams, &input.journal_entries, &time_range, &opts) {
        Ok(p) => p,
        Err(err @ PipelineError::InsufficientData { .. }) => {
            eprintln!("{err}. Add more dreams or include journal entries in the analysis.");
            return Ok(ExitCode::from(2));
        }
        Err(err) => return Err(err.into()),
    };

    if let Some(path) = cli.analysis.as_deref() {
        let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
        let report = dreamscope::assembler::parse_analysis_text(&text).and_then(|raw| prepared.assemble(&raw));
        return match report {
            Ok(r) => {
                println!("{}", serde_json::to_string_pretty(&r)?);
                Ok(ExitCode::SUCCESS)
            }
            Err(err) if err.is_retryable() => {
                eprintln!("{err}. Request a new analysis and try again.");
                Ok(ExitCode::from(3))
            }
            Err(err) => Err(err.into()),
        };
    }

    if cli.prompt {
        println!("{}", dreamscope::prompt::render_prompt(&prepared.request)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&prepared.request)?);
    }
    Ok(ExitCode::SUCCESS)
}
