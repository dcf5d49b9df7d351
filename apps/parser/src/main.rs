use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_parser::config::Config;
use resume_parser::pipeline::{parse_batch, ResumeParser};
use resume_parser::reader::DocumentFormat;
use resume_parser::ResumeRecord;

/// Extract structured resume data from PDF and DOCX files.
#[derive(Debug, Parser)]
#[command(name = "resume-parser", version, about)]
struct Cli {
    /// Resume files to parse.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Input format override. `auto` detects from extension or magic bytes.
    #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
    format: FormatArg,

    /// Write output to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Maximum documents processed concurrently (shared LLM rate budget).
    #[arg(long, default_value_t = 4)]
    jobs: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Auto,
    Pdf,
    Docx,
}

/// One line of batch output.
#[derive(Debug, Serialize)]
struct BatchItem {
    file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    resume: Option<ResumeRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "resume-parser v{} ({} inputs, jobs={})",
        env!("CARGO_PKG_VERSION"),
        cli.inputs.len(),
        cli.jobs
    );

    let parser = ResumeParser::new(&config)?;
    info!(
        "pipeline ready (resolver model: {})",
        resume_parser::llm_client::MODEL
    );

    let format = match cli.format {
        FormatArg::Auto => None,
        FormatArg::Pdf => Some(DocumentFormat::Pdf),
        FormatArg::Docx => Some(DocumentFormat::Docx),
    };
    let results = parse_batch(&parser, cli.inputs.clone(), cli.jobs, format).await;

    let failures = results.iter().filter(|(_, r)| r.is_err()).count();
    for (path, result) in &results {
        if let Err(e) = result {
            error!(path = %path.display(), "parse failed: {e}");
        }
    }

    let output = render_output(&results, cli.pretty)?;
    match &cli.output {
        Some(path) => std::fs::write(path, output)
            .with_context(|| format!("failed to write output to {}", path.display()))?,
        None => println!("{output}"),
    }

    if failures == results.len() {
        bail!("all {failures} documents failed to parse");
    }
    Ok(())
}

/// A single successful input prints the bare record; anything else prints an
/// array of per-file items.
fn render_output(
    results: &[(PathBuf, Result<ResumeRecord, resume_parser::ParseError>)],
    pretty: bool,
) -> Result<String> {
    if let [(_, Ok(record))] = results {
        let json = if pretty {
            serde_json::to_string_pretty(record)?
        } else {
            serde_json::to_string(record)?
        };
        return Ok(json);
    }

    let items: Vec<BatchItem> = results
        .iter()
        .map(|(path, result)| match result {
            Ok(record) => BatchItem {
                file: path.clone(),
                resume: Some(record.clone()),
                error: None,
            },
            Err(e) => BatchItem {
                file: path.clone(),
                resume: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    let json = if pretty {
        serde_json::to_string_pretty(&items)?
    } else {
        serde_json::to_string(&items)?
    };
    Ok(json)
}
