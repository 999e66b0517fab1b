use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;

use dirlin::PipelineConfig;
use dirlin::validation::{FailureDetail, ValidationResult};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Arguments for the `dirlin validate` subcommand.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Pipeline file
    #[arg(short, long, default_value = "dirlin.yml")]
    pub config: PathBuf,

    /// Only run this report
    #[arg(long)]
    pub report: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Returns whether every check passed
pub fn validate_command(args: ValidateArgs) -> Result<bool> {
    let config = PipelineConfig::load(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;

    let names: Vec<String> = match &args.report {
        Some(name) => {
            config.report(name)?;
            vec![name.clone()]
        }
        None => config.reports.keys().cloned().collect(),
    };

    let mut passed = true;
    let mut outputs = Vec::new();
    for name in &names {
        let pipeline = config.pipeline(name)?;
        let validation = config.validation(name)?;
        let (table, result) = pipeline
            .run(&validation)
            .with_context(|| format!("Report '{name}' failed"))?;
        passed &= result.is_success();

        match args.format {
            OutputFormat::Text => print_text(name, table.row_count(), &result),
            OutputFormat::Json => outputs.push(json!({
                "report": name,
                "rows": table.row_count(),
                "passed": result.is_success(),
                "summary": result.summary(),
                "errors": result.errors(),
            })),
        }
    }

    if let OutputFormat::Json = args.format {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
    } else if passed {
        println!("\n{}", "All checks passed".green());
    } else {
        println!("\n{}", "Some checks failed".red());
    }
    Ok(passed)
}

fn print_text(name: &str, rows: usize, result: &ValidationResult) {
    println!("{} {} ({rows} rows)", "Report".bold(), name.bold());
    for summary in result.summary() {
        let status = if summary.errors == 0 {
            "ok".green()
        } else {
            "FAILED".red()
        };
        println!(
            "  {:<24} {:>6} checked {:>6} passed {:>6} failed  {status}",
            summary.check, summary.total_checked, summary.passed, summary.errors
        );
    }

    for entry in result.errors() {
        let row = match &entry.key {
            Some(key) => format!("row {} ({key})", entry.row),
            None => format!("row {}", entry.row),
        };
        match &entry.detail {
            FailureDetail::Failed => println!("    {row}: {}", entry.check),
            FailureDetail::EvaluationError(message) => {
                println!("    {row}: {} evaluation error: {message}", entry.check)
            }
        }
    }
}
