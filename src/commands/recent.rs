use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::FolderArgs;

/// Arguments for the `dirlin recent` subcommand.
#[derive(Debug, Args)]
pub struct RecentArgs {
    /// Filename pattern, e.g. `ohlcv` matches `ohlcv_2025.xlsx`
    pub pattern: String,

    #[command(flatten)]
    pub folder: FolderArgs,

    /// Only consider files modified in the last N days
    #[arg(long)]
    pub days: Option<u64>,

    /// Rows of the table to print
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

pub fn recent_command(args: RecentArgs) -> Result<()> {
    let mut folder = args.folder.open()?;
    if let Some(days) = args.days {
        folder = folder.within_days(days);
    }

    let found = folder.find_recent(&args.pattern)?;
    let table = folder.open(&found.path)?;

    println!(
        "{} {} (modified {})",
        "Most recent:".bold(),
        found.path.display(),
        found.modified_at().format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "{} row(s), {} column(s)\n",
        table.row_count(),
        table.column_count()
    );
    println!("{}", table.preview(args.rows));
    Ok(())
}
