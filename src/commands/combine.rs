use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::FolderArgs;

/// Arguments for the `dirlin combine` subcommand.
#[derive(Debug, Args)]
pub struct CombineArgs {
    /// Filename pattern shared by the files to stack
    pub pattern: String,

    #[command(flatten)]
    pub folder: FolderArgs,

    /// Only stack the N most recent files
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn combine_command(args: CombineArgs) -> Result<()> {
    let folder = args.folder.open()?;

    let (matches, table) = folder.combine_matches(&args.pattern, args.limit)?;

    println!("{} {} file(s)", "Combined".bold(), matches.len());
    for found in &matches {
        println!("  {}", found.path.display());
    }
    println!("Rows: {}", table.row_count());
    println!("Columns: {}", table.columns().join(", "));
    Ok(())
}
