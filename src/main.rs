use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{CombineArgs, RecentArgs, ValidateArgs};

#[derive(Parser)]
#[command(
    name = "dirlin",
    about = "Find the latest report files in a folder, shape them, and validate their rows",
    version,
    author,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (use -vv for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the most recent file matching a pattern
    Recent(RecentArgs),

    /// Stack every file matching a pattern into one table
    Combine(CombineArgs),

    /// Run the checks of a pipeline file
    Validate(ValidateArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Recent(args) => commands::recent_command(args),
        Commands::Combine(args) => commands::combine_command(args),
        Commands::Validate(args) => {
            let passed = commands::validate_command(args)?;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbose {
        0 => EnvFilter::new("dirlin=warn"),
        1 => EnvFilter::new("dirlin=info"),
        _ => EnvFilter::new("dirlin=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
