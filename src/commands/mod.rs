mod combine;
mod recent;
mod validate;

pub use combine::{CombineArgs, combine_command};
pub use recent::{RecentArgs, recent_command};
pub use validate::{ValidateArgs, validate_command};

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use dirlin::Folder;

/// Folder and matching flags shared by `recent` and `combine`
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder to search (defaults to the current directory)
    #[arg(short, long, default_value = ".")]
    pub folder: PathBuf,

    /// Also search subfolders
    #[arg(short, long)]
    pub recurse: bool,

    /// Match the pattern literally instead of appending '*'
    #[arg(long)]
    pub exact: bool,
}

impl FolderArgs {
    pub fn open(&self) -> Result<Folder> {
        let mut folder = Folder::new(&self.folder)?.recurse(self.recurse);
        if self.exact {
            folder = folder.exact();
        }
        Ok(folder)
    }
}
