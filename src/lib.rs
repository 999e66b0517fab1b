pub mod config;
pub mod error;
pub mod folder;
pub mod loader;
pub mod path;
pub mod pipeline;
pub mod report;
pub mod table;
pub mod validation;

pub use config::PipelineConfig;
pub use error::{DirlinError, Result};
pub use folder::Folder;
pub use path::FolderPath;
pub use pipeline::Pipeline;
pub use report::Report;
pub use table::{Table, Value};
pub use validation::{Check, Validation, ValidationResult};
