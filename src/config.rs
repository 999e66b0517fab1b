//! YAML pipeline definitions read by the command-line front end

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{DirlinError, Result};
use crate::folder::Folder;
use crate::loader::MatchOptions;
use crate::pipeline::Pipeline;
use crate::report::Report;
use crate::validation::{CheckSpec, Validation};

/// Top-level pipeline file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Folder holding the report files, relative to the config file
    pub folder: PathBuf,

    #[serde(default)]
    pub recurse: bool,

    /// Ignore files older than this many days
    #[serde(default)]
    pub days: Option<u64>,

    pub reports: BTreeMap<String, ReportConfig>,

    /// Checks applied to every report
    #[serde(default)]
    pub checks: Vec<CheckSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(flatten)]
    pub report: Report,

    /// Column identifying rows in the error log
    #[serde(default)]
    pub key_column: Option<String>,

    /// Worksheet to read from workbooks
    #[serde(default)]
    pub sheet: Option<String>,

    /// Field name to candidate column names
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,

    /// Checks applied to this report only, after the shared ones
    #[serde(default)]
    pub checks: Vec<CheckSpec>,
}

impl PipelineConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file; a relative `folder` is taken relative to the file
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading pipeline config from {}", path.display());
        let mut config = Self::from_yaml(&fs::read_to_string(path)?)?;
        if config.folder.is_relative()
            && let Some(parent) = path.parent()
        {
            config.folder = parent.join(&config.folder);
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.reports.is_empty() {
            return Err(DirlinError::Config(
                "configuration must define at least one report".to_string(),
            ));
        }

        for (name, report) in &self.reports {
            if report.report.pattern.trim().is_empty() {
                return Err(DirlinError::Config(format!(
                    "report '{name}' has an empty pattern"
                )));
            }

            let mut seen = HashSet::new();
            for check in self.checks.iter().chain(&report.checks) {
                if !seen.insert(check.name.as_str()) {
                    return Err(DirlinError::InvalidCheck {
                        check: check.name.clone(),
                        message: format!("duplicate check name in report '{name}'"),
                    });
                }
                check.validate()?;
            }
        }
        Ok(())
    }

    pub fn report(&self, name: &str) -> Result<&ReportConfig> {
        self.reports.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.reports.keys().map(String::as_str).collect();
            DirlinError::Config(format!(
                "unknown report '{name}'. Known reports: {}",
                known.join(", ")
            ))
        })
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            recurse: self.recurse,
            days: self.days,
            ..MatchOptions::default()
        }
    }

    /// Pipeline for one named report
    pub fn pipeline(&self, name: &str) -> Result<Pipeline> {
        let report = self.report(name)?;
        let mut folder = Folder::new(&self.folder)?.with_match_options(self.match_options());
        if let Some(sheet) = &report.sheet {
            folder = folder.sheet(sheet.clone());
        }
        Ok(Pipeline::new(folder).with_report(report.report.clone()))
    }

    /// Shared checks followed by the report's own
    pub fn validation(&self, name: &str) -> Result<Validation> {
        let report = self.report(name)?;
        let checks = self
            .checks
            .iter()
            .chain(&report.checks)
            .cloned()
            .map(CheckSpec::into_check)
            .collect::<Result<Vec<_>>>()?;

        let mut validation = Validation::from_checks(checks)?;
        for (field, candidates) in &report.aliases {
            validation = validation.alias(field.clone(), candidates.clone());
        }
        if let Some(key) = &report.key_column {
            validation = validation.key_column(key.clone());
        }
        Ok(validation)
    }
}
