//! Variables handed to later build steps.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::info;

use crate::error::UploadError;

/// Name of the variable holding the uploaded package's download URL.
pub const APP_URL_OUTPUT: &str = "appURL";

pub trait BuildOutputs {
    fn publish(&mut self, name: &str, value: &str) -> Result<(), UploadError>;
}

/// Appends `name=value` lines to a file, as read by GitHub Actions from `$GITHUB_OUTPUT`.
#[derive(Debug, Clone)]
pub struct OutputFile {
    path: PathBuf,
}

impl OutputFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BuildOutputs for OutputFile {
    fn publish(&mut self, name: &str, value: &str) -> Result<(), UploadError> {
        if value.contains('\n') {
            return Err(UploadError::Output(format!(
                "value of {} spans several lines",
                name
            )));
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}={}", name, value)?;
        info!("${{{}}}: {}", name, value);
        Ok(())
    }
}

/// Only logs published values.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOutputs;

impl BuildOutputs for LogOutputs {
    fn publish(&mut self, name: &str, value: &str) -> Result<(), UploadError> {
        info!("${{{}}}: {}", name, value);
        Ok(())
    }
}

/// Keeps published values in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryOutputs {
    values: BTreeMap<String, String>,
}

impl MemoryOutputs {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl BuildOutputs for MemoryOutputs {
    fn publish(&mut self, name: &str, value: &str) -> Result<(), UploadError> {
        self.values.insert(name.to_string(), value.to_string());
        Ok(())
    }
}
