use tracing::info;

use crate::error::UploadError;
use crate::model::Project;
use crate::sonic::SonicClient;

/// Server-wide settings that do not change between uploads.
#[derive(Debug, Clone, Default)]
pub struct GlobalConfig {
    pub host: Option<String>,
}

impl GlobalConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
        }
    }

    /// Reads `SONIC_HOST`.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("SONIC_HOST").ok(),
        }
    }

    pub fn with_host(mut self, host: Option<String>) -> Self {
        if host.is_some() {
            self.host = host;
        }
        self
    }

    pub fn require_host(&self) -> Result<&str, UploadError> {
        match self.host.as_deref().map(str::trim) {
            Some(host) if !host.is_empty() => Ok(host),
            _ => Err(UploadError::MissingConfiguration),
        }
    }
}

pub async fn list_projects(config: &GlobalConfig) -> Result<Vec<Project>, UploadError> {
    let host = config.require_host()?;
    let client = SonicClient::new(host)?;
    let projects = client.list_projects().await?;
    info!("loaded {} projects from {}", projects.len(), client.base_url());
    Ok(projects)
}
