use std::path::PathBuf;

use reqwest::StatusCode;

/// Errors produced while locating, uploading or describing a package.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Missing project id, set --project-id or SONIC_PROJECT_ID")]
    MissingProjectId,

    #[error("Project id {0:?} is not an integer")]
    InvalidProjectId(String),

    #[error("No uploadable package file (ipa/apk) was found")]
    MissingArtifact,

    #[error("Scan dir {0:?} doesn't exist or is not a directory")]
    DirectoryNotFound(PathBuf),

    #[error("No ipa or apk file found under {0:?}")]
    NoArtifactFound(PathBuf),

    #[error("Upload file failed: {0}")]
    UploadFailed(String),

    #[error("Request rejected with status {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("Failed to parse response body: {body}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("Sonic host is not configured, set SONIC_HOST or pass --host")]
    MissingConfiguration,

    #[error("Invalid Sonic host {0:?}")]
    InvalidHost(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to publish build output: {0}")]
    Output(String),
}
