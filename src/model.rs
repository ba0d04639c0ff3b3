//! Value types exchanged with the Sonic server and passed between pipeline steps.

use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::env::BuildEnv;
use crate::error::UploadError;

/// Sonic API token. Never printed; read it with [`ApiToken::reveal`].
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn reveal(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

impl fmt::Display for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Inputs of a single upload invocation.
#[derive(Debug, Clone)]
pub struct UploadParameters {
    pub host: String,
    pub api_key: ApiToken,
    pub scan_dir: String,
    pub project_id: String,
}

impl UploadParameters {
    /// Expands placeholders in the host, token and scan dir. The project id is taken as is.
    pub fn resolve(&self, env: &BuildEnv) -> Self {
        Self {
            host: env.expand(&self.host),
            api_key: ApiToken::new(env.expand(self.api_key.reveal())),
            scan_dir: env.expand(&self.scan_dir),
            project_id: self.project_id.clone(),
        }
    }

    /// Checks the project id and returns it as an integer.
    pub fn numeric_project_id(&self) -> Result<i64, UploadError> {
        if self.project_id.trim().is_empty() {
            return Err(UploadError::MissingProjectId);
        }
        self.project_id
            .parse::<i64>()
            .map_err(|_| UploadError::InvalidProjectId(self.project_id.clone()))
    }
}

/// A package file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    pub path: PathBuf,
    pub modified: SystemTime,
}

impl ArtifactFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "iOS")]
    Ios,
    #[serde(rename = "Android")]
    Android,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Platform {
    /// Classifies a package by the text after its last dot.
    ///
    /// Anything whose extension merely contains `ipa` counts as iOS, so `foo.zipa`
    /// is reported as iOS while `whatsipa.apk` is Android.
    pub fn from_file_name(name: &str) -> Self {
        let ext = match name.rfind('.') {
            Some(idx) => &name[idx + 1..],
            None => "",
        };
        if ext.trim().is_empty() {
            Self::Unknown
        } else if ext.contains("ipa") {
            Self::Ios
        } else {
            Self::Android
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ios => "iOS",
            Self::Android => "Android",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of the package registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
    pub pkg_name: String,
    pub url: String,
    pub platform: Platform,
    pub project_id: i64,
    pub branch: String,
    pub build_url: String,
}

/// Response wrapper used by every Sonic endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpEnvelope<T> {
    pub code: Option<i64>,
    pub message: Option<String>,
    pub success: Option<bool>,
    pub data: Option<T>,
}

impl<T> HttpEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(true)
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

impl<T: fmt::Debug> fmt::Display for HttpEnvelope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HttpResult{{code={}, message={}, data={:?}}}",
            self.code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
            self.message.as_deref().unwrap_or("-"),
            self.data
        )
    }
}

/// Decodes a response body into an envelope carrying `T`.
pub fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<HttpEnvelope<T>, UploadError> {
    serde_json::from_str(body).map_err(|source| UploadError::Decode {
        source,
        body: body.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    #[serde(default)]
    pub project_name: String,
    pub project_des: Option<String>,
    pub project_img: Option<String>,
    pub robot_type: Option<i32>,
    pub update_time: Option<String>,
}
