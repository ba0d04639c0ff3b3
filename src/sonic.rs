use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Url};
use serde_json::Value;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::error::UploadError;
use crate::model::{ApiToken, HttpEnvelope, PackageMetadata, Project, decode_envelope};
use crate::progress::{PROGRESS_STEP_PERCENT, ProgressStepper, UploadEvent, UploadObserver};
use crate::util::normalize_host;

pub const UPLOAD_PATH: &str = "/server/api/folder/upload";
pub const PACKAGE_PATH: &str = "/server/api/controller/packages";
pub const PROJECT_LIST_PATH: &str = "/api/controller/projects/list";

/// Header carrying the Sonic API token.
pub const TOKEN_HEADER: &str = "SonicToken";

/// Multipart `type` value for package uploads.
pub const UPLOAD_TYPE: &str = "packageFiles";

pub struct SonicClient {
    http: Client,
    base_url: String,
}

impl SonicClient {
    pub fn new(host: &str) -> Result<Self, UploadError> {
        let base_url = normalize_host(host);
        Url::parse(&base_url).map_err(|_| UploadError::InvalidHost(host.to_string()))?;
        let http = Client::builder()
            .user_agent(concat!("sonic-upload/", env!("CARGO_PKG_VERSION")))
            .use_rustls_tls()
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Uploads a package and returns the download URL assigned by the server.
    pub async fn upload_package(
        &self,
        token: &ApiToken,
        path: &Path,
        observer: Arc<dyn UploadObserver>,
    ) -> Result<String, UploadError> {
        let result = self.send_package(token, path, Arc::clone(&observer)).await;
        match &result {
            Ok(_) => observer.on_event(&UploadEvent::Finished),
            Err(e) => observer.on_event(&UploadEvent::Failed(e.to_string())),
        }
        result
    }

    async fn send_package(
        &self,
        token: &ApiToken,
        path: &Path,
        observer: Arc<dyn UploadObserver>,
    ) -> Result<String, UploadError> {
        let file = tokio::fs::File::open(path).await?;
        let total_bytes = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "package".to_string());

        observer.on_event(&UploadEvent::Started {
            file_name: file_name.clone(),
            total_bytes,
        });

        let mut stepper = ProgressStepper::new(total_bytes, PROGRESS_STEP_PERCENT);
        let stream = ReaderStream::new(file).map(move |chunk| {
            if let Ok(bytes) = &chunk
                && let Some(percent) = stepper.advance(bytes.len() as u64)
            {
                observer.on_event(&UploadEvent::Progress { percent });
            }
            chunk
        });

        let part = Part::stream_with_length(Body::wrap_stream(stream), total_bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        let form = Form::new().part("file", part).text("type", UPLOAD_TYPE);

        let res = self
            .http
            .post(self.url(UPLOAD_PATH))
            .header(TOKEN_HEADER, token.reveal())
            .multipart(form)
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(UploadError::UploadFailed(format!("{}: {}", status, text)));
        }
        debug!("upload ok: {} bytes of response", text.len());

        let envelope: HttpEnvelope<String> = decode_envelope(&text)?;
        if !envelope.is_success() {
            return Err(UploadError::UploadFailed(text));
        }
        match envelope.into_data() {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => Err(UploadError::UploadFailed(format!(
                "response carried no download url: {}",
                text
            ))),
        }
    }

    /// Registers an uploaded package with its project.
    pub async fn save_package(
        &self,
        token: &ApiToken,
        metadata: &PackageMetadata,
    ) -> Result<HttpEnvelope<Value>, UploadError> {
        let res = self
            .http
            .put(self.url(PACKAGE_PATH))
            .header(TOKEN_HEADER, token.reveal())
            .json(metadata)
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(UploadError::Rejected { status, body: text });
        }
        let envelope: HttpEnvelope<Value> = decode_envelope(&text)?;
        if !envelope.is_success() {
            return Err(UploadError::Rejected { status, body: text });
        }
        Ok(envelope)
    }

    /// Lists every project known to the server. This endpoint takes no token.
    pub async fn list_projects(&self) -> Result<Vec<Project>, UploadError> {
        let res = self.http.get(self.url(PROJECT_LIST_PATH)).send().await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(UploadError::Rejected { status, body: text });
        }
        let envelope: HttpEnvelope<Vec<Project>> = decode_envelope(&text)?;
        debug!("project list: {} bytes", text.len());
        Ok(envelope.into_data().unwrap_or_default())
    }
}
