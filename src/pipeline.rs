//! The upload build step: locate, upload, then register the package.

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::env::BuildEnv;
use crate::error::UploadError;
use crate::locator::locate_artifact;
use crate::model::{ApiToken, ArtifactFile, PackageMetadata, Platform, UploadParameters};
use crate::outputs::{APP_URL_OUTPUT, BuildOutputs};
use crate::progress::{LogObserver, UploadObserver};
use crate::sonic::SonicClient;
use crate::util::expand_or_unknown;

pub const BRANCH_PLACEHOLDER: &str = "${GIT_BRANCH}";
pub const BUILD_URL_PLACEHOLDER: &str = "${BUILD_URL}";

const SEPARATOR: &str = "===================";

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub url: String,
    pub metadata: PackageMetadata,
    pub metadata_saved: bool,
}

pub struct Pipeline<'a> {
    env: &'a BuildEnv,
    outputs: &'a mut dyn BuildOutputs,
    observer: Arc<dyn UploadObserver>,
}

impl<'a> Pipeline<'a> {
    pub fn new(env: &'a BuildEnv, outputs: &'a mut dyn BuildOutputs) -> Self {
        Self {
            env,
            outputs,
            observer: Arc::new(LogObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn UploadObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Runs the step and reports whether the package was uploaded.
    ///
    /// A failure to register metadata is logged but does not fail the step.
    pub async fn run(&mut self, params: &UploadParameters) -> bool {
        match self.execute(params).await {
            Ok(outcome) => {
                info!("package available at {}", outcome.url);
                true
            }
            Err(e) => {
                error!("{}", e);
                false
            }
        }
    }

    pub async fn execute(
        &mut self,
        params: &UploadParameters,
    ) -> Result<UploadOutcome, UploadError> {
        let params = params.resolve(self.env);
        let project_id = params.numeric_project_id()?;
        let artifact = find_upload_file(&params.scan_dir)?;

        let client = SonicClient::new(&params.host)?;
        info!(
            "Sonic upload: {} -> {} (project {})",
            artifact.path.display(),
            client.base_url(),
            project_id
        );

        let url = self
            .upload_artifact(&client, &params.api_key, &artifact.path)
            .await
            .ok_or_else(|| UploadError::UploadFailed(artifact.file_name()))?;

        let pkg_name = artifact.file_name();
        let metadata = PackageMetadata {
            platform: Platform::from_file_name(&pkg_name),
            pkg_name,
            url: url.clone(),
            project_id,
            branch: expand_or_unknown(self.env, BRANCH_PLACEHOLDER),
            build_url: expand_or_unknown(self.env, BUILD_URL_PLACEHOLDER),
        };
        let metadata_saved = report_metadata(&client, &params.api_key, &metadata).await;

        Ok(UploadOutcome {
            url,
            metadata,
            metadata_saved,
        })
    }

    /// Uploads `path` and publishes the returned URL as `appURL`. `None` means the upload failed.
    pub async fn upload_artifact(
        &mut self,
        client: &SonicClient,
        token: &ApiToken,
        path: &Path,
    ) -> Option<String> {
        match client
            .upload_package(token, path, Arc::clone(&self.observer))
            .await
        {
            Ok(url) => {
                if let Err(e) = self.outputs.publish(APP_URL_OUTPUT, &url) {
                    warn!("{}", e);
                }
                Some(url)
            }
            Err(e) => {
                error!("{}", SEPARATOR);
                error!("Upload file failed.");
                error!("{}", e);
                error!("{}", SEPARATOR);
                None
            }
        }
    }
}

fn find_upload_file(scan_dir: &str) -> Result<ArtifactFile, UploadError> {
    let artifact = locate_artifact(Path::new(scan_dir)).map_err(|e| {
        warn!("{}", e);
        UploadError::MissingArtifact
    })?;
    if !artifact.path.is_file() {
        return Err(UploadError::MissingArtifact);
    }
    Ok(artifact)
}

async fn report_metadata(
    client: &SonicClient,
    token: &ApiToken,
    metadata: &PackageMetadata,
) -> bool {
    let saved = match client.save_package(token, metadata).await {
        Ok(envelope) => {
            info!("{}", SEPARATOR);
            info!("Send package info successful!");
            info!("{}", envelope);
            true
        }
        Err(e) => {
            warn!("{}", SEPARATOR);
            warn!("Send package info failed.");
            warn!("{}", e);
            false
        }
    };
    info!("{}", SEPARATOR);
    saved
}
