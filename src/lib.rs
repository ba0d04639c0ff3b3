//! Uploads freshly built `ipa`/`apk` packages to a Sonic server from a CI build step.

pub mod cli;
pub mod env;
pub mod error;
pub mod locator;
pub mod model;
pub mod outputs;
pub mod pipeline;
pub mod progress;
pub mod projects;
pub mod sonic;
pub mod util;

pub use env::BuildEnv;
pub use error::UploadError;
pub use locator::locate_artifact;
pub use model::{
    ApiToken, ArtifactFile, HttpEnvelope, PackageMetadata, Platform, Project, UploadParameters,
    decode_envelope,
};
pub use outputs::{APP_URL_OUTPUT, BuildOutputs, LogOutputs, MemoryOutputs, OutputFile};
pub use pipeline::{Pipeline, UploadOutcome};
pub use progress::{LogObserver, ProgressStepper, UploadEvent, UploadObserver};
pub use projects::{GlobalConfig, list_projects};
pub use sonic::SonicClient;
pub use util::{compare_modified_desc, expand_or_unknown, normalize_host};
