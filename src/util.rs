use std::cmp::Ordering;

use crate::env::BuildEnv;
use crate::model::ArtifactFile;

/// Value used when a build variable could not be resolved.
pub const UNKNOWN: &str = "unknown";

pub fn compare_modified_desc(a: &ArtifactFile, b: &ArtifactFile) -> Ordering {
    b.modified.cmp(&a.modified)
}

/// Expands a single placeholder such as `${GIT_BRANCH}`, falling back to `"unknown"`.
pub fn expand_or_unknown(env: &BuildEnv, placeholder: &str) -> String {
    let value = env.expand(placeholder);
    if value == placeholder || value.trim().is_empty() {
        UNKNOWN.to_string()
    } else {
        value
    }
}

/// Strips trailing slashes so endpoint paths can be appended.
pub fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('/').to_string()
}
