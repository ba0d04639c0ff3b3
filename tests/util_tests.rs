use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use sonic_upload::{
    ApiToken, ArtifactFile, BuildEnv, HttpEnvelope, PackageMetadata, Platform, Project,
    UploadError, UploadParameters, compare_modified_desc, decode_envelope, expand_or_unknown,
    normalize_host,
};

#[test]
fn platform_follows_extension() {
    assert_eq!(Platform::from_file_name("app-release.ipa"), Platform::Ios);
    assert_eq!(Platform::from_file_name("app-release.apk"), Platform::Android);
    assert_eq!(Platform::from_file_name("app-release"), Platform::Unknown);
    assert_eq!(Platform::from_file_name("app-release."), Platform::Unknown);
    assert_eq!(Platform::from_file_name("ipa.apk"), Platform::Android);
    assert_eq!(Platform::from_file_name("whatsipa.apk"), Platform::Android);
}

// The extension is matched by substring, so odd extensions containing "ipa" count as iOS.
#[test]
fn platform_substring_quirk_is_preserved() {
    assert_eq!(Platform::from_file_name("foo.zipa"), Platform::Ios);
    assert_eq!(Platform::from_file_name("foo.ipax"), Platform::Ios);
    assert_eq!(Platform::from_file_name("foo.zip"), Platform::Android);
}

#[test]
fn metadata_serializes_in_server_shape() {
    let metadata = PackageMetadata {
        pkg_name: "app.ipa".into(),
        url: "https://x/app.ipa".into(),
        platform: Platform::Ios,
        project_id: 3,
        branch: "unknown".into(),
        build_url: "http://ci/1".into(),
    };
    let v = serde_json::to_value(&metadata).unwrap();
    assert_eq!(v["pkgName"], "app.ipa");
    assert_eq!(v["platform"], "iOS");
    assert_eq!(v["projectId"], 3);
    assert_eq!(v["buildUrl"], "http://ci/1");
    assert_eq!(
        serde_json::to_value(Platform::Unknown).unwrap(),
        serde_json::json!("unknown")
    );
}

#[test]
fn decodes_envelopes_by_payload_type() {
    let upload: HttpEnvelope<String> =
        decode_envelope(r#"{"code":2000,"message":"ok","data":"https://x/y.apk"}"#).unwrap();
    assert!(upload.is_success());
    assert_eq!(upload.into_data().as_deref(), Some("https://x/y.apk"));

    let failed: HttpEnvelope<String> =
        decode_envelope(r#"{"success":false,"message":"denied"}"#).unwrap();
    assert!(!failed.is_success());
    assert_eq!(failed.data, None);

    let projects: HttpEnvelope<Vec<Project>> = decode_envelope(
        r#"{"data":[{"id":1,"projectName":"Demo","projectDes":"d","robotType":1,"extra":true}]}"#,
    )
    .unwrap();
    let projects = projects.into_data().unwrap();
    assert_eq!(projects[0].id, 1);
    assert_eq!(projects[0].project_name, "Demo");

    let err = decode_envelope::<String>("<html>").unwrap_err();
    assert!(matches!(err, UploadError::Decode { ref body, .. } if body == "<html>"));
}

#[test]
fn api_token_is_redacted() {
    let token = ApiToken::new("s3cr3t");
    assert_eq!(format!("{:?}", token), "ApiToken(***)");
    assert_eq!(token.to_string(), "***");
    assert_eq!(token.reveal(), "s3cr3t");

    let params = UploadParameters {
        host: "http://sonic".into(),
        api_key: token,
        scan_dir: ".".into(),
        project_id: "1".into(),
    };
    assert!(!format!("{:?}", params).contains("s3cr3t"));
}

#[test]
fn parameters_resolve_placeholders_except_project_id() {
    let env = BuildEnv::from_pairs([
        ("SONIC_URL", "http://sonic:3000"),
        ("TOKEN", "abc"),
        ("WORKSPACE", "/ws"),
        ("PID", "9"),
    ]);
    let params = UploadParameters {
        host: "${SONIC_URL}".into(),
        api_key: ApiToken::new("${TOKEN}"),
        scan_dir: "${WORKSPACE}/build".into(),
        project_id: "${PID}".into(),
    };
    let resolved = params.resolve(&env);
    assert_eq!(resolved.host, "http://sonic:3000");
    assert_eq!(resolved.api_key.reveal(), "abc");
    assert_eq!(resolved.scan_dir, "/ws/build");
    assert_eq!(resolved.project_id, "${PID}");
}

#[test]
fn project_id_must_be_a_number() {
    let mut params = UploadParameters {
        host: String::new(),
        api_key: ApiToken::new(""),
        scan_dir: String::new(),
        project_id: "  ".into(),
    };
    assert!(matches!(
        params.numeric_project_id(),
        Err(UploadError::MissingProjectId)
    ));
    params.project_id = "abc".into();
    assert!(matches!(
        params.numeric_project_id(),
        Err(UploadError::InvalidProjectId(_))
    ));
    params.project_id = " 42 ".into();
    assert!(matches!(
        params.numeric_project_id(),
        Err(UploadError::InvalidProjectId(_))
    ));
    params.project_id = "42".into();
    assert_eq!(params.numeric_project_id().unwrap(), 42);
}

#[test]
fn unresolved_build_variables_become_unknown() {
    let env = BuildEnv::from_pairs([("GIT_BRANCH", "origin/dev")]);
    assert_eq!(expand_or_unknown(&env, "${GIT_BRANCH}"), "origin/dev");
    assert_eq!(expand_or_unknown(&env, "${BUILD_URL}"), "unknown");
}

#[test]
fn host_loses_trailing_slashes() {
    assert_eq!(normalize_host("http://sonic:3000/"), "http://sonic:3000");
    assert_eq!(normalize_host(" http://sonic/api// "), "http://sonic/api");
}

#[test]
fn newest_artifact_sorts_first() {
    let now = SystemTime::now();
    let old = ArtifactFile {
        path: PathBuf::from("/a/old.apk"),
        modified: now - Duration::from_secs(60),
    };
    let new = ArtifactFile {
        path: PathBuf::from("/a/new.apk"),
        modified: now,
    };
    let mut files = vec![old.clone(), new.clone()];
    files.sort_by(compare_modified_desc);
    assert_eq!(files, vec![new, old]);
}
