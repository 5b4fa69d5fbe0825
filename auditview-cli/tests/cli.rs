use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("auditview-core/tests/fixtures/application.json")
}

/// The binary with a private config home and no inherited settings
fn auditview(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("auditview").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env_remove("AUDITVIEW_BACKEND")
        .env_remove("AUDITVIEW_BASIC_AUTH")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_show_renders_file_report() {
    let home = tempdir().unwrap();
    auditview(home.path())
        .args(["show", "--plain", "--file"])
        .arg(fixture_path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Billing Service - Web Application"))
        .stdout(predicate::str::contains("━━ Job Health ━━"))
        .stdout(predicate::str::contains("\x1b[").not());
}

#[test]
fn test_show_print_layout_uses_dots() {
    let home = tempdir().unwrap();
    auditview(home.path())
        .args(["show", "--plain", "--print", "--file"])
        .arg(fixture_path())
        .assert()
        .success()
        .stdout(predicate::str::contains("● Resolved"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_error_prints_single_line() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let home = tempdir().unwrap();
    let output = auditview(home.path())
        .args(["show", "--backend", &server.uri()])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert_eq!(stderr.lines().count(), 1, "stderr was: {stderr}");
    assert!(stderr.contains("HTTP 500"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_open_url_selects_backend_and_print() {
    let body = std::fs::read_to_string(fixture_path()).unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let url = format!(
        "https://reports.example.com/view?backend={}&print=true",
        server.uri()
    );
    let home = tempdir().unwrap();
    auditview(home.path())
        .args(["open", &url])
        .assert()
        .success()
        .stdout(predicate::str::contains("Billing Service - Web Application"))
        .stdout(predicate::str::contains("● Resolved"));
}

#[test]
fn test_export_json_writes_dated_file() {
    let home = tempdir().unwrap();
    let out = tempdir().unwrap();
    auditview(home.path())
        .args(["export", "--format", "json", "--output-dir"])
        .arg(out.path())
        .arg("--file")
        .arg(fixture_path())
        .assert()
        .success()
        .stdout(predicate::str::contains("audit-report-"));

    let files: Vec<PathBuf> = std::fs::read_dir(out.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("audit-report-") && name.ends_with(".json"));

    let exported: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&files[0]).unwrap()).unwrap();
    let original: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(fixture_path()).unwrap()).unwrap();
    assert_eq!(exported, original);
}

#[test]
fn test_export_html_uses_print_layout() {
    let home = tempdir().unwrap();
    let out = tempdir().unwrap();
    auditview(home.path())
        .args(["export", "--format", "html", "--output-dir"])
        .arg(out.path())
        .arg("--file")
        .arg(fixture_path())
        .assert()
        .success();

    let path = std::fs::read_dir(out.path()).unwrap().next().unwrap().unwrap().path();
    let html = std::fs::read_to_string(path).unwrap();
    assert!(html.contains("@page { size: A4 landscape; margin: 0.25in; }"));
}

#[test]
fn test_unknown_export_format_is_rejected() {
    let home = tempdir().unwrap();
    auditview(home.path())
        .args(["export", "--format", "docx", "--file"])
        .arg(fixture_path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("docx"));
}

#[test]
fn test_config_set_backend_then_show() {
    let home = tempdir().unwrap();
    auditview(home.path())
        .args(["config", "set-backend", "https://api.example.com/apps/7"])
        .assert()
        .success();

    assert!(home.path().join("auditview/config.toml").exists());

    auditview(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://api.example.com/apps/7"));
}

#[test]
fn test_config_show_masks_password() {
    let home = tempdir().unwrap();
    auditview(home.path())
        .env("AUDITVIEW_BASIC_AUTH", "auditor:hunter2")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("auditor:****"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn test_missing_source_is_an_error() {
    let home = tempdir().unwrap();
    auditview(home.path())
        .arg("show")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No report source configured"));
}

#[test]
fn test_malformed_file_is_an_error() {
    let home = tempdir().unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"name\": ").unwrap();

    auditview(home.path())
        .args(["show", "--file"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid report JSON"));
}
