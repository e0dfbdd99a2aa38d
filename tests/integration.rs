use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use report_vault::config::load_config;
use report_vault::sqlite_store::SqliteKvStore;
use report_vault_core::store::{KeyValueStore, LEGACY_KEY};

fn vault_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("vault");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let reports_dir = root.join("reports");
    fs::create_dir_all(&reports_dir).unwrap();

    fs::write(
        reports_dir.join("rust.json"),
        r#"{
  "id": "r-rust",
  "timestamp": "2025-03-01T10:15:00Z",
  "channelName": "Rust Daily",
  "channelId": "UC42",
  "email": "owner@rust.dev",
  "status": "completed",
  "aiReport": {
    "services": {
      "predictive_ctr_analysis": {
        "score": 7,
        "potential_increase": "15%",
        "reasoning": "Strong **hooks** in titles"
      },
      "copyright_protection": {"risk_level": "HIGH", "flags": ["Music track"]},
      "custom_probe": {"x": 1}
    }
  }
}"#,
    )
    .unwrap();
    fs::write(
        reports_dir.join("cooking.json"),
        r#"{"channelName": "Home Cooking", "status": "pending"}"#,
    )
    .unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/vault.sqlite"

[session]
user = "alice"
"#,
        root.display()
    );

    let config_path = config_dir.join("vault.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn report_path(config_path: &Path, name: &str) -> String {
    config_path
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("reports")
        .join(name)
        .to_str()
        .unwrap()
        .to_string()
}

fn run_vault(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = vault_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run vault binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_init_creates_database() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_vault(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_vault(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_vault(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_list_empty() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_vault(&config_path, &["list"]);
    assert!(success, "list failed: stderr={}", stderr);
    assert!(stdout.contains("No reports for user 'alice'"));
}

#[test]
fn test_add_then_list_newest_first() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) =
        run_vault(&config_path, &["add", &report_path(&config_path, "rust.json")]);
    assert!(success, "add failed: stderr={}", stderr);
    assert_eq!(stdout.trim(), "r-rust");

    let (cooking_id, _, success) =
        run_vault(&config_path, &["add", &report_path(&config_path, "cooking.json")]);
    assert!(success);
    let cooking_id = cooking_id.trim().to_string();
    assert!(!cooking_id.is_empty());

    let (stdout, _, success) = run_vault(&config_path, &["list"]);
    assert!(success);
    assert!(stdout.contains("Reports:     2"));
    assert!(stdout.contains("Services:    3"));
    assert!(stdout.contains("Completed:   50%"));

    let cooking_pos = stdout.find(&cooking_id).unwrap();
    let rust_pos = stdout.find("r-rust").unwrap();
    assert!(cooking_pos < rust_pos, "newest report should be listed first");
}

#[test]
fn test_list_filter() {
    let (_tmp, config_path) = setup_test_env();
    run_vault(&config_path, &["add", &report_path(&config_path, "rust.json")]);
    run_vault(&config_path, &["add", &report_path(&config_path, "cooking.json")]);

    let (stdout, _, success) = run_vault(&config_path, &["list", "--filter", "RUST.DEV"]);
    assert!(success);
    assert!(stdout.contains("r-rust"));
    assert!(!stdout.contains("Home Cooking"));

    let (stdout, _, _) = run_vault(&config_path, &["list", "--filter", "nothing-matches"]);
    assert!(stdout.contains("No reports match"));
}

#[test]
fn test_reports_are_scoped_per_user() {
    let (_tmp, config_path) = setup_test_env();
    run_vault(&config_path, &["add", &report_path(&config_path, "rust.json")]);

    let (stdout, _, success) = run_vault(&config_path, &["--user", "bob", "list"]);
    assert!(success);
    assert!(stdout.contains("No reports for user 'bob'"));

    let (_, _, success) = run_vault(&config_path, &["--user", "bob", "get", "r-rust"]);
    assert!(!success, "bob must not see alice's report");
}

#[test]
fn test_get_report() {
    let (_tmp, config_path) = setup_test_env();
    run_vault(&config_path, &["add", &report_path(&config_path, "rust.json")]);

    let (stdout, stderr, success) = run_vault(&config_path, &["get", "r-rust"]);
    assert!(success, "get failed: stderr={}", stderr);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["channelName"], "Rust Daily");
    assert_eq!(value["status"], "completed");
}

#[test]
fn test_get_missing_report() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_vault(&config_path, &["get", "nope"]);
    assert!(!success, "get of missing report should fail");
    assert!(stderr.contains("not found"));
}

#[test]
fn test_show_renders_services() {
    let (_tmp, config_path) = setup_test_env();
    run_vault(&config_path, &["add", &report_path(&config_path, "rust.json")]);

    let (stdout, stderr, success) = run_vault(&config_path, &["show", "r-rust"]);
    assert!(success, "show failed: stderr={}", stderr);
    assert!(stdout.starts_with("Rust Daily"));
    assert!(stdout.contains("== PREDICTIVE CTR ANALYSIS =="));
    assert!(stdout.contains("Current CTR Score: 7/10"));
    assert!(stdout.contains("Strong hooks in titles"));
    assert!(stdout.contains("[!!] Assessment: HIGH Risk"));
    assert!(stdout.contains("== CUSTOM_PROBE =="));
}

#[test]
fn test_show_json_views() {
    let (_tmp, config_path) = setup_test_env();
    run_vault(&config_path, &["add", &report_path(&config_path, "rust.json")]);

    let (stdout, _, success) = run_vault(&config_path, &["show", "r-rust", "--json"]);
    assert!(success);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(stdout.contains("predictive_ctr_analysis"));
    assert!(value.is_object());
}

#[test]
fn test_show_without_insights() {
    let (_tmp, config_path) = setup_test_env();
    let (id, _, _) = run_vault(&config_path, &["add", &report_path(&config_path, "cooking.json")]);

    let (stdout, _, success) = run_vault(&config_path, &["show", id.trim()]);
    assert!(success);
    assert!(stdout.contains("No Insights Generated"));
}

#[test]
fn test_export_to_file() {
    let (tmp, config_path) = setup_test_env();
    run_vault(&config_path, &["add", &report_path(&config_path, "rust.json")]);

    let out = tmp.path().join("out").join("rust.txt");
    let (_, stderr, success) = run_vault(
        &config_path,
        &["export", "r-rust", "--output", out.to_str().unwrap()],
    );
    assert!(success, "export failed: stderr={}", stderr);
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("== COPYRIGHT PROTECTION =="));
}

#[test]
fn test_delete_and_clear() {
    let (_tmp, config_path) = setup_test_env();
    run_vault(&config_path, &["add", &report_path(&config_path, "rust.json")]);
    run_vault(&config_path, &["add", &report_path(&config_path, "cooking.json")]);

    let (stdout, _, success) = run_vault(&config_path, &["delete", "r-rust"]);
    assert!(success);
    assert!(stdout.contains("1 report(s) remain"));

    let (_, _, success) = run_vault(&config_path, &["delete", "r-rust"]);
    assert!(success, "deleting an absent id is a no-op");

    let (_, _, success) = run_vault(&config_path, &["clear"]);
    assert!(success);
    let (stdout, _, _) = run_vault(&config_path, &["list"]);
    assert!(stdout.contains("No reports for user 'alice'"));
}

#[test]
fn test_missing_user_errors() {
    let (tmp, _) = setup_test_env();
    let config_path = tmp.path().join("config").join("anon.toml");
    fs::write(
        &config_path,
        format!("[db]\npath = \"{}/data/vault.sqlite\"\n", tmp.path().display()),
    )
    .unwrap();

    let (_, stderr, success) = run_vault(&config_path, &["list"]);
    assert!(!success);
    assert!(stderr.contains("No user identity"));
}

#[tokio::test]
async fn test_legacy_archive_migrates_on_first_use() {
    let (_tmp, config_path) = setup_test_env();
    let cfg = load_config(&config_path).unwrap();

    let kv = SqliteKvStore::open(&cfg).await.unwrap();
    kv.set(LEGACY_KEY, r#"[{"id":"old-1","status":"completed"},{"id":"old-2"}]"#)
        .await
        .unwrap();
    kv.close().await;

    let (stdout, _, success) = run_vault(&config_path, &["legacy", "show"]);
    assert!(success);
    assert!(stdout.contains("old-1"));

    let (stdout, stderr, success) = run_vault(&config_path, &["list"]);
    assert!(success, "list failed: stderr={}", stderr);
    assert!(stderr.contains("Migrated 2 legacy report(s) to user 'alice'"));
    assert!(stdout.contains("old-1"));
    assert!(stdout.contains("old-2"));

    // The second user starts empty: the legacy entry is gone.
    let (stdout, stderr, _) = run_vault(&config_path, &["--user", "bob", "list"]);
    assert!(!stderr.contains("Migrated"));
    assert!(stdout.contains("No reports for user 'bob'"));

    let (_, stderr, success) = run_vault(&config_path, &["legacy", "show"]);
    assert!(success);
    assert!(stderr.contains("No legacy entry."));
}

#[tokio::test]
async fn test_unreadable_legacy_archive_is_kept() {
    let (_tmp, config_path) = setup_test_env();
    let cfg = load_config(&config_path).unwrap();

    let kv = SqliteKvStore::open(&cfg).await.unwrap();
    kv.set(LEGACY_KEY, "{not json").await.unwrap();
    kv.close().await;

    let (stdout, _, success) = run_vault(&config_path, &["list"]);
    assert!(success);
    assert!(stdout.contains("No reports for user 'alice'"));

    let (stdout, _, success) = run_vault(&config_path, &["legacy", "show"]);
    assert!(success);
    assert_eq!(stdout.trim(), "{not json");
}

#[tokio::test]
async fn test_nonconforming_records_survive_a_write() {
    let (_tmp, config_path) = setup_test_env();
    let cfg = load_config(&config_path).unwrap();

    let kv = SqliteKvStore::open(&cfg).await.unwrap();
    kv.set(
        "reports_alice",
        r#"[{"id":"b","status":"processing"},{"id":1700000000000,"status":null},"stray"]"#,
    )
    .await
    .unwrap();
    kv.close().await;

    let (stdout, _, success) = run_vault(&config_path, &["list"]);
    assert!(success);
    assert!(stdout.contains("Reports:     2"));
    assert!(stdout.contains("processing"));
    assert!(stdout.contains("1700000000000"));

    let (_, stderr, success) =
        run_vault(&config_path, &["add", &report_path(&config_path, "rust.json")]);
    assert!(success, "add failed: stderr={}", stderr);

    let kv = SqliteKvStore::open(&cfg).await.unwrap();
    let persisted: serde_json::Value =
        serde_json::from_str(&kv.get("reports_alice").await.unwrap().unwrap()).unwrap();
    kv.close().await;
    assert_eq!(persisted.as_array().unwrap().len(), 4);
    assert_eq!(persisted[0]["id"], "r-rust");
    assert_eq!(persisted[1]["status"], "processing");
    assert_eq!(persisted[3], "stray");
}
