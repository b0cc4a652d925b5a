use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde_json::{json, Value};
use tempfile::TempDir;

fn zines_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_zines"))
}

fn sample_store() -> Value {
    json!({
        "database_info": { "total_entries": 5, "schema_version": "2.0" },
        "zines": [
            {
                "id": "IA1",
                "zine_name": "Sniffin' Glue #3",
                "source_type": "internet_archive",
                "archive_source": "https://archive.org/details/sniffinglue3",
                "ia_metadata": { "identifier": "sniffinglue3", "mediatype": "texts" },
                "image_url": "https://archive.org/services/img/sniffinglue3"
            },
            {
                "id": "OA1",
                "zine_name": "Sniffin' Glue #3",
                "source_type": "other_archive",
                "archive_source": "https://archive.org/details/sniffinglue3?utm_source=feed",
                "image_url": null
            },
            {
                "id": "NZ1",
                "zine_name": "Concert poster, 1979",
                "source_type": "flickr",
                "archive_source": "https://www.flickr.com/photos/x/1"
            },
            {
                "id": "FL1",
                "zine_name": "Flipside #12",
                "source_type": "flickr",
                "archive_source": "https://www.flickr.com/photos/x/2",
                "creators": ["Al Flipside"]
            },
            {
                "id": "CB1",
                "zine_name": "Cometbus",
                "source_type": "iiif",
                "archive_source": "https://iiif.example.org/manifest/cb1"
            }
        ]
    })
}

fn setup_test_env(store: &Value) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();

    fs::write(
        data_dir.join("punk_zines_database.json"),
        serde_json::to_vec_pretty(store).unwrap(),
    )
    .unwrap();

    let config_content = format!(
        r#"[store]
path = "{root}/data/punk_zines_database.json"
backup_dir = "{root}/backups"
"#,
        root = root.display()
    );
    let config_path = config_dir.join("zines.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn store_path(tmp: &TempDir) -> PathBuf {
    tmp.path().join("data").join("punk_zines_database.json")
}

fn backup_files(tmp: &TempDir) -> Vec<String> {
    let dir = tmp.path().join("backups");
    if !dir.exists() {
        return Vec::new();
    }
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

fn run_zines(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    run_zines_with_input(config_path, args, None)
}

fn run_zines_with_input(
    config_path: &Path,
    args: &[&str],
    input: Option<&str>,
) -> (String, String, bool) {
    let binary = zines_binary();
    let mut child = Command::new(&binary)
        .arg("--config")
        .arg(config_path)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap_or_else(|e| panic!("Failed to run zines binary at {:?}: {}", binary, e));

    {
        let mut stdin = child.stdin.take().unwrap();
        if let Some(text) = input {
            stdin.write_all(text.as_bytes()).unwrap();
        }
    }

    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn read_store(tmp: &TempDir) -> Value {
    serde_json::from_slice(&fs::read(store_path(tmp)).unwrap()).unwrap()
}

fn store_ids(store: &Value) -> Vec<String> {
    let mut ids: Vec<String> = store["zines"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect();
    ids.sort();
    ids
}

#[test]
fn test_analyze_reports_plan() {
    let (tmp, config_path) = setup_test_env(&sample_store());
    let before = fs::read(store_path(&tmp)).unwrap();

    let (stdout, stderr, success) = run_zines(&config_path, &["analyze"]);
    assert!(success, "analyze failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("=== ANALYSIS ==="));
    assert!(stdout.contains("NZ1"));

    assert_eq!(fs::read(store_path(&tmp)).unwrap(), before);
    assert!(backup_files(&tmp).is_empty());
}

#[test]
fn test_analyze_json_summary() {
    let (_tmp, config_path) = setup_test_env(&sample_store());

    let (stdout, stderr, success) = run_zines(&config_path, &["analyze", "--json"]);
    assert!(success, "analyze failed: stderr={}", stderr);
    let summary: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["total"], json!(5));
    assert_eq!(summary["probable_zines"], json!(4));
    assert_eq!(summary["non_zines"], json!(1));
    assert_eq!(summary["duplicate_groups"], json!(1));
    assert_eq!(summary["duplicates"], json!(1));
    assert_eq!(summary["removed"], json!(2));
    assert_eq!(summary["remaining"], json!(3));
    assert!(summary["key_matches"]["url"].as_u64().unwrap() >= 1);
}

#[test]
fn test_apply_yes_cleans_store() {
    let (tmp, config_path) = setup_test_env(&sample_store());
    let original = fs::read(store_path(&tmp)).unwrap();

    let (stdout, stderr, success) = run_zines(&config_path, &["apply", "--yes"]);
    assert!(success, "apply failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("=== CLEANUP COMPLETE ==="));

    let store = read_store(&tmp);
    assert_eq!(store_ids(&store), vec!["CB1", "FL1", "IA1"]);
    assert_eq!(store["database_info"]["total_entries"], json!(3));
    assert_eq!(store["database_info"]["schema_version"], json!("2.0"));
    assert!(store["database_info"]["last_updated"].is_string());

    let fl1 = store["zines"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["id"] == "FL1")
        .unwrap();
    assert_eq!(fl1["creators"], json!(["Al Flipside"]));

    let files = backup_files(&tmp);
    assert_eq!(files.len(), 2, "expected backup + audit log, got {:?}", files);
    let backup = files
        .iter()
        .find(|f| f.starts_with("punk_zines_database_backup_"))
        .unwrap();
    assert_eq!(fs::read(tmp.path().join("backups").join(backup)).unwrap(), original);

    let audit_name = files.iter().find(|f| f.starts_with("cleanup_removed_")).unwrap();
    let audit: Value =
        serde_json::from_slice(&fs::read(tmp.path().join("backups").join(audit_name)).unwrap())
            .unwrap();
    assert_eq!(audit["store_written"], json!(true));
    let reasons: Vec<(String, String)> = audit["removed"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["record"]["id"].as_str().unwrap().to_string(),
                e["reason"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        reasons,
        vec![
            ("NZ1".to_string(), "non_zine".to_string()),
            ("OA1".to_string(), "duplicate_of:IA1".to_string()),
        ]
    );
}

#[test]
fn test_apply_idempotent() {
    let (tmp, config_path) = setup_test_env(&sample_store());

    let (_, _, success1) = run_zines(&config_path, &["apply", "--yes"]);
    assert!(success1, "First apply failed");
    let after_first = fs::read(store_path(&tmp)).unwrap();
    let files_after_first = backup_files(&tmp);

    let (stdout, stderr, success2) = run_zines(&config_path, &["apply", "--yes"]);
    assert!(success2, "Second apply failed: stderr={}", stderr);
    assert!(stdout.contains("Nothing to remove."));
    assert_eq!(fs::read(store_path(&tmp)).unwrap(), after_first);
    assert_eq!(backup_files(&tmp), files_after_first);
}

#[test]
fn test_apply_declined_leaves_store() {
    let (tmp, config_path) = setup_test_env(&sample_store());
    let before = fs::read(store_path(&tmp)).unwrap();

    let (stdout, stderr, success) =
        run_zines_with_input(&config_path, &["apply"], Some("no\n"));
    assert!(success, "apply failed: stderr={}", stderr);
    assert!(stdout.contains("Cancelled."));
    assert_eq!(fs::read(store_path(&tmp)).unwrap(), before);
    assert!(backup_files(&tmp).is_empty());
}

#[test]
fn test_apply_closed_stdin_declines() {
    let (tmp, config_path) = setup_test_env(&sample_store());
    let before = fs::read(store_path(&tmp)).unwrap();

    let (stdout, _, success) = run_zines_with_input(&config_path, &["apply"], None);
    assert!(success);
    assert!(stdout.contains("Cancelled."));
    assert_eq!(fs::read(store_path(&tmp)).unwrap(), before);
}

#[test]
fn test_apply_confirmed_interactively() {
    let (tmp, config_path) = setup_test_env(&sample_store());

    let (_, stderr, success) = run_zines_with_input(&config_path, &["apply"], Some("yes\n"));
    assert!(success, "apply failed: stderr={}", stderr);
    assert_eq!(store_ids(&read_store(&tmp)), vec!["CB1", "FL1", "IA1"]);
}

#[test]
fn test_missing_store_fails() {
    let (tmp, config_path) = setup_test_env(&sample_store());
    fs::remove_file(store_path(&tmp)).unwrap();

    let (_, stderr, success) = run_zines(&config_path, &["apply", "--yes"]);
    assert!(!success);
    assert!(stderr.contains("not found"), "stderr={}", stderr);
    assert!(backup_files(&tmp).is_empty());
}

#[test]
fn test_malformed_store_fails_without_backup() {
    let (tmp, config_path) = setup_test_env(&sample_store());
    fs::write(store_path(&tmp), b"{ \"zines\": [ { \"id\": ").unwrap();

    let (_, _, success) = run_zines(&config_path, &["apply", "--yes"]);
    assert!(!success);
    assert!(backup_files(&tmp).is_empty());
}

#[test]
fn test_store_flag_overrides_config() {
    let (tmp, config_path) = setup_test_env(&sample_store());
    let other = tmp.path().join("other.json");
    fs::write(
        &other,
        serde_json::to_vec(&json!({ "zines": [ { "id": "X", "zine_name": "Cometbus" } ] })).unwrap(),
    )
    .unwrap();

    let (stdout, stderr, success) = run_zines(
        &config_path,
        &["analyze", "--json", "--store", other.to_str().unwrap()],
    );
    assert!(success, "analyze failed: stderr={}", stderr);
    let summary: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["total"], json!(1));
}

#[test]
fn test_remove_by_ids() {
    let (tmp, config_path) = setup_test_env(&sample_store());

    let (stdout, stderr, success) =
        run_zines(&config_path, &["remove", "--ids", "FL1,CB1", "--yes"]);
    assert!(success, "remove failed: stdout={}, stderr={}", stdout, stderr);
    assert_eq!(store_ids(&read_store(&tmp)), vec!["IA1", "NZ1", "OA1"]);
    assert_eq!(read_store(&tmp)["database_info"]["total_entries"], json!(3));
    assert!(backup_files(&tmp)
        .iter()
        .any(|f| f.starts_with("manual_removed_")));
}

#[test]
fn test_remove_dry_run_writes_nothing() {
    let (tmp, config_path) = setup_test_env(&sample_store());
    let rules = tmp.path().join("removals.txt");
    fs::write(&rules, "# drop flickr\nurl~flickr.com\n").unwrap();
    let before = fs::read(store_path(&tmp)).unwrap();

    let (stdout, _, success) = run_zines(
        &config_path,
        &["remove", "--file", rules.to_str().unwrap(), "--dry-run"],
    );
    assert!(success);
    assert!(stdout.contains("Would remove 2 entries"));
    assert_eq!(fs::read(store_path(&tmp)).unwrap(), before);
    assert!(backup_files(&tmp).is_empty());
}

#[test]
fn test_remove_without_rules_fails() {
    let (_tmp, config_path) = setup_test_env(&sample_store());
    let (_, _, success) = run_zines(&config_path, &["remove", "--yes"]);
    assert!(!success);
}

#[test]
fn test_stats() {
    let (_tmp, config_path) = setup_test_env(&sample_store());
    let (stdout, stderr, success) = run_zines(&config_path, &["stats"]);
    assert!(success, "stats failed: stderr={}", stderr);
    assert!(stdout.contains("Records:        5"));
    assert!(stdout.contains("flickr"));
}

#[test]
fn test_explain_record() {
    let (_tmp, config_path) = setup_test_env(&sample_store());
    let (stdout, stderr, success) = run_zines(&config_path, &["explain", "NZ1"]);
    assert!(success, "explain failed: stderr={}", stderr);
    assert!(stdout.contains("non-zine"));
    assert!(stdout.contains("negative-evidence"));
    assert!(stdout.contains("'poster'"));

    let (_, _, found) = run_zines(&config_path, &["explain", "NOPE"]);
    assert!(!found);
}
