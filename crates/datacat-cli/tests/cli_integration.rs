use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;

mod helpers;
use helpers::*;

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn help_works() {
    let dir = workspace();
    datacat(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rule-driven data catalog toolkit"));
}

#[test]
fn rules_check_does_not_touch_the_store() {
    let dir = workspace();
    datacat(dir.path())
        .args(["rules", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8 rules are valid"))
        .stdout(predicate::str::contains("organization, dataset"));
    assert!(!dir.path().join("store").exists());
}

#[test]
fn import_before_rules_fails() {
    let dir = workspace();
    datacat(dir.path())
        .args(["import", "--model", "dataset"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no rules"));
}

#[test]
fn step_by_step_import_then_export() {
    let dir = workspace();
    let root = dir.path();
    datacat(root).arg("rules").assert().success();
    datacat(root)
        .arg("references")
        .assert()
        .success()
        .stdout(predicate::str::contains("ref_theme: 2 rows (1 back-filled)"));
    datacat(root)
        .args(["import", "--model", "organization"])
        .assert()
        .success();

    let output = datacat(root)
        .args(["--format", "json", "import", "--model", "dataset", "--lang", "fr"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let summary = stdout_json(&output);
    assert_eq!(summary["documents"], 2);
    assert_eq!(summary["unresolved"], 0);
    assert_eq!(summary["mode"], "replace");

    datacat(root)
        .args(["export", "--model", "dataset", "--lang", "en"])
        .assert()
        .success();
    let csv = std::fs::read_to_string(root.join("export/datasets_en.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Title,Theme,Organizations,Open,Quality comment"));
    let first = lines.next().unwrap();
    assert!(first.contains("Air|Water"), "{first}");
    assert!(first.contains("Ministère"), "{first}");
    let second = lines.next().unwrap();
    assert!(second.contains(",NA,"), "{second}");
}

#[test]
fn init_runs_the_whole_pipeline() {
    let dir = workspace();
    let root = dir.path();
    let output = datacat(root)
        .args(["--format", "json", "init", "--index", "--dry-run", "--codegen"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let summary = stdout_json(&output);
    assert_eq!(summary["imports"].as_array().unwrap().len(), 2);
    assert_eq!(summary["comments"][0]["comments"], 1);
    assert_eq!(summary["index"]["dry_run"], true);
    assert_eq!(summary["index"]["reports"].as_array().unwrap().len(), 4);
    assert!(root.join("api/main.rs").is_file());
    assert!(root.join("api/dataset/schema.json").is_file());

    datacat(root)
        .arg("collections")
        .assert()
        .success()
        .stdout(predicate::str::contains("datasets\t2"))
        .stdout(predicate::str::contains("ref_theme\t2"))
        .stdout(predicate::str::contains("users\t1"));
}

#[test]
fn template_uses_labels_of_the_language() {
    let dir = workspace();
    let root = dir.path();
    datacat(root).arg("rules").assert().success();
    datacat(root)
        .args(["template", "--model", "dataset", "--lang", "en", "--out-dir", "templates"])
        .assert()
        .success();
    let text = std::fs::read_to_string(root.join("templates/template-dataset_en.csv")).unwrap();
    assert_eq!(text.trim_end(), "Title,Theme,Organizations,Open,Quality comment");
}

#[test]
fn unknown_language_is_rejected() {
    let dir = workspace();
    datacat(dir.path())
        .args(["export", "--model", "dataset", "--lang", "de"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown language"));
}

#[test]
fn schema_dumps_report_schemas() {
    let dir = workspace();
    datacat(dir.path()).arg("schema").assert().success();
    let schemas = dir.path().join("schemas");
    assert!(schemas.join("import_summary.schema.json").is_file());
    assert!(schemas.join("init_summary.schema.json").is_file());
}

#[test]
fn index_without_url_needs_dry_run() {
    let dir = workspace();
    let root = dir.path();
    datacat(root).arg("rules").assert().success();
    datacat(root)
        .arg("index")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--dry-run"));
    datacat(root)
        .args(["index", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dataset_fr: 0/0 documents indexed"));
}
