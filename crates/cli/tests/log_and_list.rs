use assert_cmd::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{TempDir, tempdir};

fn setup() -> (TempDir, PathBuf) {
    let tmp = tempdir().unwrap();
    let cfg = tmp.path().join("config.toml");
    let toml = r#"
version = 1

[store]
path = "{{config_dir}}/data/activity.db"

[models]
Post = "posts"
User = "users"
"#;
    fs::write(&cfg, toml).unwrap();
    (tmp, cfg)
}

fn actlog(cfg: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("actlog"));
    cmd.arg("--config").arg(cfg);
    cmd
}

fn stdout_line(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap().trim().to_string()
}

#[test]
fn log_then_list_resolves_subject_and_causer() {
    let (_tmp, cfg) = setup();

    let post = stdout_line(actlog(&cfg).args(["add", "Post", "-f", "title=new title"]));
    let user = stdout_line(actlog(&cfg).args(["add", "User", "-f", "name=test user"]));

    let on = format!("Post:{post}");
    let by = format!("User:{user}");
    let id = stdout_line(actlog(&cfg).args([
        "log", "did X", "--on", on.as_str(), "--by", by.as_str(), "-p", "key=value",
    ]));
    assert!(!id.is_empty());

    let output = actlog(&cfg).args(["list", "--json"]).assert().success().get_output().stdout.clone();
    let listed: Value = serde_json::from_slice(&output).unwrap();
    let first = &listed[0];
    assert_eq!(first["id"], id.as_str());
    assert_eq!(first["description"], "did X");
    assert_eq!(first["log_name"], "default");
    assert_eq!(first["subject"]["document"]["title"], "new title");
    assert_eq!(first["causer"]["document"]["name"], "test user");
    assert_eq!(first["properties"]["key"], "value");
}

#[test]
fn list_filters_by_log_and_shows_table() {
    let (_tmp, cfg) = setup();

    actlog(&cfg).args(["log", "in default"]).assert().success();
    actlog(&cfg).args(["log", "in audit", "--log", "audit"]).assert().success();

    actlog(&cfg)
        .args(["list", "--log", "audit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("in audit"))
        .stdout(predicate::str::contains("in default").not())
        .stdout(predicate::str::contains("-- 1 activities --"));
}

#[test]
fn show_prints_single_activity() {
    let (_tmp, cfg) = setup();
    let id = stdout_line(actlog(&cfg).args(["log", "shown", "-p", "count=3"]));

    actlog(&cfg)
        .args(["show", id.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("description: shown"))
        .stdout(predicate::str::contains("\"count\":3"));

    actlog(&cfg)
        .args(["show", "no-such-id"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no activity with id no-such-id"));
}

#[test]
fn log_rejects_unknown_entity() {
    let (_tmp, cfg) = setup();

    actlog(&cfg)
        .args(["log", "orphan", "--on", "Post:missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no Post with id missing"));

    actlog(&cfg)
        .args(["log", "orphan", "--on", "Comment:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Comment"));
}

#[test]
fn clean_keeps_recent_activities() {
    let (_tmp, cfg) = setup();
    actlog(&cfg).args(["log", "recent"]).assert().success();

    actlog(&cfg)
        .args(["clean", "--days", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 0 activities"));

    actlog(&cfg)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("recent"));
}
