use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn scan_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tracklens-cli").unwrap();
    cmd.current_dir(dir)
        .env("TRACKLENS_COLLECTOR_PROVIDER", "noop")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn scan_collects_every_url_in_the_list() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(
        temp.path().join("urls.txt"),
        "https://a.example\nhttps://b.example\n",
    )
    .unwrap();

    scan_cmd(temp.path())
        .args(["scan", "urls.txt", "--out-dir", "outputs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scanning https://a.example (1/2)"))
        .stdout(predicate::str::contains("All URLs were successfully scanned!"));

    for host in ["a.example", "b.example"] {
        let inspection = temp.path().join("outputs").join(host).join("inspection.json");
        let raw = fs::read_to_string(&inspection).unwrap();
        let record: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(record["host"], host);
    }
}

#[test]
fn failed_urls_are_tallied_without_aborting_the_scan() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(
        temp.path().join("urls.txt"),
        "https://a.example\nnot-a-url\n",
    )
    .unwrap();

    scan_cmd(temp.path())
        .args(["scan", "urls.txt", "--out-dir", "outputs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 out of 2 URLs failed"))
        .stdout(predicate::str::contains("not-a-url"));

    assert!(temp
        .path()
        .join("outputs")
        .join("a.example")
        .join("inspection.json")
        .exists());
}

#[test]
fn empty_url_list_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("urls.txt"), "\n\n").unwrap();

    scan_cmd(temp.path())
        .args(["scan", "urls.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no URLs found"));
}

#[test]
fn missing_url_list_is_an_error() {
    let temp = tempfile::tempdir().unwrap();

    scan_cmd(temp.path())
        .args(["scan", "urls.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not read URL list"));
}
