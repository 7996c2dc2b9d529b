use assert_cmd::cargo::cargo_bin_cmd;

fn fixture(path: &str) -> String {
    format!("{}/tests/fixtures/{path}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn help_lists_subcommands() {
    let mut cmd = cargo_bin_cmd!("rewind");
    cmd.arg("--help");
    let out = cmd.assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).expect("utf8");

    assert!(stdout.contains("list"));
    assert!(stdout.contains("show"));
    assert!(stdout.contains("summary"));
    assert!(stdout.contains("--recording"));
}

#[test]
fn list_reads_recording_named_in_config() {
    let mut cmd = cargo_bin_cmd!("rewind");
    cmd.arg("--config")
        .arg(fixture("configs/minimal.toml"))
        .arg("--directory")
        .arg(fixture("recordings"))
        .arg("list");
    let out = cmd.assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).expect("utf8");

    assert_eq!(stdout.lines().count(), 3);
    assert!(stdout.contains("AddAmount (typed)"));
}

#[test]
fn show_prints_canonical_json() {
    let mut cmd = cargo_bin_cmd!("rewind");
    cmd.arg("--directory")
        .arg(fixture("recordings"))
        .arg("--recording")
        .arg("counter.json")
        .arg("show")
        .arg("1");
    let out = cmd.assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).expect("utf8");
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("json");

    assert_eq!(value["type"], "INCREMENT");
    assert_eq!(value["payload"], "ReSwift_Null");
    assert_eq!(value["isTypedAction"], false);
}

#[test]
fn summary_of_missing_recording_reports_zero_entries() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut cmd = cargo_bin_cmd!("rewind");
    cmd.arg("--directory").arg(temp.path()).arg("summary");
    let out = cmd.assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).expect("utf8");
    assert!(stdout.contains("entries: 0"));
}

#[test]
fn show_past_the_end_exits_nonzero() {
    let mut cmd = cargo_bin_cmd!("rewind");
    cmd.arg("--directory")
        .arg(fixture("recordings"))
        .arg("--recording")
        .arg("counter.json")
        .arg("show")
        .arg("9");
    cmd.assert().failure();
}

#[test]
fn invalid_config_exits_nonzero() {
    let mut cmd = cargo_bin_cmd!("rewind");
    cmd.arg("--config")
        .arg(fixture("configs/bad-file-name.toml"))
        .arg("list");
    cmd.assert().failure();

    let mut missing = cargo_bin_cmd!("rewind");
    missing
        .arg("--config")
        .arg(fixture("configs/missing.toml"))
        .arg("list");
    missing.assert().failure();
}
