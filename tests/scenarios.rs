//! End-to-end relocation scenarios on HTML fixtures, through the library and
//! through the `relocate` binary.

use relocate::score::{explain, score};
use relocate::{
    best_match, learn, locate::locate, path::resolve, rank, relocate, Document, DocumentAccess,
    MatchConfig, MatchError, Weights,
};
use assert_cmd::prelude::*;
use std::process::Command;

const LABEL: &str = "make-everything-ok-button";
const TARGET_PATH: &str = "html/body/div/div/div[2]/a[1]";

fn page(panel_body: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html>
<head><title>Wallet</title></head>
<body>
  <div id="wrapper">
    <div class="panel panel-default">
      <div class="panel-heading"><h3>Actions</h3></div>
      <div class="panel-body">{panel_body}</div>
    </div>
  </div>
</body>
</html>"##
    )
}

const OK_BUTTON: &str = r##"
        <a id="make-everything-ok-button" class="btn btn-success" href="#ok" title="Make-Button"
           rel="next" onclick="javascript:window.okDone(); return false;">
          Make everything OK
        </a>"##;

const BREAK_BUTTON: &str = r##"
        <a class="btn btn-danger" href="#break">Break everything</a>"##;

fn original() -> String {
    page(&format!("{OK_BUTTON}{BREAK_BUTTON}"))
}

fn best_path(variant: &str) -> (String, f64) {
    let fp = learn(original().as_bytes(), LABEL).unwrap();
    let doc = Document::parse(variant);
    let found = best_match(&fp, &doc, &MatchConfig::default()).unwrap();
    (found.path.to_string(), found.score)
}

#[test]
fn exact_clone_scores_one_at_same_path() {
    let source = Document::parse(&original());
    let node = locate(&source, LABEL).unwrap();
    assert_eq!(resolve(&source, node).to_string(), TARGET_PATH);

    let (path, score) = best_path(&original());
    assert_eq!(path, TARGET_PATH);
    assert_eq!(score, 1.0);
}

#[test]
fn evil_twin_loses_to_the_original_node() {
    let decoy = OK_BUTTON;
    let variant = original().replace(
        r#"<div id="wrapper">"#,
        &format!(r#"<div id="wrapper">{decoy}"#),
    );

    let fp = learn(original().as_bytes(), LABEL).unwrap();
    let doc = Document::parse(&variant);
    let config = MatchConfig { limit: 2, ..MatchConfig::default() };
    let ranked = rank(&fp, &doc, &config).unwrap();

    assert_eq!(ranked[0].path.to_string(), TARGET_PATH);
    assert_eq!(ranked[0].score, 1.0);
    assert_eq!(ranked[1].path.to_string(), "html/body/div/a");
    assert!(ranked[1].score <= ranked[0].score);
}

#[test]
fn container_wrapping_only_costs_structure() {
    let variant = page(&format!(
        r#"<div class="wrap"><section>{OK_BUTTON}{BREAK_BUTTON}</section></div>"#
    ));
    let fp = learn(original().as_bytes(), LABEL).unwrap();
    let doc = Document::parse(&variant);
    let weights = Weights::default();

    let found = best_match(&fp, &doc, &MatchConfig::default()).unwrap();
    assert_eq!(found.path.to_string(), "html/body/div/div/div[2]/div/section/a[1]");

    let target = doc.select(&found.path).unwrap();
    let breakdown = explain(&fp, &doc, target, &weights);
    assert_eq!(breakdown.tag, 1.0);
    assert_eq!(breakdown.attributes, 1.0);
    assert_eq!(breakdown.text, 1.0);
    assert!(breakdown.structure < 1.0);

    let heading = doc
        .elements()
        .into_iter()
        .find(|&id| doc.node_name(id) == Some("h3"))
        .unwrap();
    assert!(found.score > score(&fp, &doc, heading, &weights) + 0.3);
}

#[test]
fn mashed_button_is_still_found() {
    // id dropped, rel changed, buttons reordered
    let mashed = r##"
        <a class="btn btn-danger" href="#break">Break everything</a>
        <a class="btn btn-success" href="#ok" title="Make-Button" rel="done"
           onclick="javascript:window.okDone(); return false;">Make everything OK</a>"##;
    let (path, score) = best_path(&page(mashed));
    assert_eq!(path, "html/body/div/div/div[2]/a[2]");
    assert!(score < 1.0);
}

#[test]
fn removing_attributes_never_raises_the_score() {
    let fp = learn(original().as_bytes(), LABEL).unwrap();
    let weights = Weights::default();
    let attrs = [
        r#"id="make-everything-ok-button""#,
        r#"class="btn btn-success""#,
        r##"href="#ok""##,
        r#"title="Make-Button""#,
        r#"rel="next""#,
    ];

    let mut previous = f64::INFINITY;
    for kept in (0..=attrs.len()).rev() {
        let button = format!("<a {}>Make everything OK</a>", attrs[..kept].join(" "));
        let doc = Document::parse(&page(&format!("{button}{BREAK_BUTTON}")));
        let node = doc.select(&TARGET_PATH.parse().unwrap()).unwrap();
        let current = score(&fp, &doc, node, &weights);
        assert!(current <= previous, "score rose from {previous} to {current} with {kept} attributes");
        previous = current;
    }
}

#[test]
fn matching_is_deterministic() {
    let variant = page(BREAK_BUTTON);
    let runs: Vec<(String, f64)> = (0..5).map(|_| best_path(&variant)).collect();
    assert!(runs.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn ambiguous_label_stops_before_matching() {
    let doubled = page(&format!("{OK_BUTTON}{OK_BUTTON}"));
    let err = relocate(doubled.as_bytes(), LABEL, &[original()], &MatchConfig::default()).unwrap_err();
    assert_eq!(err, MatchError::AmbiguousLabel { label: LABEL.to_string(), count: 2 });
}

#[test]
fn paths_are_unique() {
    let doc = Document::parse(&original());
    let mut paths: Vec<String> = doc.elements().into_iter().map(|id| resolve(&doc, id).to_string()).collect();
    let total = paths.len();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), total);
}

// Binary

fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().to_string()
}

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(assert_cmd::cargo_bin!("relocate"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run relocate")
}

#[test]
fn cli_reports_one_line_per_variant() {
    let dir = tempfile::tempdir().unwrap();
    let orig = write(&dir, "origin.html", &original());
    let same = write(&dir, "same.html", &original());
    let wrapped = write(
        &dir,
        "wrapped.html",
        &page(&format!("<div>{OK_BUTTON}{BREAK_BUTTON}</div>")),
    );

    let output = run_cli(&[&orig, &same, &wrapped, LABEL]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], format!("'{TARGET_PATH}' (score=1.0)"));
    assert!(lines[1].starts_with("'html/body/div/div/div[2]/div/a[1]' (score=0."));
}

#[test]
fn cli_defaults_label_when_last_argument_is_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let orig = write(&dir, "origin.html", &original());
    let same = write(&dir, "same.html", &original());

    Command::new(assert_cmd::cargo_bin!("relocate"))
        .args([&orig, &same])
        .assert()
        .success()
        .stdout(format!("'{TARGET_PATH}' (score=1.0)\n"));
}

#[test]
fn cli_fails_on_unknown_label() {
    let dir = tempfile::tempdir().unwrap();
    let orig = write(&dir, "origin.html", &original());
    let same = write(&dir, "same.html", &original());

    let output = run_cli(&[&orig, &same, "no-such-label"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no-such-label"));
}

#[test]
fn cli_skip_policy_continues_past_empty_variant() {
    let dir = tempfile::tempdir().unwrap();
    let orig = write(&dir, "origin.html", &original());
    let empty = write(&dir, "empty.html", "<!-- nothing -->");
    let same = write(&dir, "same.html", &original());

    let aborted = run_cli(&[&orig, &empty, &same, LABEL]);
    assert!(!aborted.status.success());

    let skipped = run_cli(&["--on-error", "skip", &orig, &empty, &same, LABEL]);
    assert!(skipped.status.success());
    let stdout = String::from_utf8(skipped.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
}

#[test]
fn cli_missing_variant_reports_the_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let orig = write(&dir, "origin.html", &original());
    let same = write(&dir, "same.html", &original());
    let missing = dir.path().join("missing.html").to_string_lossy().to_string();

    let aborted = run_cli(&[&orig, &missing, &same, LABEL]);
    assert!(!aborted.status.success());
    assert!(aborted.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&aborted.stderr);
    assert!(stderr.contains("failed to read"), "stderr: {stderr}");
    assert!(stderr.contains("missing.html"), "stderr: {stderr}");

    let skipped = run_cli(&["--on-error", "skip", &orig, &missing, &same, LABEL]);
    assert!(skipped.status.success());
    let stdout = String::from_utf8(skipped.stdout).unwrap();
    assert_eq!(stdout, format!("'{TARGET_PATH}' (score=1.0)\n"));
    let stderr = String::from_utf8_lossy(&skipped.stderr);
    assert!(stderr.contains("failed to read"), "stderr: {stderr}");
    assert!(!stderr.contains("no elements"), "stderr: {stderr}");
}

#[test]
fn cli_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let orig = write(&dir, "origin.html", &original());
    let same = write(&dir, "same.html", &original());

    let output = run_cli(&["--format", "json", "--explain", &orig, &same, LABEL]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["path"], TARGET_PATH);
    assert_eq!(value["score"], 1.0);
    assert_eq!(value["breakdown"]["structure"], 1.0);
}
