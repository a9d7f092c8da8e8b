use std::fs;

use clap::Parser;
use serde_json::Value;
use umbra::cli::{run, Cli};

fn run_args(args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(std::iter::once("umbra").chain(args.iter().copied()))?;
    let mut out = Vec::new();
    run(&cli, &mut out)?;
    Ok(String::from_utf8(out)?)
}

fn run_json(args: &[&str]) -> Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let output = run_args(&full).unwrap();
    serde_json::from_str(&output).unwrap()
}

#[test]
fn color_reports_components() {
    let report = run_json(&["color", "#ffffff"]);
    assert_eq!(report["hex"], "#ffffff");
    assert_eq!(report["inverted"], "#000000");
    assert_eq!(report["hue"], Value::Null);
    let luminance = report["luminance"].as_f64().unwrap();
    assert!((luminance - 1.0).abs() < 1e-6);
}

#[test]
fn color_text_output() {
    let output = run_args(&["color", "rgb(0, 0, 0)"]).unwrap();
    assert!(output.starts_with("#000000\n"));
    assert!(output.contains("inverted   #ffffff"));
}

#[test]
fn invalid_color_is_an_error() {
    assert!(run_args(&["color", "not-a-color"]).is_err());
}

#[test]
fn contrast_of_black_on_white() {
    let report = run_json(&["contrast", "#000000", "#ffffff"]);
    let ratio = report["ratio"].as_f64().unwrap();
    assert!((ratio - 21.0).abs() < 1e-6);
    assert_eq!(report["passes"], true);
    assert_eq!(report["adjusted"], "#000000");
}

#[test]
fn contrast_below_target_is_adjusted() {
    let report = run_json(&["contrast", "#444444", "#000000"]);
    assert_eq!(report["passes"], false);
    let ratio = report["ratio"].as_f64().unwrap();
    let adjusted = report["adjusted_ratio"].as_f64().unwrap();
    assert!(adjusted > ratio);

    let text = run_args(&["contrast", "#444444", "#000000"]).unwrap();
    assert!(text.contains("below 4.5"));
    assert!(text.contains("adjusted: "));
}

#[test]
fn contrast_target_is_validated() {
    assert!(run_args(&["contrast", "#000", "#fff", "--target", "30"]).is_err());
}

#[test]
fn vars_from_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vars.yaml");
    fs::write(
        &path,
        "--bg: \"#ffffff\"\n--fg: \"#000000\"\n--radius: 4px\n",
    )
    .unwrap();
    let path = path.to_str().unwrap();

    let text = run_args(&["vars", path]).unwrap();
    assert_eq!(
        text,
        "--bg: #000000 !important;\n--fg: #ffffff !important;\n"
    );

    let json = run_json(&["vars", path]);
    let overrides = json.as_array().unwrap();
    assert_eq!(overrides.len(), 2);
    assert_eq!(overrides[0]["name"], "--bg");

    let block = run_args(&["vars", path, "--block"]).unwrap();
    assert!(block.starts_with("html.umbra-dark, body.umbra-dark {\n"));
    assert!(block.contains("  --fg: #ffffff !important;\n"));
}

#[test]
fn vars_block_under_json_is_a_string() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vars.yaml");
    fs::write(&path, "--bg: \"#ffffff\"\n").unwrap();
    let path = path.to_str().unwrap();

    let block = run_args(&["vars", path, "--block"]).unwrap();
    let json = run_json(&["vars", path, "--block"]);
    assert_eq!(json.as_str(), Some(block.as_str()));
}

#[test]
fn vars_extension_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("VARS.YML");
    fs::write(&path, "--fg: \"#000000\"\n").unwrap();

    let text = run_args(&["vars", path.to_str().unwrap()]).unwrap();
    assert_eq!(text, "--fg: #ffffff !important;\n");
}

#[test]
fn page_fixture_extension_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.YAML");
    fs::write(&path, PAGE).unwrap();

    let report = run_json(&["page", path.to_str().unwrap()]);
    assert_eq!(report["activation"]["backgrounds"], 1);
}

#[test]
fn vars_rejects_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vars.txt");
    fs::write(&path, "--bg: white").unwrap();
    assert!(run_args(&["vars", path.to_str().unwrap()]).is_err());
}

const PAGE: &str = r##"
body:
  children:
    - tag: p
      text: Hello
      size: { width: 300, height: 40 }
      computed:
        background-color: "#ffffff"
        color: "#000000"
"##;

#[test]
fn page_activates_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.yaml");
    fs::write(&path, PAGE).unwrap();
    let path = path.to_str().unwrap();

    let report = run_json(&["page", path]);
    assert_eq!(report["activation"]["visited"], 2);
    assert_eq!(report["activation"]["backgrounds"], 1);
    assert!(report.get("restore").is_none());
    let p = &report["page"]["body"]["children"][0];
    assert_eq!(
        p["attributes"]["style"],
        "background-color: #000000 !important; color: #ffffff !important;"
    );
    assert_eq!(report["page"]["adopted_stylesheets"].as_array().unwrap().len(), 1);

    let text = run_args(&["page", path]).unwrap();
    assert!(text.starts_with("activated: 2 elements, 1 backgrounds"));
}

#[test]
fn page_deactivate_restores_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.yaml");
    fs::write(&path, PAGE).unwrap();

    let report = run_json(&["page", path.to_str().unwrap(), "--deactivate"]);
    assert_eq!(report["restore"]["restored"], 2);
    let p = &report["page"]["body"]["children"][0];
    assert!(p.get("attributes").is_none());
    assert!(report["page"]["adopted_stylesheets"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[test]
fn config_file_changes_the_activation_class() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("umbra.yaml");
    fs::write(
        &config,
        "activation_class: night\nroot_selector: html.night\n",
    )
    .unwrap();
    let page = dir.path().join("page.yaml");
    fs::write(&page, PAGE).unwrap();

    let report = run_json(&[
        "--config",
        config.to_str().unwrap(),
        "page",
        page.to_str().unwrap(),
    ]);
    assert_eq!(report["page"]["body"]["attributes"]["class"], "night");
    let css = report["page"]["adopted_stylesheets"][0].as_str().unwrap();
    assert!(css.starts_with("html.night, body.night {"));
}

#[test]
fn bad_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("umbra.yaml");
    fs::write(&config, "no_such_key: 1\n").unwrap();

    let err = run_args(&["-c", config.to_str().unwrap(), "color", "#fff"]).unwrap_err();
    assert!(err.to_string().contains("loading config"));
}
