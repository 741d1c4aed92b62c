use clap::Parser;
use pretty_assertions::assert_eq;
use std::io::Write;
use steady_cli::cli::{Cli, Commands, LogFormat, ReportFormat};
use tempfile::NamedTempFile;

const SNAPSHOT: &str = r#"
services:
  - name: svc.db
    state: FAILED
    failure:
      message: connection refused
  - name: svc.app
    dependencies: [svc.db]
  - name: svc.api
    dependencies: [svc.cfg]
  - name: svc.web
    state: UP
  - name: deployment.subunit.app1.INSTALL
    state: FAILED
    failure:
      message: unsatisfied
    dependencies: [deployment.subunit.app2.deploymentCompleteService]
"#;

fn snapshot_file(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn run(args: &[&str]) -> (bool, String) {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    let problems = steady_cli::run(&cli, &mut out).unwrap();
    (problems, String::from_utf8(out).unwrap())
}

#[test]
fn parses_global_options() {
    let cli = Cli::try_parse_from([
        "steady",
        "--log-level",
        "debug",
        "--log-format",
        "json",
        "verify",
        "snap.yaml",
        "--touched",
        "svc.a",
        "--touched",
        "svc.b",
        "--format",
        "yaml",
        "--no-rollback",
    ])
    .unwrap();
    assert_eq!(cli.log_level, "debug");
    assert_eq!(cli.log_format, LogFormat::Json);
    let Commands::Verify(args) = cli.command else {
        panic!("expected verify");
    };
    assert_eq!(args.touched.len(), 2);
    assert_eq!(args.format, ReportFormat::Yaml);
    assert!(args.no_rollback);
}

#[test]
fn rejects_malformed_service_name() {
    assert!(Cli::try_parse_from(["steady", "verify", "snap.yaml", "--touched", "svc..a"]).is_err());
}

#[test]
fn verify_prints_text_report() {
    let file = snapshot_file(SNAPSHOT, ".yaml");
    let path = file.path().to_str().unwrap();
    let (problems, out) = run(&["steady", "verify", path, "--touched", "svc.api", "--touched", "svc.web"]);

    assert!(problems);
    assert_eq!(
        out,
        "missing-required-services: [svc.cfg]\n\
         services-missing-dependencies:\n  svc.api is missing [svc.cfg]\n\
         rollback: required\n"
    );
}

#[test]
fn verify_stable_subset() {
    let file = snapshot_file(SNAPSHOT, ".yaml");
    let path = file.path().to_str().unwrap();
    let (problems, out) = run(&["steady", "verify", path, "--touched", "svc.web"]);
    assert!(!problems);
    assert_eq!(out, "stable\n");
}

#[test]
fn verify_json_covers_every_service_by_default() {
    let file = snapshot_file(SNAPSHOT, ".yaml");
    let path = file.path().to_str().unwrap();
    let (problems, out) = run(&["steady", "verify", path, "--format", "json", "--no-rollback"]);
    assert!(problems);

    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["failed-services"]["svc.db"], "connection refused");
    assert_eq!(
        value["missing-required-services"],
        serde_json::json!([
            "svc.db",
            "deployment.subunit.app1.INSTALL",
            "svc.cfg"
        ])
    );
    assert!(value.get("missing-transitive-dependency-problem").is_none());
}

#[test]
fn verify_reads_json_snapshots() {
    let json = r#"{"services":[{"name":"svc.a","dependencies":["svc.gone"]}]}"#;
    let file = snapshot_file(json, ".json");
    let path = file.path().to_str().unwrap();
    let (problems, out) = run(&["steady", "verify", path, "--format", "yaml"]);
    assert!(problems);
    assert!(out.contains("svc.a is missing [svc.gone]"));
}

#[test]
fn units_reports_missing_sibling() {
    let file = snapshot_file(SNAPSHOT, ".yaml");
    let path = file.path().to_str().unwrap();
    let (problems, out) = run(&["steady", "units", path, "--unit", "deployment.subunit.app1"]);
    assert!(problems);
    assert_eq!(
        out,
        "Deployment of [app1 (FAILED)] failed due to unsatisfied dependency on [app2 (MISSING)]\n"
    );
}

#[test]
fn units_unknown_unit_fails() {
    let file = snapshot_file(SNAPSHOT, ".yaml");
    let path = file.path().to_str().unwrap();
    let cli = Cli::try_parse_from(["steady", "units", path, "--unit", "deployment.subunit.ghost"]).unwrap();
    let err = steady_cli::run(&cli, &mut Vec::new()).unwrap_err();
    assert!(err.to_string().contains("unknown unit"));
}

#[test]
fn missing_snapshot_file_fails() {
    let cli = Cli::try_parse_from(["steady", "verify", "/nonexistent/snap.yaml"]).unwrap();
    let err = steady_cli::run(&cli, &mut Vec::new()).unwrap_err();
    assert!(format!("{err:#}").contains("failed to load snapshot"));
}
