use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::tempdir;

fn jtrig(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jtrig"))
        .args(["--log-level", "warn"])
        .args(args)
        .output()
        .expect("run jtrig")
}

fn path(p: &Path) -> &str {
    p.to_str().expect("utf8 path")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "jtrig failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("json on stdout")
}

#[test]
fn generate_fill_project_and_turn_on() {
    let dir = tempdir().unwrap();
    let events = dir.path().join("events.jsonl");
    let card = dir.path().join("card.yaml");
    let filled = dir.path().join("filled");
    let processed = dir.path().join("processed");
    let curves = dir.path().join("curves");
    let csv = dir.path().join("curves.csv");
    fs::write(&card, "data_type: 0\ncentrality_bin_edges: [-0.75, -0.25]\n").unwrap();

    let output = jtrig(&["generate", "--out", path(&events), "--events", "300", "--seed", "7"]);
    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&events).unwrap().lines().count(), 300);

    let output = jtrig(&[
        "fill",
        "--card",
        path(&card),
        "--input",
        path(&events),
        "--out",
        path(&filled),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let summary: Value =
        serde_json::from_str(&fs::read_to_string(filled.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["filled_sources"], 1);
    assert!(summary["accepted_events"].as_f64().unwrap() > 0.0);
    assert!(filled.join("inclusiveJet.json").is_file());
    assert!(filled.join("JCard.json").is_file());

    let report = stdout_json(&jtrig(&[
        "project",
        "--input",
        path(&filled),
        "--out",
        path(&processed),
    ]));
    assert_eq!(report["last_centrality_bin"], 0);
    assert_eq!(report["events"], summary["accepted_events"]);
    assert!(processed
        .join("inclusiveJet")
        .join("inclusiveJetPt_CaloJet60_C0.json")
        .is_file());

    let report = stdout_json(&jtrig(&[
        "turn-on",
        "--input",
        path(&processed),
        "--out",
        path(&curves),
        "--rebin",
        "0,50,100,200,500",
        "--csv",
        path(&csv),
    ]));
    assert_eq!(report["curves"].as_array().unwrap().len(), 14);
    assert!(curves
        .join("turnOn")
        .join("leadingJetTriggerTurnOnCaloJet80_C0.json")
        .is_file());
    let table = fs::read_to_string(&csv).unwrap();
    assert!(table.starts_with("curve,low_edge,high_edge,efficiency,error"));
    assert_eq!(table.lines().count(), 1 + 14 * 4);
}

#[test]
fn rebin_accepts_only_existing_edges() {
    let dir = tempdir().unwrap();
    let events = dir.path().join("events.jsonl");
    let card = dir.path().join("card.yaml");
    let filled = dir.path().join("filled");
    let processed = dir.path().join("processed");
    fs::write(&card, "centrality_bin_edges: [-0.75, -0.25]\n").unwrap();
    assert!(jtrig(&["generate", "--out", path(&events), "--events", "50"]).status.success());
    let fill = jtrig(&["fill", "--card", path(&card), "--input", path(&events), "--out", path(&filled)]);
    assert!(fill.status.success());
    let project = jtrig(&["project", "--input", path(&filled), "--out", path(&processed), "--pt-only"]);
    assert!(project.status.success());

    let report = stdout_json(&jtrig(&[
        "rebin",
        "--input",
        path(&processed),
        "--name",
        "inclusiveJet/inclusiveJetPt_C0",
        "--edges",
        "0,50,100,500",
    ]));
    assert_eq!(report["accepted"], true);
    assert_eq!(report["output"], "inclusiveJetPt_C0_rebinned");
    assert!(processed
        .join("inclusiveJet")
        .join("inclusiveJetPt_C0_rebinned.json")
        .is_file());

    let report = stdout_json(&jtrig(&[
        "rebin",
        "--input",
        path(&processed),
        "--name",
        "inclusiveJet/inclusiveJetPt_C0",
        "--edges",
        "0,33,500",
    ]));
    assert_eq!(report["accepted"], false);

    let missing = jtrig(&["rebin", "--input", path(&processed), "--name", "nothing", "--edges", "0,1"]);
    assert!(!missing.status.success());
}

#[test]
fn card_summary_reports_the_hash() {
    let dir = tempdir().unwrap();
    let card = dir.path().join("card.yaml");
    fs::write(&card, "data_type: 1\njet_eta_cut: -1.3\n").unwrap();
    let report = stdout_json(&jtrig(&["card", "--card", path(&card)]));
    assert_eq!(report["data_type"], "PbPb");
    assert_eq!(report["centrality_bins"], 4);
    assert_eq!(report["card"]["jet_eta_cut"], 1.3);
    assert_eq!(report["card_hash"].as_str().unwrap().len(), 64);
}
