//! Tests for command-line argument parsing and the replay binary
//!
//! Parser tests build a command with the same structure as the main
//! application. Replay tests run the compiled binary on temporary recordings.


use clap::{Arg, ArgAction, Command as ClapCommand};
use std::io::Write;
use std::process::Command;
use surya_namaskar_coach::replay::FrameRecord;
use tempfile::TempDir;
use test_helpers::{record, standing};

/// Create a command with the same argument structure as the main binary
fn create_test_command() -> ClapCommand {
    ClapCommand::new("surya-namaskar-coach")
        .version("0.1.0")
        .about("Suryanamaskara pose sequencing and correction feedback")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('C')
                .long("config")
                .value_name("PATH")
                .global(true)
                .help("Configuration file path"),
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Enable debug output"),
        )
        .subcommand(
            ClapCommand::new("replay")
                .arg(Arg::new("recording").required(true))
                .arg(Arg::new("references").short('r').long("references"))
                .arg(Arg::new("learn").short('l').long("learn"))
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue)),
        )
        .subcommand(ClapCommand::new("poses").arg(Arg::new("verbose").short('v').long("verbose").action(ArgAction::SetTrue)))
        .subcommand(
            ClapCommand::new("init-config")
                .arg(Arg::new("output").default_value("coach.yaml"))
                .arg(Arg::new("force").short('f').long("force").action(ArgAction::SetTrue)),
        )
        .subcommand(
            ClapCommand::new("build-references")
                .arg(Arg::new("output").short('o').long("output").required(true))
                .arg(Arg::new("recordings").required(true).num_args(1..)),
        )
}

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_surya-namaskar-coach"))
}

fn write_recording(dir: &TempDir, name: &str, records: &[FrameRecord]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    for r in records {
        writeln!(file, "{}", serde_json::to_string(r).unwrap()).unwrap();
    }
    path
}

#[test]
fn test_help_argument() {
    let cmd = create_test_command();
    let result = cmd.try_get_matches_from(vec!["surya-namaskar-coach", "--help"]);

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().kind(), clap::error::ErrorKind::DisplayHelp);
}

#[test]
fn test_subcommand_required() {
    let cmd = create_test_command();
    assert!(cmd.try_get_matches_from(vec!["surya-namaskar-coach"]).is_err());
}

#[test]
fn test_replay_arguments() {
    let cmd = create_test_command();
    let matches = cmd
        .try_get_matches_from(vec![
            "surya-namaskar-coach",
            "--debug",
            "replay",
            "session.jsonl",
            "--learn",
            "bhujangasana",
            "--json",
        ])
        .unwrap();
    assert!(matches.get_flag("debug"));
    let (name, sub) = matches.subcommand().unwrap();
    assert_eq!(name, "replay");
    assert_eq!(sub.get_one::<String>("recording").map(String::as_str), Some("session.jsonl"));
    assert_eq!(sub.get_one::<String>("learn").map(String::as_str), Some("bhujangasana"));
    assert!(sub.get_flag("json"));
}

#[test]
fn test_global_config_after_subcommand() {
    let cmd = create_test_command();
    let matches = cmd
        .try_get_matches_from(vec!["surya-namaskar-coach", "poses", "--config", "coach.yaml"])
        .unwrap();
    let (_, sub) = matches.subcommand().unwrap();
    assert_eq!(sub.get_one::<String>("config").map(String::as_str), Some("coach.yaml"));
}

#[test]
fn test_build_references_needs_recordings() {
    let cmd = create_test_command();
    assert!(cmd
        .try_get_matches_from(vec!["surya-namaskar-coach", "build-references", "-o", "refs.yaml"])
        .is_err());
}

#[test]
fn test_poses_lists_full_cycle() {
    let output = binary().arg("poses").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 12);
    assert!(stdout.lines().next().unwrap().contains("Pranamasana"));
}

#[test]
fn test_unknown_learn_pose_rejected() {
    let output = binary().args(["replay", "missing.jsonl", "--learn", "tadasana"]).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_init_config_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("coach.yaml");

    let output = binary().arg("init-config").arg(&path).output().unwrap();
    assert!(output.status.success());
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, surya_namaskar_coach::config::EXAMPLE_CONFIG);

    let output = binary().arg("init-config").arg(&path).output().unwrap();
    assert!(!output.status.success());
    let output = binary().arg("init-config").arg(&path).arg("--force").output().unwrap();
    assert!(output.status.success());
}

#[test]
fn test_replay_labelled_recording() {
    let dir = TempDir::new().unwrap();
    let lm = standing();
    let mut records = vec![record(None, None)];
    records.extend((0..19).map(|_| record(Some("Pranamasana"), Some(&lm))));
    let path = write_recording(&dir, "session.jsonl", &records);

    let output = binary().arg("replay").arg(&path).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Held Pranamasana"));
    assert!(stdout.contains("Completed 1/12 poses (19 frames processed, 1 without a body)"));
}

#[test]
fn test_replay_json_reports() {
    let dir = TempDir::new().unwrap();
    let lm = standing();
    let records: Vec<_> = (0..3).map(|_| record(Some("pranamasana"), Some(&lm))).collect();
    let path = write_recording(&dir, "session.jsonl", &records);

    let output = binary().arg("replay").arg(&path).arg("--json").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let reports: Vec<serde_json::Value> = stdout
        .lines()
        .filter(|l| l.starts_with('{'))
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0]["target_pose"], "pranamasana");
}

#[test]
fn test_replay_unlabelled_needs_references() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, "session.jsonl", &[record(None, Some(&standing()))]);
    let output = binary().arg("replay").arg(&path).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_build_references_then_classify() {
    let dir = TempDir::new().unwrap();
    let lm = standing();
    let training = write_recording(&dir, "train.jsonl", &[record(Some("pranamasana"), Some(&lm))]);
    let refs = dir.path().join("refs.yaml");

    let output = binary()
        .arg("build-references")
        .arg("-o")
        .arg(&refs)
        .arg(&training)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let records: Vec<_> = (0..19).map(|_| record(None, Some(&lm))).collect();
    let session = write_recording(&dir, "session.jsonl", &records);
    let output = binary()
        .arg("replay")
        .arg(&session)
        .arg("--references")
        .arg(&refs)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8(output.stdout).unwrap().contains("Held Pranamasana"));
}
