//! Integration tests for the paddockctl binary
//!
//! Datagrams are built with `paddock_wire::builders`, written to temporary
//! directories and fed to the real binary. Exit codes are checked for each
//! failure class.

use assert_cmd::Command;
use paddock_wire::builders::{
    build_header, build_lap_data_packet, build_session_history_packet, build_session_packet,
};
use paddock_wire::{LapDataEntry, LapHistoryEntry, SessionData};
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const UID: u64 = 0x00F1_2022_0000_00AA;

fn paddockctl() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("paddockctl")?;
    cmd.env_remove("PADDOCK_CONFIG")
        .env_remove("PADDOCK_UDP_PORT")
        .env_remove("PADDOCK_BIND_ADDR")
        .env_remove("PADDOCK_RECV_TIMEOUT_MS")
        .env_remove("RUST_LOG");
    Ok(cmd)
}

fn race() -> SessionData {
    SessionData {
        weather: 0,
        track_temperature: 30,
        air_temperature: 22,
        total_laps: 5,
        track_length: 5891,
        session_type: 10,
        track_id: 7,
    }
}

/// Session, then lap 3 starting after an 85.000 s lap 2, then history.
fn write_capture(dir: &Path) -> TestResult {
    let lap_three = LapDataEntry {
        current_lap_num: 3,
        current_lap_time_ms: 100,
        last_lap_time_ms: 85_000,
        ..LapDataEntry::default()
    };
    let history = [
        LapHistoryEntry {
            lap_time_ms: 90_000,
            sector1_time_ms: 30_000,
            sector2_time_ms: 31_000,
            sector3_time_ms: 29_000,
            valid_flags: 0x0F,
        },
        LapHistoryEntry {
            lap_time_ms: 85_000,
            sector1_time_ms: 28_000,
            sector2_time_ms: 29_000,
            sector3_time_ms: 28_000,
            valid_flags: 0x01,
        },
    ];

    fs::write(dir.join("00000000.bin"), build_session_packet(UID, 0, &race()))?;
    fs::write(
        dir.join("00000001.bin"),
        build_lap_data_packet(UID, 10.0, 0, &lap_three),
    )?;
    fs::write(
        dir.join("00000002.bin"),
        build_session_history_packet(UID, 0, 0, &history),
    )?;
    Ok(())
}

fn json_lines(stdout: &[u8]) -> Result<Vec<Value>, Box<dyn std::error::Error>> {
    let text = std::str::from_utf8(stdout)?;
    let mut values = Vec::new();
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        values.push(serde_json::from_str(line)?);
    }
    Ok(values)
}

#[test]
fn test_cli_help() -> TestResult {
    paddockctl()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("F1 22 lap telemetry CLI"));
    Ok(())
}

#[test]
fn test_cli_version() -> TestResult {
    paddockctl()?
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("paddockctl"));
    Ok(())
}

#[test]
fn test_completion_generation() -> TestResult {
    paddockctl()?
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_paddockctl"));
    Ok(())
}

// Decode

#[test]
fn test_decode_session_human() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("session.bin");
    fs::write(&path, build_session_packet(UID, 0, &race()))?;

    paddockctl()?
        .arg("decode")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Session"))
        .stdout(predicate::str::contains("Silverstone"));
    Ok(())
}

#[test]
fn test_decode_session_json() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("session.bin");
    fs::write(&path, build_session_packet(UID, 0, &race()))?;

    let output = paddockctl()?.arg("--json").arg("decode").arg(&path).output()?;
    assert!(output.status.success());
    let lines = json_lines(&output.stdout)?;
    assert_eq!(lines.len(), 1);
    let decoded = lines.first().ok_or("no output")?;
    assert_eq!(decoded["kind"], "Session");
    assert_eq!(decoded["header"]["packet_format"], 2022);
    assert_eq!(decoded["payload"]["session"]["track"], "Silverstone");
    assert_eq!(decoded["payload"]["session"]["session_type"], "R");
    Ok(())
}

#[test]
fn test_decode_foreign_format_exit_code() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("f1_2021.bin");
    fs::write(&path, build_header(2021, 1, UID, 0.0, 0))?;

    paddockctl()?
        .arg("decode")
        .arg(&path)
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("2021"));
    Ok(())
}

#[test]
fn test_decode_empty_file_exit_code() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("empty.bin");
    fs::write(&path, b"")?;

    paddockctl()?.arg("decode").arg(&path).assert().failure().code(3);
    Ok(())
}

#[test]
fn test_decode_missing_file() -> TestResult {
    paddockctl()?
        .args(["decode", "/nonexistent/datagram.bin"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to read datagram"));
    Ok(())
}

// Replay

#[test]
fn test_replay_capture_human() -> TestResult {
    let dir = TempDir::new()?;
    write_capture(dir.path())?;

    paddockctl()?
        .arg("replay")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Silverstone"))
        .stdout(predicate::str::contains("1:25.000"))
        .stdout(predicate::str::contains("final"))
        .stdout(predicate::str::contains("Session summary"));
    Ok(())
}

#[test]
fn test_replay_capture_json() -> TestResult {
    let dir = TempDir::new()?;
    write_capture(dir.path())?;

    let output = paddockctl()?
        .args(["--json", "replay"])
        .arg(dir.path())
        .output()?;
    assert!(output.status.success());

    let lines = json_lines(&output.stdout)?;
    let finalized: Vec<&Value> = lines
        .iter()
        .filter(|v| v["event"] == "lap_finalized")
        .collect();
    assert_eq!(finalized.len(), 1);
    let record = &finalized.first().ok_or("no finalized lap")?["record"];
    assert_eq!(record["lap_num"], 2);
    assert_eq!(record["source"], "history");
    assert_eq!(record["times"]["sector3_ms"], 28_000);

    let summary = lines.last().ok_or("no summary")?;
    assert_eq!(summary["summary"]["lap_count"], 1);
    assert_eq!(summary["stats"]["received"], 3);
    Ok(())
}

#[test]
fn test_replay_empty_directory_exit_code() -> TestResult {
    let dir = TempDir::new()?;
    paddockctl()?
        .arg("replay")
        .arg(dir.path())
        .assert()
        .failure()
        .code(3);
    Ok(())
}

#[test]
fn test_replay_requires_paths() -> TestResult {
    paddockctl()?.arg("replay").assert().failure().code(2);
    Ok(())
}

// Listen

#[test]
fn test_listen_with_duration_prints_summary() -> TestResult {
    let output = paddockctl()?
        .args(["--json", "listen", "--bind", "127.0.0.1:0", "--duration", "1"])
        .timeout(std::time::Duration::from_secs(20))
        .output()?;
    assert!(output.status.success());

    let lines = json_lines(&output.stdout)?;
    let summary = lines.last().ok_or("no summary")?;
    assert_eq!(summary["summary"]["lap_count"], 0);
    assert_eq!(summary["stats"]["received"], 0);
    Ok(())
}

#[test]
fn test_listen_invalid_config_exit_code() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("listener.yaml");
    fs::write(&path, "recv_timeout_ms: 0\n")?;

    paddockctl()?
        .args(["listen", "--duration", "1", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .code(2);
    Ok(())
}
