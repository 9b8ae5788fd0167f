use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("itchcast"))
}

fn stock_field(symbol: &str) -> [u8; 8] {
    let mut field = [b' '; 8];
    field[..symbol.len()].copy_from_slice(symbol.as_bytes());
    field
}

fn add_order(order_ref: u64, stock: &str, wide: bool) -> Vec<u8> {
    let mut frame = vec![b'A', 0x00, 0x01, 0x00, 0x02];
    let nanos = 34_200_000_000_000u64;
    if wide {
        frame.extend_from_slice(&nanos.to_be_bytes());
    } else {
        frame.extend_from_slice(&nanos.to_be_bytes()[2..]);
    }
    frame.extend_from_slice(&order_ref.to_be_bytes());
    frame.push(b'B');
    frame.extend_from_slice(&100u32.to_be_bytes());
    frame.extend_from_slice(&stock_field(stock));
    frame.extend_from_slice(&1_502_500u32.to_be_bytes());
    frame
}

fn order_delete(order_ref: u64) -> Vec<u8> {
    let mut frame = vec![b'D', 0x00, 0x01, 0x00, 0x03];
    frame.extend_from_slice(&34_200_000_000_001u64.to_be_bytes());
    frame.extend_from_slice(&order_ref.to_be_bytes());
    frame
}

fn write_capture(dir: &Path, frames: &[Vec<u8>]) -> PathBuf {
    let mut bytes = Vec::new();
    for frame in frames {
        bytes.extend_from_slice(&(frame.len() as u16).to_be_bytes());
        bytes.extend_from_slice(frame);
    }
    let path = dir.join("feed.itch");
    std::fs::write(&path, bytes).expect("write capture");
    path
}

fn sample_capture(dir: &Path) -> PathBuf {
    write_capture(
        dir,
        &[
            add_order(1, "AAPL", true),
            add_order(2, "MSFT", true),
            order_delete(1),
        ],
    )
}

#[test]
fn help_lists_every_subcommand() {
    for sub in ["listen", "replay", "decode"] {
        cmd().arg(sub).arg("--help").assert().success();
    }
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("listen").and(contains("replay")).and(contains("decode")));
}

#[test]
fn decode_prints_text_lines_in_feed_order() {
    let temp = TempDir::new().expect("tempdir");
    let capture = sample_capture(temp.path());

    let output = cmd()
        .arg("decode")
        .arg(&capture)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("[000001] Add Order - Time: 09:30:00.000"));
    assert!(lines[0].contains("Stock: AAPL, Side: B, Shares: 100, Price: $150.2500"));
    assert!(lines[1].contains("Stock: MSFT"));
    assert!(lines[2].starts_with("[000003] Order Delete"));
}

#[test]
fn decode_json_emits_one_object_per_message() {
    let temp = TempDir::new().expect("tempdir");
    let capture = sample_capture(temp.path());

    let output = cmd()
        .arg("decode")
        .arg(&capture)
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).expect("utf8");
    let records: Vec<Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["seq"], 1);
    assert_eq!(records[0]["kind"], "AddOrder");
    assert_eq!(records[0]["stock"], "AAPL");
    assert_eq!(records[0]["price"], "150.2500");
    assert_eq!(records[0]["timestamp"], 34_200_000_000_000u64);
    assert!(records[0].get("raw").is_none());
    assert_eq!(records[2]["kind"], "OrderDelete");
    assert_eq!(records[2]["order_ref"], 1);
}

#[test]
fn stock_filter_keeps_matching_symbols_only() {
    let temp = TempDir::new().expect("tempdir");
    let capture = sample_capture(temp.path());

    cmd()
        .arg("decode")
        .arg(&capture)
        .arg("--stock")
        .arg("msft")
        .assert()
        .success()
        .stdout(
            contains("Stock: MSFT")
                .and(contains("AAPL").not())
                .and(contains("Order Delete").not()),
        );
}

#[test]
fn type_filter_and_message_limit() {
    let temp = TempDir::new().expect("tempdir");
    let capture = sample_capture(temp.path());

    cmd()
        .arg("decode")
        .arg(&capture)
        .arg("--type")
        .arg("D")
        .assert()
        .success()
        .stdout(contains("Order Delete").and(contains("Add Order").not()));

    let output = cmd()
        .arg("decode")
        .arg(&capture)
        .arg("--max-messages")
        .arg("1")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(String::from_utf8(output).expect("utf8").lines().count(), 1);
}

#[test]
fn show_raw_prints_hex_before_each_message() {
    let temp = TempDir::new().expect("tempdir");
    let capture = write_capture(temp.path(), &[order_delete(7)]);

    cmd()
        .arg("decode")
        .arg(&capture)
        .arg("--show-raw")
        .assert()
        .success()
        .stdout(contains("Raw: 440001000300001f1a").and(contains("Order Delete")));
}

#[test]
fn six_byte_timestamps_decode_when_selected() {
    let temp = TempDir::new().expect("tempdir");
    let capture = write_capture(temp.path(), &[add_order(9, "IBM", false)]);

    cmd()
        .arg("decode")
        .arg(&capture)
        .arg("--timestamp-width")
        .arg("6")
        .assert()
        .success()
        .stdout(contains("Stock: IBM").and(contains("Price: $150.2500")));
}

#[test]
fn invalid_timestamp_width_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    let capture = sample_capture(temp.path());

    cmd()
        .arg("decode")
        .arg(&capture)
        .arg("--timestamp-width")
        .arg("7")
        .assert()
        .failure()
        .stderr(contains("expected 6 or 8"));
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.itch");

    for sub in ["decode", "replay"] {
        cmd()
            .arg(sub)
            .arg(&missing)
            .assert()
            .code(2)
            .stderr(contains("error:").and(contains("hint:")));
    }
}

#[test]
fn truncated_capture_reports_error_after_complete_records() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("cut.itch");
    let frame = order_delete(3);
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&(frame.len() as u16).to_be_bytes());
    bytes.extend_from_slice(&frame);
    bytes.extend_from_slice(&[0x00, 0x26, b'A', 0x00]);
    std::fs::write(&path, bytes).expect("write capture");

    cmd()
        .arg("decode")
        .arg(&path)
        .assert()
        .code(2)
        .stdout(contains("Order Delete"))
        .stderr(contains("error:"));
}

#[test]
fn quiet_suppresses_progress_logs() {
    let temp = TempDir::new().expect("tempdir");
    let capture = sample_capture(temp.path());

    cmd()
        .arg("--quiet")
        .arg("decode")
        .arg(&capture)
        .assert()
        .success()
        .stderr(predicates::str::is_empty());
}
