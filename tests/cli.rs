//! Exit-code and output contract of the `cachesim` binary.
//!
//! Spawns the compiled binary and pins the exit status and both streams for
//! every command-line path: help, unknown and missing options, rejected
//! geometry, unopenable traces, and whole-trace runs.

use std::process::{Command, Output};

// ──────────────────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────────────────

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cachesim"))
        .args(args)
        .output()
        .expect("binary runs")
}

fn fixture(name: &str) -> String {
    format!("{}/tests/traces/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ══════════════════════════════════════════════════════════
// 1. Option handling
// ══════════════════════════════════════════════════════════

/// `-h` prints the usage text on stdout and exits 0.
#[test]
fn help_prints_usage_and_exits_zero() {
    let output = run(&["-h"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains("Usage"));
}

/// An unknown option is reported but still exits 0, without simulating.
#[test]
fn unknown_option_exits_zero() {
    let output = run(&["-s", "1", "-E", "1", "-b", "1", "-t", &fixture("yi.trace"), "-x"]);
    assert_eq!(output.status.code(), Some(0), "unknown options exit cleanly");
    assert!(stderr_of(&output).contains("-x"));
    assert!(stdout_of(&output).is_empty(), "no simulation runs");
}

/// Leaving out a required option is fatal.
#[test]
fn missing_required_option_exits_one() {
    let output = run(&["-s", "4", "-E", "1", "-b", "4"]);
    assert_eq!(output.status.code(), Some(1), "missing -t is fatal");
    assert!(stderr_of(&output).contains("-t"));
}

/// A required option with a non-integer value is fatal.
#[test]
fn non_integer_option_value_exits_one() {
    let output = run(&["-s", "mid", "-E", "1", "-b", "4", "-t", &fixture("yi.trace")]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("invalid value"));
}

// ══════════════════════════════════════════════════════════
// 2. Geometry rejection
// ══════════════════════════════════════════════════════════

/// Zero lines per set is rejected with a diagnostic and the usage text.
#[test]
fn zero_ways_geometry_exits_one() {
    let output = run(&["-s", "4", "-E", "0", "-b", "4", "-t", &fixture("yi.trace")]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("at least one line"));
    assert!(stderr.contains("Usage"), "usage text follows the diagnostic");
}

/// An index/offset split wider than the address is rejected.
#[test]
fn oversized_geometry_exits_one() {
    let output = run(&["-s", "60", "-E", "1", "-b", "8", "-t", &fixture("yi.trace")]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("exceed"));
}

// ══════════════════════════════════════════════════════════
// 3. Trace file errors
// ══════════════════════════════════════════════════════════

/// An unopenable trace path exits 1 with a one-line diagnostic naming it.
#[test]
fn unopenable_trace_exits_one_and_names_the_path() {
    let path = fixture("no_such.trace");
    let output = run(&["-s", "4", "-E", "1", "-b", "4", "-t", &path]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains(&path), "diagnostic names the path");
    assert!(stdout_of(&output).is_empty(), "no summary is printed");
}

// ══════════════════════════════════════════════════════════
// 4. Full runs
// ══════════════════════════════════════════════════════════

/// A quiet replay prints exactly one summary line and exits 0.
#[test]
fn replay_prints_one_summary_line() {
    let output = run(&["-s", "4", "-E", "1", "-b", "4", "-t", &fixture("yi.trace")]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_of(&output), "hits:4 misses:5 evictions:3\n");
}

/// A verbose replay echoes every non-instruction entry, then the summary.
#[test]
fn verbose_replay_echoes_every_entry() {
    let output = run(&["-v", "-s", "4", "-E", "1", "-b", "4", "-t", &fixture("yi.trace")]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = stdout_of(&output);
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec![
            "L 10,1 miss",
            "M 20,1 miss hit",
            "L 22,1 hit",
            "S 18,1 hit",
            "L 110,1 miss eviction",
            "L 210,1 miss eviction",
            "M 12,1 miss eviction hit",
            "hits:4 misses:5 evictions:3",
        ]
    );
    assert!(stdout.ends_with('\n'), "output ends with a newline");
}

/// A malformed tail truncates the trace without turning the run into an
/// error: the summary covers the entries before it and the exit is clean.
#[test]
fn malformed_tail_still_summarizes() {
    let output = run(&["-s", "4", "-E", "1", "-b", "4", "-t", &fixture("truncated.trace")]);
    assert_eq!(output.status.code(), Some(0), "a malformed tail is not an error");
    assert_eq!(stdout_of(&output), "hits:1 misses:1 evictions:0\n");
}
