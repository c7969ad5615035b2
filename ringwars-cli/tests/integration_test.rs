//! Integration tests for the RINGWARS command-line interface
//!
//! Tests the full stack through the `ringwars` binary: turn files, single
//! matches and a small tournament with CSV export

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use ringwars_core::{parse_state, total_spent, MoveOrder};
use ringwars_tournament::{MatchConfig, MatchResult, CSV_HEADER};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn ringwars(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ringwars"))
        .args(args)
        .output()
        .expect("failed to launch ringwars")
}

fn read_moves(dir: &Path) -> Vec<MoveOrder> {
    fs::read_to_string(dir.join("move.txt"))
        .unwrap()
        .lines()
        .map(|line| {
            let (p, a) = line.split_once(',').unwrap();
            MoveOrder::new(p.parse().unwrap(), a.parse().unwrap())
        })
        .collect()
}

// ============================================================================
// TURN
// ============================================================================

#[test]
fn test_turn_writes_move_file() {
    let dir = tempfile::tempdir().unwrap();
    let state = "1,0,5,0,3,0,0\nY,N,Y,N,E,N,N\n";
    fs::write(dir.path().join("3.txt"), state).unwrap();
    let ring = parse_state(state).unwrap();

    for agent in ["random", "Agent", "BorderAgent", "expander", "LearningAgent"] {
        let out = ringwars(&["turn", "3", dir.path().to_str().unwrap(), "12", "--agent", agent]);
        assert!(out.status.success(), "{agent}: {}", String::from_utf8_lossy(&out.stderr));

        let moves = read_moves(dir.path());
        assert!(total_spent(&moves) <= 12, "{agent} overspent");
        assert!(moves.iter().all(|m| m.position < ring.len()));
    }
}

#[test]
fn test_turn_without_state_writes_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = ringwars(&["turn", "9", dir.path().to_str().unwrap(), "10"]);
    assert!(out.status.success());
    assert_eq!(fs::read_to_string(dir.path().join("move.txt")).unwrap(), "");
}

#[test]
fn test_unknown_agent_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let out = ringwars(&["turn", "1", dir.path().to_str().unwrap(), "10", "--agent", "nobody"]);
    assert!(!out.status.success());
}

// ============================================================================
// MATCH
// ============================================================================

#[test]
fn test_match_json_output() {
    let out = ringwars(&[
        "match", "cluster", "defensive", "--ring-size", "12", "--max-turns", "40", "--seed", "5", "--json",
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let result: MatchResult = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(result.first, "ClusterAgent");
    assert_eq!(result.second, "DefensiveAgent");
    assert!(result.final_turn <= 40);
    assert!(result.winner.is_some());
    assert_eq!(result.turns.first().map(|t| t.troops.len()), Some(12));
}

#[test]
fn test_match_reads_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("match.json");
    MatchConfig::new(8, 15).with_seed(11).save(&path).unwrap();

    let out = ringwars(&["match", "aggressive", "conservative", "--config", path.to_str().unwrap(), "--json"]);
    assert!(out.status.success());
    let result: MatchResult = serde_json::from_slice(&out.stdout).unwrap();
    assert!(result.final_turn <= 15);
    assert!(result.turns.iter().all(|t| t.troops.len() == 8));
}

// ============================================================================
// TOURNAMENT
// ============================================================================

#[test]
fn test_small_tournament_exports_csv() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("results.csv");
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"ring_size": 10, "max_turns": 30}"#).unwrap();

    let out = ringwars(&[
        "tournament",
        "--config",
        config.to_str().unwrap(),
        "--agents",
        "random,adaptive,strategic",
        "--matches",
        "2",
        "--seed",
        "3",
        "--export",
        csv.to_str().unwrap(),
        "--quiet",
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Tournament Standings"));
    assert!(stdout.contains("StrategicAgent"));

    let text = fs::read_to_string(&csv).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(CSV_HEADER));
    // 3 pairs x (2 + 1 reversed)
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 9);
    assert!(rows.iter().all(|r| r.split(',').count() == 6));
}

#[test]
fn test_tournament_needs_two_agents() {
    let out = ringwars(&["tournament", "--agents", "random", "--quiet"]);
    assert!(!out.status.success());

    // repeating an agent does not make a second entrant
    let out = ringwars(&["tournament", "--agents", "border,border", "--quiet"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("distinct"));
}

#[test]
fn test_agents_lists_roster() {
    let out = ringwars(&["agents"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.lines().count(), 11);
    assert!(stdout.contains("LearningAgent"));
}

// ============================================================================
// EVALUATION SUITES
// ============================================================================

#[test]
fn test_analysis_reports_rating() {
    let out = ringwars(&[
        "analysis", "border", "--opponents", "random,border,cluster", "--matches", "2", "--max-turns", "30",
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("=== AGENT ANALYSIS: BorderAgent ==="));
    assert!(stdout.contains("Vs RandomAgent:"));
    assert!(stdout.contains("Vs ClusterAgent:"));
    assert!(!stdout.contains("Vs BorderAgent:"));
    assert!(stdout.contains("Overall: "));
    assert!(stdout.contains("/4 wins"));
    assert!(stdout.contains("Performance: "));
}

#[test]
fn test_analysis_against_itself_only_fails() {
    let out = ringwars(&["analysis", "border", "--opponents", "border"]);
    assert!(!out.status.success());
}

#[test]
fn test_quick_check_passes() {
    let out = ringwars(&["quick"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("4/4 agents passed"));
}
