//! Match play - drive one game between two agents to a terminal outcome
//!
//! Level 2 - Phase-level implementation
//!
//! Each turn both sides decide from their own view, the engine resolves the
//! orders, and the harness checks for victory and stalemate. A failing agent
//! submits no orders; a failing engine ends the match with an error result.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use ringwars_core::{AgentKind, AgentSession, MoveOrder};

use crate::config::MatchConfig;
use crate::engine::{Board, ResolutionEngine, RingEngine, Side};

/// Snapshots needed before a stalemate can be declared
pub const STALEMATE_MIN_SNAPSHOTS: usize = 20;
/// Turn after which a stalemate can be declared
pub const STALEMATE_MIN_TURN: u32 = 50;
/// Previous snapshots the latest one is compared against
pub const STALEMATE_LOOKBACK: usize = 10;
/// Largest troop change on a node that still counts as unchanged
pub const STALEMATE_TOLERANCE: u32 = 2;
/// Fewest changed nodes that break similarity
pub const STALEMATE_MAX_CHANGES: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    Victory,
    Stalemate,
    TurnLimit,
    Error,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EndReason::Victory => "Victory",
            EndReason::Stalemate => "Stalemate",
            EndReason::TurnLimit => "Turn Limit",
            EndReason::Error => "Error",
        };
        f.write_str(s)
    }
}

/// Board summary recorded after every resolved turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSnapshot {
    pub turn: u32,
    pub first_troops: u64,
    pub second_troops: u64,
    pub first_nodes: usize,
    pub second_nodes: usize,
    pub troops: Vec<u32>,
}

impl TurnSnapshot {
    pub fn capture(turn: u32, board: &Board) -> Self {
        Self {
            turn,
            first_troops: board.total(Side::First),
            second_troops: board.total(Side::Second),
            first_nodes: board.nodes(Side::First),
            second_nodes: board.nodes(Side::Second),
            troops: board.troops.clone(),
        }
    }

    pub fn troops_of(&self, side: Side) -> u64 {
        match side {
            Side::First => self.first_troops,
            Side::Second => self.second_troops,
        }
    }

    /// Fewer than 3 nodes moved by more than 2 troops
    pub fn is_similar(&self, other: &TurnSnapshot) -> bool {
        if self.troops.len() != other.troops.len() {
            return false;
        }
        let changed = self
            .troops
            .iter()
            .zip(&other.troops)
            .filter(|(a, b)| a.abs_diff(**b) > STALEMATE_TOLERANCE)
            .count();
        changed < STALEMATE_MAX_CHANGES
    }
}

/// Result of a single match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub first: String,
    pub second: String,
    /// None only when the match ended in an error
    pub winner: Option<String>,
    pub end_reason: EndReason,
    pub final_turn: u32,
    pub duration_ms: u64,
    pub turns: Vec<TurnSnapshot>,
    pub error: Option<String>,
}

impl MatchResult {
    fn errored(first: &str, second: &str, turn: u32, message: String) -> Self {
        Self {
            first: first.to_string(),
            second: second.to_string(),
            winner: None,
            end_reason: EndReason::Error,
            final_turn: turn,
            duration_ms: 0,
            turns: Vec::new(),
            error: Some(message),
        }
    }

    pub fn is_error(&self) -> bool {
        self.end_reason == EndReason::Error
    }

    /// Check whether the named agent won
    pub fn won_by(&self, name: &str) -> bool {
        self.winner.as_deref() == Some(name)
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vs {}: {} wins ({}) in {} turns [{}ms]",
            self.first,
            self.second,
            self.winner.as_deref().unwrap_or("nobody"),
            self.end_reason,
            self.final_turn,
            self.duration_ms
        )
    }
}

// ============================================================================
// LEVEL 2 - MATCH
// ============================================================================

/// Play a match on a fresh [`RingEngine`] with fresh sessions for both agents
pub fn run_match(first: AgentKind, second: AgentKind, config: &MatchConfig, seed: u64) -> MatchResult {
    let mut sessions = [
        AgentSession::new(first.name(), session_seed(seed, Side::First)),
        AgentSession::new(second.name(), session_seed(seed, Side::Second)),
    ];
    run_match_with_sessions(first, second, config, seed, &mut sessions)
}

/// Play a match on a fresh [`RingEngine`] with caller-owned sessions
pub fn run_match_with_sessions(
    first: AgentKind,
    second: AgentKind,
    config: &MatchConfig,
    seed: u64,
    sessions: &mut [AgentSession; 2],
) -> MatchResult {
    if config.max_turns == 0 {
        tracing::warn!("{} vs {}: max_turns is 0", first, second);
        return MatchResult::errored(first.name(), second.name(), 0, "max_turns must be at least 1".to_string());
    }
    match RingEngine::new(config, seed) {
        Ok(mut engine) => play_match(&mut engine, [first, second], sessions, config.max_turns),
        Err(e) => {
            tracing::warn!("{} vs {}: {}", first, second, e);
            MatchResult::errored(first.name(), second.name(), 0, e.to_string())
        }
    }
}

/// Drive `engine` until victory, stalemate, the turn limit or an engine error
///
/// With `max_turns == 0` no turn is played and the second side wins on the
/// turn limit, as in any tie.
pub fn play_match<E: ResolutionEngine>(
    engine: &mut E,
    agents: [AgentKind; 2],
    sessions: &mut [AgentSession; 2],
    max_turns: u32,
) -> MatchResult {
    let start = Instant::now();
    let [first, second] = agents;
    let mut snapshots: Vec<TurnSnapshot> = Vec::new();
    let mut outcome: Option<(Option<Side>, EndReason, u32)> = None;
    let mut error = None;

    tracing::debug!("Starting match: {} vs {}", first, second);

    for turn in 1..=max_turns {
        let orders: Vec<Vec<MoveOrder>> = Side::BOTH
            .iter()
            .map(|&side| decide_turn(engine, agents[side.index()], side, turn, &mut sessions[side.index()]))
            .collect();

        if let Err(e) = engine.advance(&orders) {
            tracing::warn!("{} vs {}: engine failed on turn {}: {}", first, second, turn, e);
            error = Some(e.to_string());
            outcome = Some((None, EndReason::Error, turn));
            break;
        }

        let snapshot = TurnSnapshot::capture(turn, engine.board());
        snapshots.push(snapshot);
        let latest = &snapshots[snapshots.len() - 1];

        if let Some(winner) = victor(latest) {
            outcome = Some((Some(winner), EndReason::Victory, turn));
            break;
        }
        if is_stalemate(&snapshots, turn) {
            outcome = Some((Some(leader(latest)), EndReason::Stalemate, turn));
            break;
        }
    }

    let (winner, end_reason, final_turn) = outcome.unwrap_or_else(|| {
        let winner = snapshots.last().map_or(Side::Second, leader);
        (Some(winner), EndReason::TurnLimit, max_turns)
    });

    let name = |side: Side| agents[side.index()].name().to_string();
    let result = MatchResult {
        first: name(Side::First),
        second: name(Side::Second),
        winner: winner.map(name),
        end_reason,
        final_turn,
        duration_ms: start.elapsed().as_millis() as u64,
        turns: snapshots,
        error,
    };
    tracing::info!("Match result: {}", result);
    result
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// One side's orders; any turn failure becomes an empty list
fn decide_turn<E: ResolutionEngine>(
    engine: &E,
    agent: AgentKind,
    side: Side,
    turn: u32,
    session: &mut AgentSession,
) -> Vec<MoveOrder> {
    let budget = engine.budget(side);
    let decision = engine
        .view(side)
        .and_then(|view| agent.decide(&view, budget, turn, session));
    match decision {
        Ok(orders) => {
            tracing::debug!("Turn {}: {} ({}) places {:?}", turn, agent, side, orders);
            orders
        }
        Err(e) => {
            tracing::warn!("Turn {}: {} ({}) failed: {}", turn, agent, side, e);
            Vec::new()
        }
    }
}

/// The side left standing when the other has no troops
fn victor(snapshot: &TurnSnapshot) -> Option<Side> {
    match (snapshot.first_troops, snapshot.second_troops) {
        (f, 0) if f > 0 => Some(Side::First),
        (0, s) if s > 0 => Some(Side::Second),
        _ => None,
    }
}

/// First side only if strictly ahead on troops
pub fn leader(snapshot: &TurnSnapshot) -> Side {
    if snapshot.first_troops > snapshot.second_troops {
        Side::First
    } else {
        Side::Second
    }
}

/// Late in the game, and the latest snapshot matches each of the previous ten
pub fn is_stalemate(snapshots: &[TurnSnapshot], turn: u32) -> bool {
    if snapshots.len() < STALEMATE_MIN_SNAPSHOTS {
        return false;
    }
    let Some((latest, earlier)) = snapshots.split_last() else {
        return false;
    };
    let lookback = STALEMATE_LOOKBACK.min(earlier.len());
    let settled = earlier.iter().rev().take(lookback).all(|past| latest.is_similar(past));
    settled && turn > STALEMATE_MIN_TURN
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Per-side session seed derived from the match seed
pub fn session_seed(seed: u64, side: Side) -> u64 {
    seed.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(side.index() as u64 + 1)
}
