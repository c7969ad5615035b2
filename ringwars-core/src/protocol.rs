//! File-exchange turn protocol
//!
//! The game server writes `<dir>/<step>.txt` with two comma-separated lines
//! (troop counts, then `Y`/`E`/`N` owner codes) and reads the agent's answer
//! back from `<dir>/move.txt`, one `position,amount` per line.

use std::fs;
use std::path::{Path, PathBuf};

use crate::agent::AgentKind;
use crate::error::TurnError;
use crate::ring::{MoveOrder, Owner, RingState};
use crate::session::AgentSession;

pub const MOVE_FILE: &str = "move.txt";

pub fn state_path(dir: &Path, step: u32) -> PathBuf {
    dir.join(format!("{step}.txt"))
}

/// Parse the two-line state text
pub fn parse_state(text: &str) -> Result<RingState, TurnError> {
    let mut lines = text.lines();
    let counts_line = lines.next().ok_or(TurnError::MissingLine("troop count"))?;
    let owners_line = lines.next().ok_or(TurnError::MissingLine("owner"))?;

    let troops = fields(counts_line)
        .enumerate()
        .map(|(position, value)| {
            value.parse::<u32>().map_err(|_| TurnError::InvalidCount {
                position,
                value: value.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let owners = fields(owners_line)
        .enumerate()
        .map(|(position, code)| {
            Owner::from_code(code).ok_or_else(|| TurnError::UnknownOwner {
                position,
                code: code.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    RingState::new(owners, troops)
}

/// Trimmed comma-separated fields; a trailing comma adds nothing
fn fields(line: &str) -> impl Iterator<Item = &str> {
    let line = line.trim().trim_end_matches(',');
    line.split(',').map(str::trim).filter(move |_| !line.is_empty())
}

/// Render the state back into the two-line file format
pub fn format_state(ring: &RingState) -> String {
    let counts: Vec<String> = ring.troop_counts().iter().map(u32::to_string).collect();
    let owners: Vec<String> = ring.owners().iter().map(|o| o.code().to_string()).collect();
    format!("{}\n{}\n", counts.join(","), owners.join(","))
}

pub fn format_orders(orders: &[MoveOrder]) -> String {
    orders.iter().map(|order| format!("{order}\n")).collect()
}

pub fn read_state(dir: &Path, step: u32) -> Result<RingState, TurnError> {
    let text = fs::read_to_string(state_path(dir, step))?;
    parse_state(&text)
}

pub fn write_state(dir: &Path, step: u32, ring: &RingState) -> Result<(), TurnError> {
    fs::write(state_path(dir, step), format_state(ring))?;
    Ok(())
}

/// Overwrite `<dir>/move.txt`
pub fn write_orders(dir: &Path, orders: &[MoveOrder]) -> Result<(), TurnError> {
    fs::write(dir.join(MOVE_FILE), format_orders(orders))?;
    Ok(())
}

/// Read the step's state, decide and write the move file.
///
/// A failed read or decision is logged and answered with an empty move file;
/// only a failure to write that file is returned.
pub fn play_turn(
    kind: AgentKind,
    dir: &Path,
    step: u32,
    budget: u32,
    session: &mut AgentSession,
) -> Result<Vec<MoveOrder>, TurnError> {
    let orders = read_state(dir, step)
        .and_then(|ring| kind.decide(&ring, budget, step, session))
        .unwrap_or_else(|e| {
            tracing::warn!("{} step {} in {}: {}", kind, step, dir.display(), e);
            Vec::new()
        });
    write_orders(dir, &orders)?;
    Ok(orders)
}
