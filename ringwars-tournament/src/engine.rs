//! Board resolution - the collaborator that turns both sides' orders into a new board
//!
//! The harness only talks to [`ResolutionEngine`]. [`RingEngine`] is a small
//! deterministic implementation so matches can be played end to end.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use ringwars_core::{MoveOrder, Owner, RingState, TurnError};

use crate::config::MatchConfig;

/// One of the two players
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::First, Side::Second];

    pub const fn index(self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }

    pub const fn other(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::First => f.write_str("first"),
            Side::Second => f.write_str("second"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{side} side ordered position {position} on a ring of {len}")]
    PositionOutOfRange { side: Side, position: usize, len: usize },

    #[error("expected {expected} order lists, got {got}")]
    WrongOrderCount { expected: usize, got: usize },

    #[error("engine failed: {0}")]
    Failed(String),
}

/// Absolute board: who holds each node and with how many troops
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub owners: Vec<Option<Side>>,
    pub troops: Vec<u32>,
}

impl Board {
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Troops held by a side
    pub fn total(&self, side: Side) -> u64 {
        self.owners
            .iter()
            .zip(&self.troops)
            .filter(|(o, _)| **o == Some(side))
            .map(|(_, &t)| u64::from(t))
            .sum()
    }

    pub fn nodes(&self, side: Side) -> usize {
        self.owners.iter().filter(|o| **o == Some(side)).count()
    }

    /// Shortest distance around the ring
    pub fn distance(&self, a: usize, b: usize) -> usize {
        let d = a.abs_diff(b);
        d.min(self.len() - d)
    }

    /// The board as `side` would see it with unlimited visibility
    pub fn relative_to(&self, side: Side) -> Result<RingState, TurnError> {
        let owners = self
            .owners
            .iter()
            .map(|o| match o {
                Some(s) if *s == side => Owner::Mine,
                Some(_) => Owner::Enemy,
                None => Owner::Neutral,
            })
            .collect();
        RingState::new(owners, self.troops.clone())
    }
}

/// Whatever resolves turns: both sides submit orders, the board moves on
pub trait ResolutionEngine {
    fn board(&self) -> &Board;

    /// The ring as `side` sees it
    fn view(&self, side: Side) -> Result<RingState, TurnError>;

    /// New troops available to `side` this turn
    fn budget(&self, side: Side) -> u32;

    /// Resolve one turn; `orders` holds the first side's list, then the second's
    fn advance(&mut self, orders: &[Vec<MoveOrder>]) -> Result<(), EngineError>;
}

// ============================================================================
// REFERENCE ENGINE
// ============================================================================

/// Deterministic ring game with fog of war and simultaneous resolution
#[derive(Clone, Debug)]
pub struct RingEngine {
    board: Board,
    config: MatchConfig,
}

impl RingEngine {
    /// Seed the neutral nodes with 0-2 troops and place both sides opposite each other
    pub fn new(config: &MatchConfig, seed: u64) -> Result<Self, EngineError> {
        let n = config.ring_size;
        if n < 2 {
            return Err(EngineError::Failed(format!("ring of {n} nodes cannot hold two sides")));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut owners = vec![None; n];
        let mut troops: Vec<u32> = (0..n).map(|_| rng.gen_range(0..=2)).collect();

        for (side, position) in [(Side::First, 0), (Side::Second, n / 2)] {
            owners[position] = Some(side);
            troops[position] = config.starting_soldiers;
        }

        Ok(Self {
            board: Board { owners, troops },
            config: config.clone(),
        })
    }

    pub fn from_board(board: Board, config: &MatchConfig) -> Self {
        Self {
            board,
            config: config.clone(),
        }
    }

    /// Orders a side may actually execute: affordable, and on its own or an adjacent node
    fn admissible(&self, side: Side, orders: &[MoveOrder]) -> Result<Vec<MoveOrder>, EngineError> {
        let len = self.board.len();
        let mut remaining = self.budget(side);
        let mut accepted = Vec::with_capacity(orders.len());

        for order in orders {
            if order.position >= len {
                return Err(EngineError::PositionOutOfRange {
                    side,
                    position: order.position,
                    len,
                });
            }
            if remaining == 0 {
                break;
            }
            if !self.can_reach(side, order.position) {
                continue;
            }
            let amount = order.amount.min(remaining);
            remaining -= amount;
            accepted.push(MoveOrder::new(order.position, amount));
        }
        Ok(accepted)
    }

    fn can_reach(&self, side: Side, position: usize) -> bool {
        let len = self.board.len();
        let held = |i: usize| self.board.owners[i] == Some(side);
        held(position) || held((position + len - 1) % len) || held((position + 1) % len)
    }
}

impl ResolutionEngine for RingEngine {
    fn board(&self) -> &Board {
        &self.board
    }

    /// Nodes farther than the visibility range from every owned node look neutral and empty
    fn view(&self, side: Side) -> Result<RingState, TurnError> {
        let full = self.board.relative_to(side)?;
        let held: Vec<usize> = full.positions(Owner::Mine);
        let range = self.config.visibility_range;

        let mut owners = full.owners().to_vec();
        let mut troops = full.troop_counts().to_vec();
        for i in 0..full.len() {
            if !held.iter().any(|&h| self.board.distance(h, i) <= range) {
                owners[i] = Owner::Neutral;
                troops[i] = 0;
            }
        }
        RingState::new(owners, troops)
    }

    fn budget(&self, side: Side) -> u32 {
        let len = self.board.len().max(1) as u64;
        let owned = self.board.nodes(side) as u64;
        let bonus = u64::from(self.config.bonus_growth_per_turn) * owned / len;
        let raw = u64::from(self.config.growth_per_turn) + bonus;
        let headroom = u64::from(self.config.max_soldiers).saturating_sub(self.board.total(side));
        raw.min(headroom) as u32
    }

    fn advance(&mut self, orders: &[Vec<MoveOrder>]) -> Result<(), EngineError> {
        if orders.len() != Side::BOTH.len() {
            return Err(EngineError::WrongOrderCount {
                expected: Side::BOTH.len(),
                got: orders.len(),
            });
        }

        let len = self.board.len();
        // placed[side][node]
        let mut placed = [vec![0u32; len], vec![0u32; len]];
        for side in Side::BOTH {
            for order in self.admissible(side, &orders[side.index()])? {
                placed[side.index()][order.position] += order.amount;
            }
        }

        for i in 0..len {
            let holder = self.board.owners[i];
            if let Some(h) = holder {
                self.board.troops[i] += placed[h.index()][i];
            }

            let attack = |s: Side| if holder == Some(s) { 0 } else { placed[s.index()][i] };
            let (first, second) = (attack(Side::First), attack(Side::Second));
            let survivor = match first.cmp(&second) {
                std::cmp::Ordering::Greater => Some((Side::First, first - second)),
                std::cmp::Ordering::Less => Some((Side::Second, second - first)),
                std::cmp::Ordering::Equal => None,
            };

            if let Some((attacker, force)) = survivor {
                let defence = self.board.troops[i];
                match force.cmp(&defence) {
                    std::cmp::Ordering::Greater => {
                        self.board.owners[i] = Some(attacker);
                        self.board.troops[i] = force - defence;
                    }
                    std::cmp::Ordering::Equal => {
                        self.board.owners[i] = None;
                        self.board.troops[i] = 0;
                    }
                    std::cmp::Ordering::Less => self.board.troops[i] = defence - force,
                }
            }
        }
        Ok(())
    }
}
