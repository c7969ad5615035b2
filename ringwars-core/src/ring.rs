//! Ring geometry and ownership

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TurnError;

/// Ownership of a node, seen from the deciding side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    Mine,
    Enemy,
    Neutral,
}

impl Owner {
    /// Single-character wire code
    pub const fn code(self) -> char {
        match self {
            Owner::Mine => 'Y',
            Owner::Enemy => 'E',
            Owner::Neutral => 'N',
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Y" => Some(Owner::Mine),
            "E" => Some(Owner::Enemy),
            "N" => Some(Owner::Neutral),
            _ => None,
        }
    }
}

/// A single placement or attack order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveOrder {
    pub position: usize,
    pub amount: u32,
}

impl MoveOrder {
    pub const fn new(position: usize, amount: u32) -> Self {
        Self { position, amount }
    }
}

impl fmt::Display for MoveOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.position, self.amount)
    }
}

/// Total troops committed by a list of orders
pub fn total_spent(orders: &[MoveOrder]) -> u64 {
    orders.iter().map(|o| u64::from(o.amount)).sum()
}

/// Ring state as one side sees it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingState {
    owners: Vec<Owner>,
    troops: Vec<u32>,
}

impl RingState {
    /// Build a ring, checking that owners and troops line up
    pub fn new(owners: Vec<Owner>, troops: Vec<u32>) -> Result<Self, TurnError> {
        if owners.len() != troops.len() {
            return Err(TurnError::LengthMismatch {
                counts: troops.len(),
                owners: owners.len(),
            });
        }
        if owners.is_empty() {
            return Err(TurnError::EmptyRing);
        }
        Ok(Self { owners, troops })
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn owner(&self, i: usize) -> Owner {
        self.owners[i]
    }

    pub fn troops(&self, i: usize) -> u32 {
        self.troops[i]
    }

    pub fn owners(&self) -> &[Owner] {
        &self.owners
    }

    pub fn troop_counts(&self) -> &[u32] {
        &self.troops
    }

    /// Counter-clockwise neighbour; node 0 wraps to N-1
    pub fn left(&self, i: usize) -> usize {
        (i + self.len() - 1) % self.len()
    }

    /// Clockwise neighbour; node N-1 wraps to 0
    pub fn right(&self, i: usize) -> usize {
        (i + 1) % self.len()
    }

    pub fn neighbors(&self, i: usize) -> [usize; 2] {
        [self.left(i), self.right(i)]
    }

    pub fn is(&self, i: usize, owner: Owner) -> bool {
        self.owners[i] == owner
    }

    /// True if either ring neighbour has the given owner
    pub fn has_neighbor(&self, i: usize, owner: Owner) -> bool {
        self.is(self.left(i), owner) || self.is(self.right(i), owner)
    }

    /// A node next to one of ours can be claimed or attacked
    pub fn is_reachable(&self, i: usize) -> bool {
        self.has_neighbor(i, Owner::Mine)
    }

    /// A node next to an enemy node
    pub fn is_exposed(&self, i: usize) -> bool {
        self.has_neighbor(i, Owner::Enemy)
    }

    /// An owned node with at least one neighbour we don't own
    pub fn is_border(&self, i: usize) -> bool {
        self.is(i, Owner::Mine) && (!self.is(self.left(i), Owner::Mine) || !self.is(self.right(i), Owner::Mine))
    }

    /// Enemy troops adjacent to a node, plus one per neutral neighbour
    pub fn border_threat(&self, i: usize) -> u32 {
        self.neighbors(i)
            .into_iter()
            .map(|n| match self.owners[n] {
                Owner::Enemy => self.troops[n],
                Owner::Neutral => 1,
                Owner::Mine => 0,
            })
            .sum()
    }

    /// Troops plus 2 per owned neighbour, minus 3 per enemy neighbour
    pub fn safety(&self, i: usize) -> i64 {
        self.neighbors(i).into_iter().fold(i64::from(self.troops[i]), |acc, n| match self.owners[n] {
            Owner::Mine => acc + 2,
            Owner::Enemy => acc - 3,
            Owner::Neutral => acc,
        })
    }

    /// Number of owned neighbours
    pub fn connectivity(&self, i: usize) -> u32 {
        self.neighbors(i).into_iter().filter(|&n| self.is(n, Owner::Mine)).count() as u32
    }

    pub fn positions(&self, owner: Owner) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.is(i, owner)).collect()
    }

    pub fn count(&self, owner: Owner) -> usize {
        self.owners.iter().filter(|&&o| o == owner).count()
    }

    /// Sum of troops on nodes with the given owner
    pub fn strength(&self, owner: Owner) -> u64 {
        self.owners
            .iter()
            .zip(&self.troops)
            .filter(|(&o, _)| o == owner)
            .map(|(_, &t)| u64::from(t))
            .sum()
    }

    /// Sum of troops on every node, neutral included
    pub fn total_troops(&self) -> u64 {
        self.troops.iter().map(|&t| u64::from(t)).sum()
    }

    /// Compact history encoding: owner code and troop count per node, comma terminated
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.len() * 4);
        for (owner, troops) in self.owners.iter().zip(&self.troops) {
            out.push(owner.code());
            out.push_str(&troops.to_string());
            out.push(',');
        }
        out
    }
}
