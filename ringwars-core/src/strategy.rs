//! Strategy selection - counter-strategies and game-phase plans
//!
//! Everything here resolves to an allocator [`Plan`]; the selector only decides
//! which plan to run and how the budget is split between categories.

use serde::{Deserialize, Serialize};

use crate::allocator::{Allocation, Candidates, Cap, Plan, Remainder, Share, SortKey};
use crate::classifier::Behavior;
use crate::ring::{Owner, RingState};

/// Turn before which the game is always in its opening phase
pub const EARLY_TURN_LIMIT: u32 = 10;
/// Board troops below which the game is still in its opening phase
pub const EARLY_TROOP_LIMIT: u64 = 100;
/// Turn before which the game is at most in its middle phase
pub const MID_TURN_LIMIT: u32 = 25;

/// Concrete strategy chosen for one turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    Aggressive,
    Defensive,
    Expansive,
    Balanced,
}

impl Strategy {
    /// Counter the inferred opponent behaviour
    pub fn select(behavior: Behavior, turn: u32) -> Self {
        match behavior {
            Behavior::Aggressive => Strategy::Defensive,
            Behavior::Defensive => Strategy::Aggressive,
            Behavior::Expansive if turn < EARLY_TURN_LIMIT => Strategy::Aggressive,
            Behavior::Expansive => Strategy::Defensive,
            Behavior::Balanced | Behavior::Unknown => Strategy::Balanced,
        }
    }

    pub fn plan(self) -> Plan {
        let plan = Plan::new(Remainder::FirstOwned);
        match self {
            Strategy::Aggressive => plan.stage(Share::Whole, attack_allocation()),
            Strategy::Defensive => plan.stage(Share::Whole, defend_allocation()),
            Strategy::Expansive => plan.stage(Share::Whole, expand_allocation()),
            Strategy::Balanced => plan
                .stage(Share::Divide(3), defend_allocation())
                .stage(Share::Divide(3), expand_allocation())
                .stage(Share::Rest, attack_allocation()),
        }
    }
}

fn attack_allocation() -> Allocation {
    Allocation::new(Candidates::ReachableEnemy, Cap::TroopsPlus(3))
}

fn defend_allocation() -> Allocation {
    Allocation::new(Candidates::Vulnerable, Cap::Fixed(5))
}

fn expand_allocation() -> Allocation {
    Allocation::new(Candidates::ReachableNeutral, Cap::TroopsPlus(1))
}

// ============================================================================
// GAME PHASES
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Early,
    Mid,
    Late,
}

impl Phase {
    pub fn of(turn: u32, ring: &RingState) -> Self {
        if turn < EARLY_TURN_LIMIT || ring.total_troops() < EARLY_TROOP_LIMIT {
            Phase::Early
        } else if turn < MID_TURN_LIMIT || ring.count(Owner::Mine) * 3 < ring.len() {
            Phase::Mid
        } else {
            Phase::Late
        }
    }
}

/// Late-game stance from relative troop strength
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stance {
    /// More than 20% stronger: overwhelm every enemy node
    FinishingPush,
    /// Below 80% of the enemy: hold the critical nodes
    DesperateDefense,
    Positional,
}

impl Stance {
    pub fn of(ring: &RingState) -> Self {
        let mine = ring.strength(Owner::Mine) as f64;
        let enemy = ring.strength(Owner::Enemy) as f64;
        if mine > enemy * 1.2 {
            Stance::FinishingPush
        } else if mine < enemy * 0.8 {
            Stance::DesperateDefense
        } else {
            Stance::Positional
        }
    }
}

/// Plan for the current phase of the game
pub fn phase_plan(phase: Phase, ring: &RingState) -> Plan {
    match phase {
        Phase::Early => early_plan(),
        Phase::Mid => mid_plan(ring),
        Phase::Late => match Stance::of(ring) {
            Stance::FinishingPush => Plan::new(Remainder::FirstOwned)
                .stage(Share::Whole, Allocation::new(Candidates::AnyEnemy, Cap::TroopsTimes(2))),
            Stance::DesperateDefense => Plan::new(Remainder::Keep).stage(
                Share::Whole,
                Allocation::new(Candidates::Critical { below: 3 }, Cap::Fixed(8)).sorted(SortKey::TroopsAscending),
            ),
            Stance::Positional => mid_plan(ring),
        },
    }
}

/// 80% on the cheapest reachable neutrals, the rest banked on the first owned node
fn early_plan() -> Plan {
    Plan::new(Remainder::FirstOwned).stage(
        Share::Fraction(0.8),
        Allocation::new(Candidates::ReachableNeutral, Cap::TroopsPlus(1))
            .sorted(SortKey::TroopsAscending)
            .exact(),
    )
}

/// 40% defence, 60% or 30% attack depending on strength, rest expansion
fn mid_plan(ring: &RingState) -> Plan {
    let attack_share = if ring.strength(Owner::Mine) > ring.strength(Owner::Enemy) {
        0.6
    } else {
        0.3
    };
    Plan::new(Remainder::FirstOwned)
        .stage(Share::Fraction(0.4), Allocation::new(Candidates::Vulnerable, Cap::Fixed(4)))
        .stage(
            Share::Fraction(attack_share),
            Allocation::new(Candidates::WeakReachableEnemy { below: 5 }, Cap::TroopsPlus(2))
                .sorted(SortKey::TroopsAscending),
        )
        .stage(Share::Rest, expand_allocation())
}
