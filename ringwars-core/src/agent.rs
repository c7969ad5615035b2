//! Agent roster and dispatch
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: AgentKind::decide() - one turn for any agent
//! - Level 2: random orders and the adaptive counter-strategy
//! - Level 3: the fixed heuristic plans
//! - Level 4: name parsing

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::allocator::{Allocation, Candidates, Cap, Plan, Remainder, Share, SortKey};
use crate::cluster::cluster_plan;
use crate::error::TurnError;
use crate::ring::{total_spent, MoveOrder, RingState};
use crate::session::AgentSession;
use crate::strategy::{phase_plan, Phase, Strategy};

/// Every agent the workspace knows how to play
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    Random,
    Basic,
    Defensive,
    Aggressive,
    Border,
    Expander,
    Conservative,
    Cluster,
    Adaptive,
    Strategic,
    Learning,
}

impl AgentKind {
    pub const ALL: [AgentKind; 11] = [
        AgentKind::Random,
        AgentKind::Basic,
        AgentKind::Defensive,
        AgentKind::Aggressive,
        AgentKind::Border,
        AgentKind::Expander,
        AgentKind::Conservative,
        AgentKind::Cluster,
        AgentKind::Adaptive,
        AgentKind::Strategic,
        AgentKind::Learning,
    ];

    /// Roster name, as used in results and on the command line
    pub const fn name(self) -> &'static str {
        match self {
            AgentKind::Random => "RandomAgent",
            AgentKind::Basic => "Agent",
            AgentKind::Defensive => "DefensiveAgent",
            AgentKind::Aggressive => "AggressiveAgent",
            AgentKind::Border => "BorderAgent",
            AgentKind::Expander => "ExpanderAgent",
            AgentKind::Conservative => "ConservativeAgent",
            AgentKind::Cluster => "ClusterAgent",
            AgentKind::Adaptive => "AdaptiveAgent",
            AgentKind::Strategic => "StrategicAgent",
            AgentKind::Learning => "LearningAgent",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            AgentKind::Random => "random positions and amounts until the budget is gone",
            AgentKind::Basic => "small random claims on neutrals, then small reinforcements",
            AgentKind::Defensive => "reinforces threatened nodes first",
            AgentKind::Aggressive => "attacks the weakest reachable enemies",
            AgentKind::Border => "holds the border in proportion to threat",
            AgentKind::Expander => "claims the cheapest neutrals at exact cost",
            AgentKind::Conservative => "keeps a reserve and only takes safe neutrals",
            AgentKind::Cluster => "builds up its strongest cluster and grows it",
            AgentKind::Adaptive => "counters the inferred opponent behaviour",
            AgentKind::Strategic => "plays an early, mid or late game plan",
            AgentKind::Learning => "scores moves with weights learned during play",
        }
    }

    // ========================================================================
    // LEVEL 1 - DISPATCH
    // ========================================================================

    /// Decide one turn; the returned orders never spend more than `budget`
    pub fn decide(
        self,
        ring: &RingState,
        budget: u32,
        turn: u32,
        session: &mut AgentSession,
    ) -> Result<Vec<MoveOrder>, TurnError> {
        let orders = match self {
            AgentKind::Random => random_orders(ring, budget, &mut session.rng),
            AgentKind::Learning => session.model.decide(ring, budget, turn, &mut session.rng),
            planned => planned
                .plan(ring, budget, turn, session)
                .execute(ring, budget, &mut session.rng),
        };

        check_budget(&orders, budget)?;
        Ok(orders)
    }

    /// Allocation plan for this turn.
    ///
    /// The random and learning agents pick their own orders and get an empty plan.
    pub fn plan(self, ring: &RingState, budget: u32, turn: u32, session: &mut AgentSession) -> Plan {
        match self {
            AgentKind::Basic => basic_plan(),
            AgentKind::Defensive => defensive_plan(),
            AgentKind::Aggressive => aggressive_plan(),
            AgentKind::Border => border_plan(),
            AgentKind::Expander => expander_plan(),
            AgentKind::Conservative => conservative_plan(),
            AgentKind::Cluster => cluster_plan(ring, budget),
            AgentKind::Adaptive => adaptive_plan(ring, turn, session),
            AgentKind::Strategic => {
                let phase = Phase::of(turn, ring);
                tracing::debug!("{} turn {}: {:?} phase", session.key, turn, phase);
                phase_plan(phase, ring)
            }
            AgentKind::Random | AgentKind::Learning => Plan::new(Remainder::Keep),
        }
    }
}

fn check_budget(orders: &[MoveOrder], budget: u32) -> Result<(), TurnError> {
    let spent = total_spent(orders);
    if spent > u64::from(budget) {
        return Err(TurnError::Overspend { spent, budget });
    }
    Ok(())
}

// ============================================================================
// LEVEL 2 - STATEFUL AGENTS
// ============================================================================

/// Pick a random node and a random amount of what is left, until nothing is left
fn random_orders<R: Rng + ?Sized>(ring: &RingState, budget: u32, rng: &mut R) -> Vec<MoveOrder> {
    let mut orders = Vec::new();
    let mut remaining = budget;
    while remaining > 0 && !ring.is_empty() {
        let position = rng.gen_range(0..ring.len());
        let amount = rng.gen_range(1..=remaining);
        orders.push(MoveOrder::new(position, amount));
        remaining -= amount;
    }
    orders
}

/// Record the opponent's view, classify it and play the counter-strategy
fn adaptive_plan(ring: &RingState, turn: u32, session: &mut AgentSession) -> Plan {
    session.history.observe(&session.key, ring);
    let behavior = session.history.classify(&session.key);
    let strategy = Strategy::select(behavior, turn);
    tracing::debug!(
        "{} turn {}: opponent {:?}, playing {:?}",
        session.key,
        turn,
        behavior,
        strategy
    );
    strategy.plan()
}

// ============================================================================
// LEVEL 3 - HEURISTIC PLANS
// ============================================================================

/// Random claims on every neutral, then small random reinforcements; leftovers are kept
fn basic_plan() -> Plan {
    Plan::new(Remainder::Keep)
        .stage(Share::Whole, Allocation::new(Candidates::AnyNeutral, Cap::Random { min: 1, max: 3 }))
        .stage(Share::Carry, Allocation::new(Candidates::Owned, Cap::Random { min: 1, max: 2 }))
}

fn defensive_plan() -> Plan {
    Plan::new(Remainder::Keep)
        .stage(
            Share::Whole,
            Allocation::new(Candidates::Threatened { below: 5 }, Cap::Fixed(5)).sorted(SortKey::TroopsAscending),
        )
        .stage(Share::Carry, Allocation::new(Candidates::Unthreatened { below: 5 }, Cap::Fixed(2)))
}

fn aggressive_plan() -> Plan {
    Plan::new(Remainder::RandomOwned)
        .stage(
            Share::Whole,
            Allocation::new(Candidates::ReachableEnemy, Cap::TroopsPlusRandom { min: 2, max: 6 })
                .sorted(SortKey::TroopsAscending),
        )
        .stage(
            Share::Carry,
            Allocation::new(Candidates::AnyNeutral, Cap::TroopsPlus(1)).sorted(SortKey::TroopsAscending),
        )
}

/// Three quarters for the border by threat, a quarter for expansion
fn border_plan() -> Plan {
    Plan::new(Remainder::MostThreatenedBorder)
        .stage(
            Share::Rest,
            Allocation::new(Candidates::Border, Cap::ThreatAtLeast(2)).sorted(SortKey::ThreatDescending),
        )
        .stage(Share::Divide(4), Allocation::new(Candidates::ReachableNeutral, Cap::TroopsPlus(2)))
}

fn expander_plan() -> Plan {
    Plan::new(Remainder::MostConnectedOwned)
        .stage(
            Share::Fraction(0.7),
            Allocation::new(Candidates::ReachableNeutral, Cap::TroopsPlus(1))
                .sorted(SortKey::TroopsAscending)
                .exact(),
        )
        .stage(
            Share::Rest,
            Allocation::new(Candidates::WeakOwned { below: 3 }, Cap::TopUpTo(3)).sorted(SortKey::TroopsAscending),
        )
}

/// The reserve of `max(2, B/5)` ends up on the safest owned node
fn conservative_plan() -> Plan {
    Plan::new(Remainder::SafestOwned)
        .stage(
            Share::Reserve { divisor: 5, floor: 2 },
            Allocation::new(Candidates::Critical { below: 3 }, Cap::Fixed(4)).sorted(SortKey::TroopsAscending),
        )
        .stage(
            Share::Carry,
            Allocation::new(Candidates::SafeNeutral { max_troops: 2 }, Cap::TroopsPlus(2))
                .sorted(SortKey::TroopsAscending)
                .exact(),
        )
}

// ============================================================================
// LEVEL 4 - NAMES
// ============================================================================

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown agent {0:?}")]
pub struct UnknownAgent(pub String);

impl FromStr for AgentKind {
    type Err = UnknownAgent;

    /// Accepts the roster name or its short form, in any case ("border", "BorderAgent")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted.is_empty() {
            return Err(UnknownAgent(s.to_string()));
        }
        AgentKind::ALL
            .into_iter()
            .find(|kind| {
                let name = kind.name().to_ascii_lowercase();
                name == wanted || name.strip_suffix("agent") == Some(wanted.as_str())
            })
            .or_else(|| (wanted == "basic").then_some(AgentKind::Basic))
            .ok_or_else(|| UnknownAgent(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::tests::ring;

    fn session() -> AgentSession {
        AgentSession::new("test", 5)
    }

    #[test]
    fn test_names_round_trip() {
        for kind in AgentKind::ALL {
            assert_eq!(kind.name().parse::<AgentKind>(), Ok(kind));
            assert_eq!(kind.name().to_uppercase().parse::<AgentKind>(), Ok(kind));
        }
        assert_eq!("border".parse::<AgentKind>(), Ok(AgentKind::Border));
        assert_eq!("basic".parse::<AgentKind>(), Ok(AgentKind::Basic));
        assert_eq!("agent".parse::<AgentKind>(), Ok(AgentKind::Basic));
        assert!("nobody".parse::<AgentKind>().is_err());
        assert!("".parse::<AgentKind>().is_err());
    }

    #[test]
    fn test_random_spends_exactly_budget() {
        let r = ring("YNE", &[1, 0, 1]);
        let orders = AgentKind::Random.decide(&r, 17, 1, &mut session()).unwrap();
        assert_eq!(total_spent(&orders), 17);
        assert!(orders.iter().all(|o| o.amount >= 1 && o.position < 3));
    }

    #[test]
    fn test_zero_budget_is_empty_for_everyone() {
        let r = ring("YYNEEN", &[3, 1, 0, 2, 6, 1]);
        for kind in AgentKind::ALL {
            let orders = kind.decide(&r, 0, 3, &mut session()).unwrap();
            assert!(orders.is_empty(), "{kind} emitted {orders:?}");
        }
    }

    #[test]
    fn test_defensive_reinforces_threatened_first() {
        // 0: exposed 9 troops, 2: 1 troop (weak), 3: safe 8 troops
        let r = ring("YEYYN", &[9, 4, 1, 8, 0]);
        let orders = AgentKind::Defensive.decide(&r, 13, 1, &mut session()).unwrap();
        assert_eq!(
            orders,
            vec![MoveOrder::new(2, 5), MoveOrder::new(0, 5), MoveOrder::new(3, 2)]
        );
    }

    #[test]
    fn test_border_splits_defence_and_expansion() {
        // 1 touches E(4) and Y, 2 touches Y and N
        let r = ring("EYYNN", &[4, 2, 2, 1, 0]);
        let orders = AgentKind::Border.decide(&r, 8, 1, &mut session()).unwrap();
        assert_eq!(
            orders,
            vec![
                // defence pool 6: threat 4 then threat max(1, 2)
                MoveOrder::new(1, 4),
                MoveOrder::new(2, 2),
                // expansion pool 2: 3 costs 3, clamped
                MoveOrder::new(3, 2),
            ]
        );
    }

    #[test]
    fn test_expander_tops_up_weak_nodes() {
        let r = ring("NYYNE", &[0, 1, 5, 4, 2]);
        let orders = AgentKind::Expander.decide(&r, 10, 1, &mut session()).unwrap();
        // 7 for expansion: 0 costs 1, 3 costs 5; node 1 is topped up to 3, the
        // rest lands on the first of the two equally connected nodes
        assert_eq!(
            orders,
            vec![
                MoveOrder::new(0, 1),
                MoveOrder::new(3, 5),
                MoveOrder::new(1, 2),
                MoveOrder::new(1, 2),
            ]
        );
    }

    #[test]
    fn test_conservative_keeps_reserve_for_safest() {
        // 1 is critical (E neighbour, 2 troops); 3 is a safe neutral
        let r = ring("EYYNN", &[5, 2, 6, 1, 0]);
        let orders = AgentKind::Conservative.decide(&r, 10, 1, &mut session()).unwrap();
        // reserve max(2, 2) = 2; 4 to node 1, 3 to node 3, then 1 + 2 to node 2
        assert_eq!(
            orders,
            vec![MoveOrder::new(1, 4), MoveOrder::new(3, 3), MoveOrder::new(2, 3)]
        );
    }

    #[test]
    fn test_aggressive_remainder_goes_to_owned() {
        let r = ring("YNN", &[3, 0, 0]);
        let orders = AgentKind::Aggressive.decide(&r, 9, 1, &mut session()).unwrap();
        assert_eq!(orders[..2], [MoveOrder::new(1, 1), MoveOrder::new(2, 1)]);
        assert_eq!(orders[2], MoveOrder::new(0, 7));
    }

    #[test]
    fn test_adaptive_records_history() {
        let r = ring("YNE", &[4, 0, 4]);
        let mut s = session();
        for turn in 1..=4 {
            AgentKind::Adaptive.decide(&r, 6, turn, &mut s).unwrap();
        }
        assert_eq!(s.history.len("test"), 4);
    }

    #[test]
    fn test_learning_keeps_one_order_per_position() {
        let r = ring("YNEYNN", &[3, 0, 2, 5, 1, 0]);
        let mut s = session();
        for turn in 1..30 {
            let orders = AgentKind::Learning.decide(&r, 12, turn, &mut s).unwrap();
            let mut seen = vec![false; r.len()];
            for o in &orders {
                assert!(!seen[o.position]);
                seen[o.position] = true;
            }
        }
        assert_eq!(s.model.samples().len(), 29);
    }

    #[test]
    fn test_overspend_is_rejected() {
        let err = check_budget(&[MoveOrder::new(0, 4), MoveOrder::new(1, 4)], 7).unwrap_err();
        assert!(matches!(err, TurnError::Overspend { spent: 8, budget: 7 }));
    }
}
