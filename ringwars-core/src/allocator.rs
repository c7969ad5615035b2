//! Budget allocation - the shared spending algorithm behind every heuristic agent
//!
//! An [`Allocation`] names which nodes are eligible, the order they are visited in,
//! how much each may receive and whether a partial amount is acceptable. A [`Plan`]
//! splits one turn's budget across several allocations and disposes of whatever is
//! left with a [`Remainder`] policy.
//!
//! Whatever the configuration, a plan never spends more than its budget.

use std::cmp::Reverse;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::ring::{MoveOrder, Owner, RingState};

// ============================================================================
// CANDIDATE SELECTION
// ============================================================================

/// Which nodes an allocation may target
#[derive(Clone, Debug, PartialEq)]
pub enum Candidates {
    /// Neutral nodes next to one of ours
    ReachableNeutral,
    /// Every neutral node
    AnyNeutral,
    /// Enemy nodes next to one of ours
    ReachableEnemy,
    /// Reachable enemy nodes holding fewer than `below` troops
    WeakReachableEnemy { below: u32 },
    /// Every enemy node
    AnyEnemy,
    /// Every owned node
    Owned,
    /// Owned nodes next to an enemy or holding fewer than `below` troops
    Threatened { below: u32 },
    /// Owned nodes that are not [`Candidates::Threatened`]
    Unthreatened { below: u32 },
    /// Owned nodes next to an enemy
    Vulnerable,
    /// Owned nodes next to an enemy and holding fewer than `below` troops
    Critical { below: u32 },
    /// Owned nodes holding fewer than `below` troops
    WeakOwned { below: u32 },
    /// Owned nodes with a neighbour we don't own
    Border,
    /// Reachable neutral nodes with no enemy neighbour and at most `max_troops`
    SafeNeutral { max_troops: u32 },
    /// A precomputed list, visited as given
    Explicit(Vec<usize>),
}

impl Candidates {
    /// Eligible positions in ring order (explicit lists keep their own order)
    pub fn select(&self, ring: &RingState) -> Vec<usize> {
        if let Candidates::Explicit(positions) = self {
            return positions.iter().copied().filter(|&p| p < ring.len()).collect();
        }
        (0..ring.len()).filter(|&i| self.accepts(ring, i)).collect()
    }

    fn accepts(&self, ring: &RingState, i: usize) -> bool {
        let owner = ring.owner(i);
        let troops = ring.troops(i);
        match *self {
            Candidates::ReachableNeutral => owner == Owner::Neutral && ring.is_reachable(i),
            Candidates::AnyNeutral => owner == Owner::Neutral,
            Candidates::ReachableEnemy => owner == Owner::Enemy && ring.is_reachable(i),
            Candidates::WeakReachableEnemy { below } => {
                owner == Owner::Enemy && ring.is_reachable(i) && troops < below
            }
            Candidates::AnyEnemy => owner == Owner::Enemy,
            Candidates::Owned => owner == Owner::Mine,
            Candidates::Threatened { below } => {
                owner == Owner::Mine && (ring.is_exposed(i) || troops < below)
            }
            Candidates::Unthreatened { below } => {
                owner == Owner::Mine && !(ring.is_exposed(i) || troops < below)
            }
            Candidates::Vulnerable => owner == Owner::Mine && ring.is_exposed(i),
            Candidates::Critical { below } => owner == Owner::Mine && ring.is_exposed(i) && troops < below,
            Candidates::WeakOwned { below } => owner == Owner::Mine && troops < below,
            Candidates::Border => ring.is_border(i),
            Candidates::SafeNeutral { max_troops } => {
                owner == Owner::Neutral && ring.is_reachable(i) && !ring.is_exposed(i) && troops <= max_troops
            }
            Candidates::Explicit(ref positions) => positions.contains(&i),
        }
    }
}

/// Visiting order for candidates (all sorts are stable, ties keep ring order)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    Position,
    TroopsAscending,
    TroopsDescending,
    ThreatDescending,
}

impl SortKey {
    pub fn apply(self, ring: &RingState, positions: &mut [usize]) {
        match self {
            SortKey::Position => {}
            SortKey::TroopsAscending => positions.sort_by_key(|&i| ring.troops(i)),
            SortKey::TroopsDescending => positions.sort_by_key(|&i| Reverse(ring.troops(i))),
            SortKey::ThreatDescending => positions.sort_by_key(|&i| Reverse(ring.border_threat(i))),
        }
    }
}

/// Most a single candidate may receive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cap {
    Fixed(u32),
    /// Target troops plus a constant (claim / attack cost)
    TroopsPlus(u32),
    /// Target troops plus a random margin in `min..=max`
    TroopsPlusRandom { min: u32, max: u32 },
    TroopsTimes(u32),
    /// Border threat, but never less than the floor
    ThreatAtLeast(u32),
    /// Enough to bring the node up to the given level
    TopUpTo(u32),
    /// Random amount in `min..=max`
    Random { min: u32, max: u32 },
}

impl Cap {
    pub fn amount<R: Rng + ?Sized>(self, ring: &RingState, i: usize, rng: &mut R) -> u32 {
        let troops = ring.troops(i);
        match self {
            Cap::Fixed(n) => n,
            Cap::TroopsPlus(k) => troops.saturating_add(k),
            Cap::TroopsPlusRandom { min, max } => troops.saturating_add(rng.gen_range(min..=max)),
            Cap::TroopsTimes(k) => troops.saturating_mul(k),
            Cap::ThreatAtLeast(floor) => ring.border_threat(i).max(floor),
            Cap::TopUpTo(level) => level.saturating_sub(troops),
            Cap::Random { min, max } => rng.gen_range(min..=max),
        }
    }
}

/// What to do when a candidate's cap exceeds what is left
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fit {
    /// Spend whatever is left, up to the cap
    Clamp,
    /// Spend the full cap or skip the candidate
    Exact,
}

/// One parameterisation of the allocation algorithm
#[derive(Clone, Debug, PartialEq)]
pub struct Allocation {
    pub candidates: Candidates,
    pub sort: SortKey,
    pub cap: Cap,
    pub fit: Fit,
}

impl Allocation {
    /// Visit candidates in ring order, clamping each to a fixed cap
    pub fn new(candidates: Candidates, cap: Cap) -> Self {
        Self {
            candidates,
            sort: SortKey::Position,
            cap,
            fit: Fit::Clamp,
        }
    }

    pub fn sorted(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Only accept candidates whose full cap fits
    pub fn exact(mut self) -> Self {
        self.fit = Fit::Exact;
        self
    }
}

/// Run one allocation against `budget`, appending orders; returns the unspent budget
pub fn allocate<R: Rng + ?Sized>(
    ring: &RingState,
    allocation: &Allocation,
    budget: u32,
    rng: &mut R,
    orders: &mut Vec<MoveOrder>,
) -> u32 {
    let mut positions = allocation.candidates.select(ring);
    allocation.sort.apply(ring, &mut positions);

    let mut remaining = budget;
    for position in positions {
        if remaining == 0 {
            break;
        }
        let cap = allocation.cap.amount(ring, position, rng);
        let amount = match allocation.fit {
            Fit::Clamp => cap.min(remaining),
            Fit::Exact if cap <= remaining => cap,
            Fit::Exact => continue,
        };
        if amount == 0 {
            continue;
        }
        orders.push(MoveOrder::new(position, amount));
        remaining -= amount;
    }
    remaining
}

// ============================================================================
// PLANS
// ============================================================================

/// How much of the turn budget a stage may spend
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Share {
    /// The whole turn budget
    Whole,
    /// Whatever the previous stage left unspent
    Carry,
    /// `floor(budget * f)`
    Fraction(f64),
    /// `budget / d`
    Divide(u32),
    /// The budget minus every `Fraction` and `Divide` share in the plan
    Rest,
    /// The budget minus a reserve of `max(floor, budget / divisor)`
    Reserve { divisor: u32, floor: u32 },
}

/// Where leftover budget goes once every stage has run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Remainder {
    /// Leave it unspent
    Keep,
    FirstOwned,
    StrongestOwned,
    SafestOwned,
    MostConnectedOwned,
    RandomOwned,
    /// The border node with the highest threat
    MostThreatenedBorder,
}

impl Remainder {
    /// Node receiving the leftover, if any qualifies (ties go to the lowest position)
    pub fn target<R: Rng + ?Sized>(self, ring: &RingState, rng: &mut R) -> Option<usize> {
        let owned = ring.positions(Owner::Mine);
        match self {
            Remainder::Keep => None,
            Remainder::FirstOwned => owned.first().copied(),
            Remainder::StrongestOwned => first_max_by_key(owned, |i| i64::from(ring.troops(i))),
            Remainder::SafestOwned => first_max_by_key(owned, |i| ring.safety(i)),
            Remainder::MostConnectedOwned => first_max_by_key(owned, |i| i64::from(ring.connectivity(i))),
            Remainder::RandomOwned => owned.choose(rng).copied(),
            Remainder::MostThreatenedBorder => first_max_by_key(
                owned.into_iter().filter(|&i| ring.is_border(i)),
                |i| i64::from(ring.border_threat(i)),
            ),
        }
    }
}

/// Highest-keyed position, keeping the earliest on ties
pub(crate) fn first_max_by_key<I, F>(positions: I, key: F) -> Option<usize>
where
    I: IntoIterator<Item = usize>,
    F: Fn(usize) -> i64,
{
    let mut best: Option<(usize, i64)> = None;
    for position in positions {
        let k = key(position);
        match best {
            Some((_, best_key)) if best_key >= k => {}
            _ => best = Some((position, k)),
        }
    }
    best.map(|(position, _)| position)
}

/// A stage of a plan
#[derive(Clone, Debug, PartialEq)]
pub struct Stage {
    pub share: Share,
    pub allocation: Allocation,
}

/// A full turn: budget shares, allocations and a remainder policy
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    pub stages: Vec<Stage>,
    pub remainder: Remainder,
}

impl Plan {
    pub fn new(remainder: Remainder) -> Self {
        Self {
            stages: Vec::new(),
            remainder,
        }
    }

    pub fn stage(mut self, share: Share, allocation: Allocation) -> Self {
        self.stages.push(Stage { share, allocation });
        self
    }

    /// Run every stage in order, then dispose of `budget - spent`
    pub fn execute<R: Rng + ?Sized>(&self, ring: &RingState, budget: u32, rng: &mut R) -> Vec<MoveOrder> {
        let partitioned: u32 = self
            .stages
            .iter()
            .map(|stage| match stage.share {
                Share::Fraction(f) => fraction_of(budget, f),
                Share::Divide(d) => budget.checked_div(d).unwrap_or(0),
                _ => 0,
            })
            .sum();

        let mut orders = Vec::new();
        let mut spent = 0u32;
        let mut carry = budget;

        for stage in &self.stages {
            let share = match stage.share {
                Share::Whole => budget,
                Share::Carry => carry,
                Share::Fraction(f) => fraction_of(budget, f),
                Share::Divide(d) => budget.checked_div(d).unwrap_or(0),
                Share::Rest => budget.saturating_sub(partitioned),
                Share::Reserve { divisor, floor } => {
                    budget.saturating_sub(floor.max(budget.checked_div(divisor).unwrap_or(0)))
                }
            };
            let pool = share.min(budget - spent);
            carry = allocate(ring, &stage.allocation, pool, rng, &mut orders);
            spent += pool - carry;
        }

        let leftover = budget - spent;
        if leftover > 0 {
            if let Some(target) = self.remainder.target(ring, rng) {
                orders.push(MoveOrder::new(target, leftover));
            }
        }
        orders
    }
}

/// `floor(budget * f)`, clamped to the budget
pub fn fraction_of(budget: u32, f: f64) -> u32 {
    ((f64::from(budget) * f).floor().max(0.0) as u32).min(budget)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::tests::ring;
    use crate::ring::total_spent;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn test_clamp_stops_when_budget_runs_out() {
        let r = ring("YENEN", &[4, 2, 0, 6, 0]);
        let alloc = Allocation::new(Candidates::ReachableEnemy, Cap::TroopsPlus(3));
        let mut orders = Vec::new();
        let left = allocate(&r, &alloc, 7, &mut rng(), &mut orders);
        // 1 -> 5, then 3 is enemy but its neighbours are N and N, so unreachable
        assert_eq!(orders, vec![MoveOrder::new(1, 5)]);
        assert_eq!(left, 2);
    }

    #[test]
    fn test_exact_skips_unaffordable() {
        let r = ring("NYNNNYN", &[5, 1, 1, 0, 0, 1, 0]);
        let alloc = Allocation::new(Candidates::ReachableNeutral, Cap::TroopsPlus(1))
            .sorted(SortKey::TroopsDescending)
            .exact();
        let mut orders = Vec::new();
        let left = allocate(&r, &alloc, 3, &mut rng(), &mut orders);
        // 0 costs 6 and is skipped; 2 costs 2; 4 and 6 cost 1 each but only 1 left
        assert_eq!(orders, vec![MoveOrder::new(2, 2), MoveOrder::new(4, 1)]);
        assert_eq!(left, 0);
    }

    #[test]
    fn test_zero_amounts_are_not_emitted() {
        let r = ring("YEE", &[5, 0, 2]);
        let alloc = Allocation::new(Candidates::AnyEnemy, Cap::TroopsTimes(2));
        let mut orders = Vec::new();
        allocate(&r, &alloc, 10, &mut rng(), &mut orders);
        assert_eq!(orders, vec![MoveOrder::new(2, 4)]);
    }

    #[test]
    fn test_threat_sort_is_stable() {
        let r = ring("EYYNYE", &[3, 1, 1, 0, 1, 3]);
        let mut positions = Candidates::Border.select(&r);
        SortKey::ThreatDescending.apply(&r, &mut positions);
        // 1: E(3)+Y -> 3, 2: Y+N -> 1, 4: N+E(3) -> 4
        assert_eq!(positions, vec![4, 1, 2]);
    }

    #[test]
    fn test_rest_share_excludes_partitions() {
        let r = ring("YNNNNNNNNN", &[1; 10]);
        let plan = Plan::new(Remainder::Keep)
            .stage(Share::Rest, Allocation::new(Candidates::Owned, Cap::Fixed(100)))
            .stage(Share::Divide(4), Allocation::new(Candidates::Owned, Cap::Fixed(100)));
        let orders = plan.execute(&r, 10, &mut rng());
        assert_eq!(orders, vec![MoveOrder::new(0, 8), MoveOrder::new(0, 2)]);
    }

    #[test]
    fn test_reserve_share_and_remainder() {
        let r = ring("YYE", &[1, 9, 4]);
        let plan = Plan::new(Remainder::StrongestOwned)
            .stage(Share::Reserve { divisor: 5, floor: 2 }, Allocation::new(Candidates::Owned, Cap::Fixed(1)));
        let orders = plan.execute(&r, 10, &mut rng());
        assert_eq!(orders, vec![MoveOrder::new(0, 1), MoveOrder::new(1, 1), MoveOrder::new(1, 8)]);
        assert_eq!(total_spent(&orders), 10);

        // a reserve bigger than the budget leaves nothing for the stage
        let orders = plan.execute(&r, 1, &mut rng());
        assert_eq!(orders, vec![MoveOrder::new(1, 1)]);
    }

    #[test]
    fn test_overlapping_shares_never_overspend() {
        let r = ring("YN", &[1, 0]);
        let plan = Plan::new(Remainder::FirstOwned)
            .stage(Share::Whole, Allocation::new(Candidates::Owned, Cap::Fixed(6)))
            .stage(Share::Whole, Allocation::new(Candidates::ReachableNeutral, Cap::Fixed(6)));
        let orders = plan.execute(&r, 8, &mut rng());
        assert_eq!(total_spent(&orders), 8);
    }

    #[test]
    fn test_remainder_targets() {
        let r = ring("YEYYNY", &[2, 9, 5, 5, 0, 1]);
        let mut g = rng();
        assert_eq!(Remainder::FirstOwned.target(&r, &mut g), Some(0));
        assert_eq!(Remainder::StrongestOwned.target(&r, &mut g), Some(2));
        assert_eq!(Remainder::MostConnectedOwned.target(&r, &mut g), Some(0));
        assert_eq!(Remainder::SafestOwned.target(&r, &mut g), Some(3));
        assert_eq!(Remainder::MostThreatenedBorder.target(&r, &mut g), Some(0));
        assert_eq!(Remainder::Keep.target(&r, &mut g), None);
        let random = Remainder::RandomOwned.target(&r, &mut g).unwrap();
        assert_eq!(r.owner(random), Owner::Mine);
    }

    #[test]
    fn test_no_owned_nodes_keeps_remainder() {
        let r = ring("NNE", &[0, 0, 3]);
        let plan = Plan::new(Remainder::FirstOwned)
            .stage(Share::Whole, Allocation::new(Candidates::ReachableNeutral, Cap::TroopsPlus(1)));
        assert!(plan.execute(&r, 5, &mut rng()).is_empty());
    }

    #[test]
    fn test_fraction_of() {
        assert_eq!(fraction_of(10, 0.5), 5);
        assert_eq!(fraction_of(5, 0.8), 4);
        assert_eq!(fraction_of(3, 0.6), 1);
        assert_eq!(fraction_of(0, 0.5), 0);
    }
}
