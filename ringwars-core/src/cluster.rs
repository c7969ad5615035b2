//! Cluster analysis - connected runs of same-owner nodes around the ring

use crate::allocator::{first_max_by_key, Allocation, Candidates, Cap, Plan, Remainder, Share};
use crate::ring::{Owner, RingState};

/// Share of the budget spent on the strongest cluster
pub const CLUSTER_SHARE: f64 = 0.6;
/// Top-up given to each non-centre member
pub const MEMBER_BOOST: u32 = 3;

/// Two or more ring-adjacent nodes with the same owner, in flood-fill visit order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cluster {
    pub members: Vec<usize>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, position: usize) -> bool {
        self.members.contains(&position)
    }

    /// Sum of member troops
    pub fn strength(&self, ring: &RingState) -> u64 {
        self.members.iter().map(|&i| u64::from(ring.troops(i))).sum()
    }

    /// Member with the most troops; the earliest visited wins ties
    pub fn center(&self, ring: &RingState) -> Option<usize> {
        first_max_by_key(self.members.iter().copied(), |i| i64::from(ring.troops(i)))
    }
}

/// Flood-fill every run of `owner` nodes, keeping those with at least two members.
///
/// The fill visits the left neighbour before the right one, so a run crossing
/// position 0 is found from its lowest index and walks backwards first.
pub fn find_clusters(ring: &RingState, owner: Owner) -> Vec<Cluster> {
    let mut visited = vec![false; ring.len()];
    let mut clusters = Vec::new();

    for start in 0..ring.len() {
        if visited[start] || !ring.is(start, owner) {
            continue;
        }
        let mut members = Vec::new();
        let mut stack = vec![start];
        while let Some(pos) = stack.pop() {
            if visited[pos] || !ring.is(pos, owner) {
                continue;
            }
            visited[pos] = true;
            members.push(pos);
            stack.push(ring.right(pos));
            stack.push(ring.left(pos));
        }
        if members.len() >= 2 {
            clusters.push(Cluster { members });
        }
    }
    clusters
}

/// Stable sort, strongest cluster first
pub fn rank_by_strength(ring: &RingState, clusters: &mut [Cluster]) {
    clusters.sort_by_key(|c| std::cmp::Reverse(c.strength(ring)));
}

/// Distinct neutral neighbours of all clusters, cheapest first
pub fn expansion_frontier(ring: &RingState, clusters: &[Cluster]) -> Vec<usize> {
    let mut frontier: Vec<usize> = Vec::new();
    for cluster in clusters {
        for &pos in &cluster.members {
            for n in ring.neighbors(pos) {
                if ring.is(n, Owner::Neutral) && !frontier.contains(&n) {
                    frontier.push(n);
                }
            }
        }
    }
    frontier.sort_by_key(|&i| ring.troops(i));
    frontier
}

/// Reinforce the strongest cluster, then claim its frontier
pub fn cluster_plan(ring: &RingState, budget: u32) -> Plan {
    let mut clusters = find_clusters(ring, Owner::Mine);
    rank_by_strength(ring, &mut clusters);

    let (center, others) = match clusters.first() {
        Some(strongest) => {
            let center = strongest.center(ring);
            let others = strongest
                .members
                .iter()
                .copied()
                .filter(|&p| Some(p) != center)
                .collect();
            (center.into_iter().collect(), others)
        }
        None => (Vec::new(), Vec::new()),
    };
    let frontier = expansion_frontier(ring, &clusters);

    Plan::new(Remainder::StrongestOwned)
        .stage(
            Share::Fraction(CLUSTER_SHARE),
            Allocation::new(Candidates::Explicit(center), Cap::Fixed(budget / 2)),
        )
        .stage(
            Share::Carry,
            Allocation::new(Candidates::Explicit(others), Cap::Fixed(MEMBER_BOOST)),
        )
        .stage(
            Share::Rest,
            Allocation::new(Candidates::Explicit(frontier), Cap::TroopsPlus(1)).exact(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::tests::ring;
    use crate::ring::{total_spent, MoveOrder};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_cluster_wraps_around() {
        let r = ring("YYNYEYY", &[5, 2, 0, 1, 3, 8, 1]);
        let clusters = find_clusters(&r, Owner::Mine);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members, vec![0, 6, 5, 1]);
        assert!(!clusters[0].contains(3));
        assert_eq!(clusters[0].strength(&r), 16);
        assert_eq!(clusters[0].center(&r), Some(5));
    }

    #[test]
    fn test_singletons_are_dropped() {
        let r = ring("YNYNEE", &[1, 0, 1, 0, 2, 2]);
        assert!(find_clusters(&r, Owner::Mine).is_empty());
        let enemy = find_clusters(&r, Owner::Enemy);
        assert_eq!(enemy, vec![Cluster { members: vec![4, 5] }]);
    }

    #[test]
    fn test_whole_ring_is_one_cluster() {
        let r = ring("YYYY", &[1, 1, 1, 1]);
        let clusters = find_clusters(&r, Owner::Mine);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 4);
    }

    #[test]
    fn test_center_tie_keeps_first_visited() {
        let r = ring("YYN", &[4, 4, 0]);
        // visit order from 0 is 0 then 1 (left of 0 is the neutral node 2)
        let clusters = find_clusters(&r, Owner::Mine);
        assert_eq!(clusters[0].center(&r), Some(0));
    }

    #[test]
    fn test_frontier_is_distinct_and_cheapest_first() {
        let r = ring("NYYNYYNN", &[3, 1, 1, 1, 1, 1, 0, 2]);
        let clusters = find_clusters(&r, Owner::Mine);
        assert_eq!(clusters.len(), 2);
        // 3 borders both clusters but is listed once
        assert_eq!(expansion_frontier(&r, &clusters), vec![6, 3, 0]);
    }

    #[test]
    fn test_rank_by_strength_is_stable() {
        let r = ring("YYNYYNYYYN", &[2, 1, 0, 3, 3, 0, 1, 1, 1, 0]);
        let mut clusters = find_clusters(&r, Owner::Mine);
        rank_by_strength(&r, &mut clusters);
        // [0, 1] and [6, 7, 8] both hold 3 troops
        assert_eq!(clusters[0].members, vec![3, 4]);
        assert_eq!(clusters[1].members, vec![0, 1]);
        assert_eq!(clusters[2].members, vec![6, 7, 8]);
    }

    #[test]
    fn test_cluster_plan() {
        let r = ring("YYNYEYY", &[5, 2, 0, 1, 3, 8, 1]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let orders = cluster_plan(&r, 10).execute(&r, 10, &mut rng);
        assert_eq!(
            orders,
            vec![
                MoveOrder::new(5, 5),
                MoveOrder::new(0, 1),
                MoveOrder::new(2, 1),
                MoveOrder::new(5, 3),
            ]
        );
        assert_eq!(total_spent(&orders), 10);
    }

    #[test]
    fn test_cluster_plan_without_clusters() {
        let r = ring("YNENN", &[2, 0, 1, 0, 0]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let orders = cluster_plan(&r, 7).execute(&r, 7, &mut rng);
        assert_eq!(orders, vec![MoveOrder::new(0, 7)]);
    }
}
