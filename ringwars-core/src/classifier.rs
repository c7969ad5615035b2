//! Opponent behaviour classification from a rolling history of encoded states

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::ring::RingState;

/// Fewest observed states needed before a verdict is returned
pub const MIN_HISTORY: usize = 3;

/// Inferred play style of the opponent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Behavior {
    Aggressive,
    Defensive,
    Expansive,
    Balanced,
    Unknown,
}

/// Encoded states seen so far, per opponent-location key
#[derive(Clone, Debug, Default)]
pub struct OpponentHistory {
    records: FxHashMap<String, Vec<String>>,
}

impl OpponentHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the encoding of `ring` to the key's history
    pub fn observe(&mut self, key: &str, ring: &RingState) {
        self.records.entry(key.to_string()).or_default().push(ring.encode());
    }

    pub fn len(&self, key: &str) -> usize {
        self.records.get(key).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, key: &str) -> bool {
        self.len(key) == 0
    }

    pub fn states(&self, key: &str) -> &[String] {
        self.records.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn classify(&self, key: &str) -> Behavior {
        classify_states(self.states(key))
    }
}

/// Tally the three detectors over consecutive pairs and pick a verdict
pub fn classify_states(history: &[String]) -> Behavior {
    if history.len() < MIN_HISTORY {
        return Behavior::Unknown;
    }

    let mut aggressive = 0u32;
    let mut defensive = 0u32;
    let mut expansive = 0u32;
    for pair in history.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        if is_aggression(prev, curr) {
            aggressive += 1;
        }
        if is_defensiveness(prev, curr) {
            defensive += 1;
        }
        if is_expansion(prev, curr) {
            expansive += 1;
        }
    }

    if aggressive > defensive && aggressive > expansive {
        Behavior::Aggressive
    } else if defensive > expansive {
        Behavior::Defensive
    } else if expansive > 0 {
        Behavior::Expansive
    } else {
        Behavior::Balanced
    }
}

fn is_aggression(prev: &str, curr: &str) -> bool {
    curr.len() > prev.len() && curr.contains('E')
}

fn is_defensiveness(prev: &str, curr: &str) -> bool {
    curr.contains('Y') && prev.contains('Y')
}

fn is_expansion(prev: &str, curr: &str) -> bool {
    curr.contains('N') && !prev.contains('N')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::tests::ring;

    fn states(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unknown_below_three_states() {
        let mut history = OpponentHistory::new();
        let r = ring("YEN", &[3, 3, 0]);
        for expected_len in 0..MIN_HISTORY {
            assert_eq!(history.len("red"), expected_len);
            assert_eq!(history.classify("red"), Behavior::Unknown);
            history.observe("red", &r);
        }
        assert_ne!(history.classify("red"), Behavior::Unknown);
    }

    #[test]
    fn test_keys_are_independent() {
        let mut history = OpponentHistory::new();
        let r = ring("YE", &[1, 1]);
        for _ in 0..3 {
            history.observe("red", &r);
        }
        assert_eq!(history.len("blue"), 0);
        assert_eq!(history.classify("blue"), Behavior::Unknown);
        assert_eq!(history.states("red")[0], "Y1,E1,");
    }

    #[test]
    fn test_growing_enemy_encoding_is_aggressive() {
        // Longer encodings with an enemy, no Y, no new N
        let h = states(&["E1,", "E10,", "E100,", "E1000,"]);
        assert_eq!(classify_states(&h), Behavior::Aggressive);
    }

    #[test]
    fn test_holding_territory_is_defensive() {
        let h = states(&["Y5,E5,", "Y5,E5,", "Y6,E4,"]);
        assert_eq!(classify_states(&h), Behavior::Defensive);
    }

    #[test]
    fn test_new_neutral_is_expansive() {
        // Each pair: no growth, no Y; neutral appears once
        let h = states(&["E5,E5,", "E5,N0,", "E5,E5,"]);
        assert_eq!(classify_states(&h), Behavior::Expansive);
    }

    #[test]
    fn test_nothing_detected_is_balanced() {
        let h = states(&["E5,", "E5,", "E5,"]);
        assert_eq!(classify_states(&h), Behavior::Balanced);
    }

    #[test]
    fn test_aggression_tie_falls_through() {
        // aggression 2, defensiveness 2 -> not strictly greater, defensive beats expansion
        let h = states(&["Y1,E1,", "Y10,E1,", "Y100,E1,"]);
        assert_eq!(classify_states(&h), Behavior::Defensive);
    }
}
