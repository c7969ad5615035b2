//! Per-agent mutable state carried between decisions

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::classifier::OpponentHistory;
use crate::learning::LearningModel;

/// Everything an agent remembers between turns.
///
/// A session lives for one match by default, or for a whole tournament when
/// the runner is configured that way. Nothing in it is shared across sessions.
#[derive(Clone, Debug)]
pub struct AgentSession {
    /// Identifies the agent's working location; classifier history is keyed on it
    pub key: String,
    pub rng: ChaCha8Rng,
    pub history: OpponentHistory,
    pub model: LearningModel,
}

impl AgentSession {
    pub fn new(key: impl Into<String>, seed: u64) -> Self {
        Self {
            key: key.into(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            history: OpponentHistory::new(),
            model: LearningModel::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = AgentSession::new("red", 42);
        let mut b = AgentSession::new("red", 42);
        let xs: Vec<u32> = (0..8).map(|_| a.rng.gen_range(0..100)).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.rng.gen_range(0..100)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = AgentSession::new("blue", 1);
        assert_eq!(session.key, "blue");
        assert!(session.history.is_empty("blue"));
        assert!(session.model.samples().is_empty());
    }
}
