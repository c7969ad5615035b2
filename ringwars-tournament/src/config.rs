//! Configuration types for match and tournament play
//!
//! Level 4 - Utilities and configuration

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Seed used when none is configured
pub const DEFAULT_SEED: u64 = 42;

/// Game and scheduling parameters, loadable from JSON with every field optional
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Number of nodes on the ring
    pub ring_size: usize,
    /// Troops on each side's starting node
    pub starting_soldiers: u32,
    /// Cap on a side's total troops
    pub max_soldiers: u32,
    /// Ring steps a side can see beyond its own nodes
    pub visibility_range: usize,
    /// Troops granted every turn
    pub growth_per_turn: u32,
    /// Extra troops scaled by the share of the ring a side holds
    pub bonus_growth_per_turn: u32,
    pub max_turns: u32,
    pub matches_per_pair: u32,
    /// Play one extra match per pair with the sides swapped
    pub reverse_matches: bool,
    /// Random seed for reproducibility (None = default seed)
    pub seed: Option<u64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            ring_size: 15,
            starting_soldiers: 50,
            max_soldiers: 10000,
            visibility_range: 5,
            growth_per_turn: 10,
            bonus_growth_per_turn: 5,
            max_turns: 100,
            matches_per_pair: 3,
            reverse_matches: true,
            seed: None,
        }
    }
}

impl MatchConfig {
    /// Default game on a ring of the given size and turn limit
    pub fn new(ring_size: usize, max_turns: u32) -> Self {
        Self {
            ring_size,
            max_turns,
            ..Default::default()
        }
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn base_seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config JSON: {}", path.display()))?;
        Ok(config)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// How long an agent session lives
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionScope {
    /// Fresh session per agent per match
    #[default]
    Match,
    /// One session per agent for the whole tournament; forces sequential play
    Tournament,
}

/// Tournament configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TournamentConfig {
    pub match_config: MatchConfig,
    /// Whether to run matches in parallel
    pub parallel: bool,
    pub session_scope: SessionScope,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            match_config: MatchConfig::default(),
            parallel: true,
            session_scope: SessionScope::Match,
        }
    }
}

impl TournamentConfig {
    pub fn new(match_config: MatchConfig) -> Self {
        Self {
            match_config,
            ..Default::default()
        }
    }

    /// Run matches one after another
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Keep agent sessions alive across matches
    pub fn with_tournament_memory(mut self) -> Self {
        self.session_scope = SessionScope::Tournament;
        self
    }

    /// Parallel execution only when no session outlives its match
    pub fn runs_parallel(&self) -> bool {
        self.parallel && self.session_scope == SessionScope::Match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_config_defaults() {
        let config = MatchConfig::default();
        assert_eq!(config.ring_size, 15);
        assert_eq!(config.starting_soldiers, 50);
        assert_eq!(config.max_soldiers, 10000);
        assert_eq!(config.visibility_range, 5);
        assert_eq!(config.growth_per_turn, 10);
        assert_eq!(config.bonus_growth_per_turn, 5);
        assert_eq!(config.max_turns, 100);
        assert_eq!(config.matches_per_pair, 3);
        assert!(config.reverse_matches);
        assert_eq!(config.base_seed(), DEFAULT_SEED);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: MatchConfig = serde_json::from_str(r#"{"ring_size": 9, "seed": 7}"#).unwrap();
        assert_eq!(config.ring_size, 9);
        assert_eq!(config.base_seed(), 7);
        assert_eq!(config.max_turns, 100);
    }

    #[test]
    fn test_load_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.json");
        let config = MatchConfig::new(21, 60).with_seed(3);
        config.save(&path).unwrap();
        assert_eq!(MatchConfig::load(&path).unwrap(), config);

        std::fs::write(&path, "{ not json").unwrap();
        let err = MatchConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config JSON"));
    }

    #[test]
    fn test_tournament_memory_forces_sequential() {
        let config = TournamentConfig::default();
        assert!(config.runs_parallel());
        assert!(!config.clone().sequential().runs_parallel());
        assert!(!config.with_tournament_memory().runs_parallel());
    }
}
