//! RINGWARS Core - Ring model and agent decision making
//!
//! This crate provides everything one side needs to play a turn:
//! - Ring geometry and ownership (wraparound adjacency, border metrics)
//! - Budget allocation plans that never overspend
//! - Opponent behaviour classification and counter-strategies
//! - Cluster analysis and phase-based plans
//! - Scored-move selection with online weight learning
//! - The agent roster and the file-exchange turn protocol

pub mod ring;
pub mod error;
pub mod allocator;
pub mod classifier;
pub mod strategy;
pub mod cluster;
pub mod learning;
pub mod session;
pub mod agent;
pub mod protocol;

// Re-exports for convenient access
pub use ring::{MoveOrder, Owner, RingState, total_spent};
pub use error::TurnError;
pub use allocator::{Allocation, Candidates, Cap, Plan, Remainder, Share, SortKey};
pub use classifier::{Behavior, OpponentHistory};
pub use strategy::{Phase, Strategy};
pub use cluster::{Cluster, find_clusters};
pub use learning::{Feature, FeatureVector, LearningModel};
pub use session::AgentSession;
pub use agent::{AgentKind, UnknownAgent};
pub use protocol::{parse_state, play_turn, read_state, write_orders};
