//! Scored-move engine with online weight adaptation
//!
//! Each decision extracts a fixed feature vector from the ring, nudges the weight
//! model towards the outcomes of the stored samples, scores every candidate move
//! and greedily accepts the best ones. The turn is then recorded as a new sample.
//!
//! Weights live in the session and are never reset while it exists.

use std::collections::VecDeque;
use std::ops::Index;

use rand::Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::ring::{MoveOrder, Owner, RingState};

pub const FEATURE_COUNT: usize = 8;
/// Samples kept for the update; the oldest is evicted first
pub const SAMPLE_CAPACITY: usize = 50;
/// The model is only updated once more samples than this are stored
pub const MIN_SAMPLES: usize = 10;
pub const LEARNING_RATE: f64 = 0.1;
/// Highest single reinforcement option
pub const MAX_REINFORCE: u32 = 5;
/// Turn after which the late-game feature switches on
pub const LATE_GAME_TURN: u32 = 20;
/// Enemy nodes below this are attack opportunities
pub const WEAK_ENEMY: u32 = 5;
/// Upper bound (exclusive) of the random tie-breaker added to every score
pub const SCORE_JITTER: f64 = 0.1;

// ============================================================================
// FEATURES
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    TerritoryRatio,
    StrengthRatio,
    BorderPressure,
    ExpansionPotential,
    ClusteringBonus,
    DefensiveNeed,
    AttackOpportunity,
    LateGame,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::TerritoryRatio,
        Feature::StrengthRatio,
        Feature::BorderPressure,
        Feature::ExpansionPotential,
        Feature::ClusteringBonus,
        Feature::DefensiveNeed,
        Feature::AttackOpportunity,
        Feature::LateGame,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Initial weight
    pub const fn prior(self) -> f64 {
        match self {
            Feature::TerritoryRatio => 2.5,
            Feature::StrengthRatio => 3.0,
            Feature::BorderPressure => 1.8,
            Feature::ExpansionPotential => 2.0,
            Feature::ClusteringBonus => 1.5,
            Feature::DefensiveNeed => 2.2,
            Feature::AttackOpportunity => 1.9,
            Feature::LateGame => 1.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn extract(ring: &RingState, turn: u32) -> Self {
        let mut mine = 0u32;
        let mut enemy = 0u32;
        let mut neutral = 0u32;
        let mut border = 0u32;
        let mut expansion = 0u32;
        let mut clustering = 0u32;
        let mut defensive = 0u32;
        let mut attack = 0u32;

        for i in 0..ring.len() {
            match ring.owner(i) {
                Owner::Mine => {
                    mine += 1;
                    clustering += 1 + ring.connectivity(i);
                    if ring.is_exposed(i) {
                        defensive += 1;
                    }
                    if ring.is_border(i) {
                        border += 1;
                    }
                }
                Owner::Enemy => {
                    enemy += 1;
                    if ring.is_reachable(i) && ring.troops(i) < WEAK_ENEMY {
                        attack += 1;
                    }
                }
                Owner::Neutral => {
                    neutral += 1;
                    if ring.is_reachable(i) {
                        expansion += 1;
                    }
                }
            }
        }

        let my_strength = ring.strength(Owner::Mine) as f64;
        let enemy_strength = ring.strength(Owner::Enemy) as f64;

        Self([
            ratio(mine, mine + enemy),
            my_strength / (my_strength + enemy_strength).max(1.0),
            ratio(border, mine),
            ratio(expansion, neutral),
            ratio(clustering, mine),
            ratio(defensive, mine),
            ratio(attack, enemy),
            if turn > LATE_GAME_TURN { 1.0 } else { 0.0 },
        ])
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// Target value a turn is trained towards: territory + strength - 1
    pub fn outcome(&self) -> f64 {
        self[Feature::TerritoryRatio] + self[Feature::StrengthRatio] - 1.0
    }
}

impl Index<Feature> for FeatureVector {
    type Output = f64;

    fn index(&self, feature: Feature) -> &f64 {
        &self.0[feature.index()]
    }
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    f64::from(numerator) / f64::from(denominator.max(1))
}

// ============================================================================
// WEIGHTS & SAMPLES
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weights([f64; FEATURE_COUNT]);

impl Default for Weights {
    fn default() -> Self {
        Self(Feature::ALL.map(Feature::prior))
    }
}

impl Weights {
    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    /// `tanh` of the weighted feature sum
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        self.0
            .iter()
            .zip(features.values())
            .map(|(w, f)| w * f)
            .sum::<f64>()
            .tanh()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSample {
    pub features: FeatureVector,
    pub outcome: f64,
}

/// Per-session weights and sample buffer
#[derive(Clone, Debug, Default)]
pub struct LearningModel {
    weights: Weights,
    samples: VecDeque<GameSample>,
}

impl LearningModel {
    pub fn new() -> Self {
        Self {
            weights: Weights::default(),
            samples: VecDeque::with_capacity(SAMPLE_CAPACITY + 1),
        }
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn samples(&self) -> &VecDeque<GameSample> {
        &self.samples
    }

    /// Gradient step over every stored sample; returns false if too few samples exist yet.
    ///
    /// The prediction is recomputed for every single weight change, so later
    /// features in a pass see the weights already moved by earlier ones.
    pub fn update(&mut self) -> bool {
        if self.samples.len() <= MIN_SAMPLES {
            return false;
        }
        let Self { weights, samples } = self;
        for sample in samples.iter() {
            for feature in Feature::ALL {
                let error = sample.outcome - weights.predict(&sample.features);
                weights.0[feature.index()] += LEARNING_RATE * error * sample.features[feature];
            }
        }
        tracing::debug!("Updated learning weights from {} samples", samples.len());
        true
    }

    /// Store the turn's features with outcome `territory + strength - 1`
    pub fn record(&mut self, features: FeatureVector) {
        self.samples.push_back(GameSample {
            features,
            outcome: features.outcome(),
        });
        if self.samples.len() > SAMPLE_CAPACITY {
            self.samples.pop_front();
        }
    }

    /// Full decision: extract, update, score, select, record
    pub fn decide<R: Rng + ?Sized>(
        &mut self,
        ring: &RingState,
        budget: u32,
        turn: u32,
        rng: &mut R,
    ) -> Vec<MoveOrder> {
        let features = FeatureVector::extract(ring, turn);
        self.update();

        let mut options = generate_options(ring, budget);
        score_options(&mut options, &self.weights, &features, rng);
        let orders = select_options(&options, budget);

        self.record(features);
        orders
    }
}

// ============================================================================
// MOVE OPTIONS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    Expand,
    Attack,
    Reinforce,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveOption {
    pub position: usize,
    pub cost: u32,
    pub kind: MoveKind,
    pub score: f64,
}

impl MoveOption {
    fn new(position: usize, cost: u32, kind: MoveKind) -> Self {
        Self {
            position,
            cost,
            kind,
            score: 0.0,
        }
    }
}

/// Every affordable claim and attack, plus reinforcement levels on owned nodes
pub fn generate_options(ring: &RingState, budget: u32) -> Vec<MoveOption> {
    let mut options = Vec::new();
    for i in 0..ring.len() {
        match ring.owner(i) {
            Owner::Neutral if ring.is_reachable(i) => {
                let cost = ring.troops(i).saturating_add(1);
                if cost <= budget {
                    options.push(MoveOption::new(i, cost, MoveKind::Expand));
                }
            }
            Owner::Enemy if ring.is_reachable(i) => {
                let cost = ring.troops(i).saturating_add(2);
                if cost <= budget {
                    options.push(MoveOption::new(i, cost, MoveKind::Attack));
                }
            }
            Owner::Mine => {
                for level in 1..=budget.min(MAX_REINFORCE) {
                    options.push(MoveOption::new(i, level, MoveKind::Reinforce));
                }
            }
            _ => {}
        }
    }
    options
}

/// Score each option and sort best first (stable)
pub fn score_options<R: Rng + ?Sized>(
    options: &mut [MoveOption],
    weights: &Weights,
    features: &FeatureVector,
    rng: &mut R,
) {
    let w = |f: Feature| weights.get(f);
    for option in options.iter_mut() {
        let base = match option.kind {
            MoveKind::Expand => {
                w(Feature::ExpansionPotential) * features[Feature::ExpansionPotential]
                    + w(Feature::ClusteringBonus) * 0.5
            }
            MoveKind::Attack => {
                w(Feature::AttackOpportunity) * features[Feature::AttackOpportunity]
                    + w(Feature::StrengthRatio) * features[Feature::StrengthRatio]
            }
            MoveKind::Reinforce => {
                w(Feature::DefensiveNeed) * features[Feature::DefensiveNeed]
                    + w(Feature::BorderPressure) * features[Feature::BorderPressure]
            }
        };
        let late = w(Feature::LateGame) * features[Feature::LateGame];
        option.score = base + late + rng.gen::<f64>() * SCORE_JITTER;
    }
    options.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Greedy pick, one order per position; leftover goes to the best unused reinforcement
pub fn select_options(options: &[MoveOption], budget: u32) -> Vec<MoveOrder> {
    let mut remaining = budget;
    let mut used = FxHashSet::default();
    let mut orders = Vec::new();

    for option in options {
        if remaining == 0 {
            break;
        }
        if option.cost <= remaining && !used.contains(&option.position) {
            orders.push(MoveOrder::new(option.position, option.cost));
            remaining -= option.cost;
            used.insert(option.position);
        }
    }

    if remaining > 0 {
        if let Some(top_up) = options
            .iter()
            .find(|o| o.kind == MoveKind::Reinforce && !used.contains(&o.position))
        {
            orders.push(MoveOrder::new(top_up.position, remaining));
        }
    }
    orders
}
