pub mod model;
pub mod table;
pub mod trainer;
pub mod viterbi;

/// Synthetic tag preceding every sentence. It is a transition source only.
pub const START_TAG: &str = "#";

/// Log-score used for a (tag, word) pair never observed in training.
pub const UNSEEN_PENALTY: f64 = -100.0;
