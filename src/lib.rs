//! # hmm-tagger
//!
//! A first-order hidden Markov model tagger: counts emissions and transitions
//! from tagged sentences, normalizes them into log-probabilities and decodes
//! new sentences with the Viterbi algorithm.
//!
//! ```
//! use hmm_tagger::ModelBuilder;
//!
//! let mut builder = ModelBuilder::new();
//! builder
//!     .ingest_sentence(&["the", "dog", "runs"], &["DET", "NOUN", "VERB"])
//!     .unwrap();
//! let model = builder.finalize();
//! assert_eq!(model.viterbi(&["the", "dog", "runs"]).unwrap(), ["DET", "NOUN", "VERB"]);
//! ```
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod hmm;
pub mod quark;

pub use dataset::{tokenize, Corpus, Sentence};
pub use error::{Error, Result};
pub use evaluation::{Estimation, Evaluation};
pub use hmm::{
    model::Hmm, table::Table, trainer::ModelBuilder, viterbi::ViterbiDecoder, START_TAG,
    UNSEEN_PENALTY,
};
pub use quark::{Quark, StringTable, TextVectorizer};
