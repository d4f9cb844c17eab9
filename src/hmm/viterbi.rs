//! Viterbi decoding over the (position, tag) lattice of a trained [`Hmm`].

use super::{model::Hmm, UNSEEN_PENALTY};
use crate::{
    error::{Error, Result},
    quark::StringTable,
};

/// Best path into one (position, tag) node of the lattice.
#[derive(Debug, Clone, Copy)]
struct Node {
    tag: usize,
    score: f64,
    /// Index of the predecessor in the previous column.
    back: usize,
}

/// Finds the most probable tag sequence for a word sequence.
///
/// Holds no state between calls, so one decoder can be reused and several
/// decoders can share one model.
#[derive(Debug, Clone, Copy)]
pub struct ViterbiDecoder<'a> {
    model: &'a Hmm,
    penalty: f64,
}

impl<'a> ViterbiDecoder<'a> {
    pub fn new(model: &'a Hmm) -> Self {
        Self {
            model,
            penalty: UNSEEN_PENALTY,
        }
    }

    /// Overrides the log-score used for emissions never seen in training.
    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
        self
    }

    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    /// Decodes `words` into one tag per word.
    pub fn decode<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<String>> {
        self.decode_scored(words).map(|(path, _)| path)
    }

    /// Like [`ViterbiDecoder::decode`], also returning the log-score of the
    /// chosen path. An empty input yields an empty path scored 0.
    pub fn decode_scored<S: AsRef<str>>(&self, words: &[S]) -> Result<(Vec<String>, f64)> {
        let lattice = self.forward(words)?;
        let last = match lattice.last() {
            Some(column) if lattice.len() > 1 => column,
            _ => return Ok((Vec::new(), 0.0)),
        };

        // ties go to the earliest node in the column
        let mut best = 0;
        for (k, node) in last.iter().enumerate() {
            if node.score > last[best].score {
                best = k;
            }
        }
        let score = last[best].score;

        // column 0 holds only the start tag and ends the walk
        let mut path = Vec::with_capacity(words.len());
        let mut k = best;
        for column in lattice[1..].iter().rev() {
            let node = &column[k];
            path.push(self.model.tags()[node.tag].to_string());
            k = node.back;
        }
        path.reverse();
        Ok((path, score))
    }

    /// Builds the lattice column by column. Column 0 is the start tag alone;
    /// column `i + 1` holds the tags reachable at position `i`, in the order
    /// they were first reached.
    fn forward<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<Vec<Node>>> {
        let tags = self.model.tags();
        let emissions = self.model.emissions();
        let transitions = self.model.transitions();

        let mut lattice = Vec::with_capacity(words.len() + 1);
        lattice.push(vec![Node {
            tag: Hmm::START,
            score: 0.0,
            back: 0,
        }]);
        // tag id -> index in the column being built
        let mut slot: Vec<Option<usize>> = vec![None; tags.len()];

        for (position, word) in words.iter().enumerate() {
            let wid = self.model.words().to_id(&word.as_ref().to_lowercase());
            let frontier = &lattice[position];
            let mut column: Vec<Node> = Vec::new();
            slot.fill(None);

            for (k, node) in frontier.iter().enumerate() {
                // tags never seen with a successor have no outgoing edges
                let Some(edges) = transitions.row(node.tag) else {
                    continue;
                };
                for (&next, &trans) in edges {
                    let emission = wid
                        .and_then(|wid| emissions.get(next, wid))
                        .unwrap_or(self.penalty);
                    let score = node.score + trans + emission;
                    match slot[next] {
                        Some(j) => {
                            if column[j].score < score {
                                column[j].score = score;
                                column[j].back = k;
                            }
                        }
                        None => {
                            slot[next] = Some(column.len());
                            column.push(Node {
                                tag: next,
                                score,
                                back: k,
                            });
                        }
                    }
                }
            }

            if column.is_empty() {
                return Err(Error::DecodeFailure { position });
            }
            lattice.push(column);
        }
        Ok(lattice)
    }
}
