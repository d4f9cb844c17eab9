use std::iter::zip;

use super::{model::Hmm, table::Table, START_TAG};
use crate::{
    dataset::Sentence,
    error::{Error, Result},
    quark::{Quark, StringTable, TextVectorizer},
};

/// Accumulates emission and transition counts from tagged sentences.
///
/// Counts stay raw until [`ModelBuilder::finalize`], which consumes the
/// builder and yields the log-space [`Hmm`]. A builder therefore can't be
/// decoded against, nor normalized twice.
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    tags: Quark,
    words: Quark,
    emissions: Table,
    transitions: Table,
    num_sentences: usize,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        let mut tags = Quark::default();
        tags.find_or_insert(START_TAG);
        Self {
            tags,
            words: Quark::default(),
            emissions: Table::default(),
            transitions: Table::default(),
            num_sentences: 0,
        }
    }
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one emission of `word` (lowercased) by `tag`.
    ///
    /// The start tag never emits, so `tag` equal to [`START_TAG`] is
    /// rejected with [`Error::ReservedTag`].
    pub fn record_observation(&mut self, word: &str, tag: &str) -> Result<()> {
        if tag == START_TAG {
            return Err(Error::ReservedTag);
        }
        let tid = self.tags.find_or_insert(tag);
        let wid = self.words.find_or_insert(&word.to_lowercase());
        self.emissions.increment(tid, wid);
        Ok(())
    }

    /// Counts one transition `curr -> next`. `curr` may be [`START_TAG`],
    /// `next` may not.
    pub fn record_transition(&mut self, curr: &str, next: &str) -> Result<()> {
        if next == START_TAG {
            return Err(Error::ReservedTag);
        }
        let src = self.tags.find_or_insert(curr);
        let dst = self.tags.find_or_insert(next);
        self.transitions.increment(src, dst);
        Ok(())
    }

    /// Counts the emissions and transitions of one sentence, starting with a
    /// transition out of [`START_TAG`]. Sentences are never linked together.
    ///
    /// Nothing is recorded when the sequences differ in length or a tag is
    /// the reserved start tag.
    pub fn ingest_sentence<W, T>(&mut self, words: &[W], tags: &[T]) -> Result<()>
    where
        W: AsRef<str>,
        T: AsRef<str>,
    {
        if words.len() != tags.len() {
            return Err(Error::InvalidInput {
                words: words.len(),
                tags: tags.len(),
            });
        }
        if tags.iter().any(|t| t.as_ref() == START_TAG) {
            return Err(Error::ReservedTag);
        }
        if words.is_empty() {
            return Ok(());
        }

        let mut prev = START_TAG;
        for (word, tag) in zip(words, tags) {
            let tag = tag.as_ref();
            self.record_observation(word.as_ref(), tag)?;
            self.record_transition(prev, tag)?;
            prev = tag;
        }
        self.num_sentences += 1;
        Ok(())
    }

    /// Ingests every sentence in order, stopping at the first invalid one.
    pub fn ingest_corpus<'a, I>(&mut self, sentences: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Sentence>,
    {
        for sentence in sentences {
            self.ingest_sentence(&sentence.words, &sentence.tags)?;
        }
        Ok(())
    }

    pub fn num_sentences(&self) -> usize {
        self.num_sentences
    }

    /// Number of distinct tags seen, not counting the start tag.
    pub fn num_tags(&self) -> usize {
        self.tags.len() - 1
    }

    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    /// Converts the counts of every row into log-probabilities.
    pub fn finalize(mut self) -> Hmm {
        self.emissions.normalize_log();
        self.transitions.normalize_log();
        Hmm::new(self.tags, self.words, self.emissions, self.transitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_exp<'a>(row: impl Iterator<Item = &'a f64>) -> f64 {
        row.map(|x| x.exp()).sum()
    }

    #[test]
    fn counts_before_finalize() {
        let mut builder = ModelBuilder::new();
        builder
            .ingest_sentence(&["The", "dog", "runs"], &["DET", "NOUN", "VERB"])
            .unwrap();
        builder
            .ingest_sentence(&["the", "cat"], &["DET", "NOUN"])
            .unwrap();
        assert_eq!(builder.num_sentences(), 2);
        assert_eq!(builder.num_tags(), 3);
        assert_eq!(builder.num_words(), 4);

        let det = builder.tags.to_id("DET").unwrap();
        let noun = builder.tags.to_id("NOUN").unwrap();
        let verb = builder.tags.to_id("VERB").unwrap();
        let the = builder.words.to_id("the").unwrap();
        assert_eq!(builder.emissions.get(det, the), Some(2.0));
        assert_eq!(builder.transitions.get(0, det), Some(2.0));
        assert_eq!(builder.transitions.get(det, noun), Some(2.0));
        assert_eq!(builder.transitions.get(noun, verb), Some(1.0));
        // nothing links the end of one sentence to the start of the next
        assert_eq!(builder.transitions.get(verb, det), None);
        assert!(builder.transitions.row(verb).is_none());
    }

    #[test]
    fn mismatched_lengths() {
        let mut builder = ModelBuilder::new();
        let err = builder
            .ingest_sentence(&["the", "dog"], &["DET"])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { words: 2, tags: 1 }));
        assert_eq!(builder.num_sentences(), 0);
        assert_eq!(builder.num_words(), 0);
    }

    #[test]
    fn reserved_start_tag() {
        let mut builder = ModelBuilder::new();
        let err = builder.ingest_sentence(&["x"], &[START_TAG]).unwrap_err();
        assert!(matches!(err, Error::ReservedTag));
        assert_eq!(builder.num_tags(), 0);
    }

    #[test]
    fn record_observation_rejects_start_tag() {
        let mut builder = ModelBuilder::new();
        builder.record_observation("the", "DET").unwrap();
        let err = builder.record_observation("x", START_TAG).unwrap_err();
        assert!(matches!(err, Error::ReservedTag));
        assert_eq!(builder.num_words(), 1);
        assert!(builder.emissions.row(0).is_none());

        builder.record_transition(START_TAG, "DET").unwrap();
        let model = builder.finalize();
        assert!(model.emissions().row(0).is_none());
        let mut buf = Vec::new();
        model.save(&mut buf).unwrap();
        assert_eq!(Hmm::load(buf.as_slice()).unwrap(), model);
    }

    #[test]
    fn record_transition_rejects_start_target() {
        let mut builder = ModelBuilder::new();
        builder
            .ingest_sentence(&["the", "dog"], &["DET", "NOUN"])
            .unwrap();
        let err = builder.record_transition("DET", START_TAG).unwrap_err();
        assert!(matches!(err, Error::ReservedTag));
        builder.record_transition(START_TAG, "NOUN").unwrap();

        let det = builder.tags.to_id("DET").unwrap();
        assert_eq!(builder.transitions.get(det, 0), None);

        let model = builder.finalize();
        let tags = model.viterbi(&["the", "dog"]).unwrap();
        assert_eq!(tags, vec!["DET", "NOUN"]);
        let transitions = model.transitions();
        assert!(transitions.sources().all(|src| transitions.get(src, 0).is_none()));
        let mut buf = Vec::new();
        model.save(&mut buf).unwrap();
        assert_eq!(Hmm::load(buf.as_slice()).unwrap(), model);
    }

    #[test]
    fn empty_sentence_contributes_nothing() {
        let mut builder = ModelBuilder::new();
        let empty: [&str; 0] = [];
        builder.ingest_sentence(&empty, &empty).unwrap();
        assert_eq!(builder.num_sentences(), 0);
        assert_eq!(builder.transitions.num_entries(), 0);
    }

    #[test]
    fn rows_are_normalized() {
        let mut builder = ModelBuilder::new();
        let corpus = [
            (vec!["the", "dog", "runs"], vec!["DET", "NOUN", "VERB"]),
            (vec!["a", "dog", "barks", "loudly"], vec!["DET", "NOUN", "VERB", "ADV"]),
            (vec!["dogs", "run"], vec!["NOUN", "VERB"]),
            (vec!["run", "!"], vec!["VERB", "."]),
        ];
        for (words, tags) in &corpus {
            builder.ingest_sentence(words.as_slice(), tags.as_slice()).unwrap();
        }
        let model = builder.finalize();
        for (_, row) in model.emissions().iter() {
            assert!((sum_exp(row.values()) - 1.0).abs() < 1e-9);
        }
        let mut sources = 0;
        for (src, row) in model.transitions().iter() {
            assert!((sum_exp(row.values()) - 1.0).abs() < 1e-9, "row {src}");
            sources += 1;
        }
        // "#", DET, NOUN, VERB have outgoing transitions; ADV and "." don't
        assert_eq!(sources, 4);
        assert!(model.transitions().row(0).is_some());
    }

    #[test]
    fn deterministic_training() {
        let build = || {
            let mut builder = ModelBuilder::new();
            builder
                .ingest_sentence(&["the", "dog", "runs"], &["DET", "NOUN", "VERB"])
                .unwrap();
            builder
                .ingest_sentence(&["dogs", "run", "fast"], &["NOUN", "VERB", "ADV"])
                .unwrap();
            builder.finalize()
        };
        assert_eq!(build(), build());
    }
}
