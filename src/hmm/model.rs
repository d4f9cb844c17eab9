use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use super::{table::Table, viterbi::ViterbiDecoder, START_TAG};
use crate::{
    error::{Error, Result},
    quark::{Quark, StringTable},
};

/// A trained first-order HMM with log-space emission and transition tables.
///
/// Tag id 0 is always [`START_TAG`]. The model is read-only; decoders
/// borrow it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hmm {
    tags: Quark,
    words: Quark,
    emissions: Table,
    transitions: Table,
}

impl Hmm {
    pub(crate) const START: usize = 0;

    pub(crate) fn new(tags: Quark, words: Quark, emissions: Table, transitions: Table) -> Self {
        Self {
            tags,
            words,
            emissions,
            transitions,
        }
    }

    /// Tag table, including the start tag at id 0.
    pub fn tags(&self) -> &Quark {
        &self.tags
    }

    pub fn words(&self) -> &Quark {
        &self.words
    }

    /// Tag id -> word id -> log P(word | tag).
    pub fn emissions(&self) -> &Table {
        &self.emissions
    }

    /// Tag id -> next tag id -> log P(next | tag).
    pub fn transitions(&self) -> &Table {
        &self.transitions
    }

    /// Tags that can appear in a decoded path.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().skip(1)
    }

    pub fn num_labels(&self) -> usize {
        self.tags.len() - 1
    }

    pub fn emission(&self, tag: &str, word: &str) -> Option<f64> {
        let tid = self.tags.to_id(tag)?;
        let wid = self.words.to_id(&word.to_lowercase())?;
        self.emissions.get(tid, wid)
    }

    pub fn transition(&self, curr: &str, next: &str) -> Option<f64> {
        self.transitions
            .get(self.tags.to_id(curr)?, self.tags.to_id(next)?)
    }

    pub fn tagger(&self) -> ViterbiDecoder<'_> {
        ViterbiDecoder::new(self)
    }

    /// Most probable tag sequence for `words`, using the default
    /// unseen-word penalty.
    pub fn viterbi<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<String>> {
        self.tagger().decode(words)
    }

    pub fn save<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn load<R: Read>(reader: R) -> Result<Self> {
        let model: Hmm = serde_json::from_reader(reader)?;
        model.check().map_err(Error::InvalidModel)?;
        Ok(model)
    }

    pub fn to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.save(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(BufReader::new(File::open(path)?))
    }

    /// Every id stored in a table must resolve in the string tables, and the
    /// start tag must sit at id 0 without emissions.
    fn check(&self) -> std::result::Result<(), String> {
        if self.tags.to_id(START_TAG) != Some(Self::START) {
            return Err(format!("start tag {START_TAG:?} is not tag 0"));
        }
        if self.emissions.row(Self::START).is_some() {
            return Err("start tag has emissions".into());
        }
        for (tid, row) in self.emissions.iter() {
            if tid >= self.tags.len() {
                return Err(format!("emission row {tid} has no tag"));
            }
            if let Some(wid) = row.keys().find(|&&wid| wid >= self.words.len()) {
                return Err(format!("emission column {wid} has no word"));
            }
        }
        for (src, row) in self.transitions.iter() {
            if src >= self.tags.len() {
                return Err(format!("transition row {src} has no tag"));
            }
            if let Some(dst) = row.keys().find(|&&dst| dst >= self.tags.len() || dst == Self::START) {
                return Err(format!("transition column {dst} is not a valid tag"));
            }
        }
        Ok(())
    }
}
