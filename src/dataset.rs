use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// Splits a raw line into lowercase, whitespace-separated words.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_lowercase).collect()
}

fn split_tags(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// One sentence of a parallel corpus. `words` and `tags` are expected to be
/// aligned but the reader does not enforce it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Sentence {
    pub words: Vec<String>,
    pub tags: Vec<String>,
}

impl Sentence {
    pub fn new(words: Vec<String>, tags: Vec<String>) -> Self {
        Self { words, tags }
    }

    pub fn is_aligned(&self) -> bool {
        self.words.len() == self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }
}

/// Sentences read from a pair of parallel files: line `i` of the word file
/// holds the words of sentence `i`, line `i` of the tag file its tags.
#[derive(Debug, Default)]
pub struct Corpus {
    pub sentences: Vec<Sentence>,
}

impl Corpus {
    /// Reads both streams in lockstep until either one ends. Blank line pairs
    /// are skipped.
    pub fn from_readers<W: BufRead, T: BufRead>(words: W, tags: T) -> std::io::Result<Self> {
        let mut corpus = Corpus::default();
        for (lineno, (word_line, tag_line)) in words.lines().zip(tags.lines()).enumerate() {
            let sentence = Sentence::new(tokenize(&word_line?), split_tags(&tag_line?));
            if sentence.is_empty() {
                continue;
            }
            if !sentence.is_aligned() {
                log::warn!(
                    "line {}: {} words but {} tags",
                    lineno + 1,
                    sentence.words.len(),
                    sentence.tags.len()
                );
            }
            corpus.sentences.push(sentence);
        }
        Ok(corpus)
    }

    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(words: P, tags: Q) -> std::io::Result<Self> {
        let words = BufReader::new(File::open(words)?);
        let tags = BufReader::new(File::open(tags)?);
        Self::from_readers(words, tags)
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sentence> {
        self.sentences.iter()
    }

    pub fn max_length(&self) -> usize {
        self.sentences.iter().map(|x| x.len()).max().unwrap_or_default()
    }

    pub fn total_items(&self) -> usize {
        self.sentences.iter().map(|x| x.len()).sum()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Sentence;
    type IntoIter = std::slice::Iter<'a, Sentence>;

    fn into_iter(self) -> Self::IntoIter {
        self.sentences.iter()
    }
}
