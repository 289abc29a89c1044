//! Source-side input batches.

use crate::words::{WordId, Words};

/// A single tokenized source sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    index: usize,
    words: Words,
}

impl Sentence {
    /// # Parameters
    /// - `index`: position of the sentence in its batch, echoed on the
    ///   matching [`History`](crate::beam::History) so callers can line
    ///   results back up with their inputs
    /// - `words`: source tokens, already mapped to vocabulary ids
    pub fn new(index: usize, words: Words) -> Self {
        Sentence { index, words }
    }

    /// Position of the sentence in its batch.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The source tokens.
    pub fn words(&self) -> &[WordId] {
        &self.words
    }

    /// Number of source tokens.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// An ordered batch of source sentences decoded together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sentences {
    coll: Vec<Sentence>,
}

impl Sentences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a batch from raw token sequences, assigning indices in
    /// order of appearance.
    pub fn from_words(batch: Vec<Words>) -> Self {
        let coll = batch
            .into_iter()
            .enumerate()
            .map(|(index, words)| Sentence::new(index, words))
            .collect();
        Sentences { coll }
    }

    pub fn push(&mut self, sentence: Sentence) {
        self.coll.push(sentence);
    }

    /// Number of sentences in the batch.
    pub fn len(&self) -> usize {
        self.coll.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coll.is_empty()
    }

    /// Sentence at batch position `index`.
    ///
    /// # Panics
    /// If `index` is out of range.
    pub fn get(&self, index: usize) -> &Sentence {
        &self.coll[index]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sentence> {
        self.coll.iter()
    }

    /// Length of the longest sentence, `0` for an empty batch.
    pub fn max_length(&self) -> usize {
        self.coll.iter().map(Sentence::len).max().unwrap_or(0)
    }
}
