//! Vocabulary shortlists.
//!
//! Scoring a full softmax per hypothesis per step is the dominant cost
//! of decoding. When most target words are obviously irrelevant for a
//! given batch, a [`Filter`] picks the shortlist worth scoring and every
//! scorer restricts its output layer to it.

use std::collections::{BTreeSet, HashMap};

use crate::words::{EOS_ID, WordId};

/// A sorted target-vocabulary shortlist.
///
/// Column `j` of a filtered distribution stands for vocabulary word
/// `word_at(j)`. The end-of-sequence word is always present, so every
/// hypothesis can still finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterIndices {
    indices: Vec<WordId>,
}

impl FilterIndices {
    /// Sorts and deduplicates `words`, injecting the end-of-sequence
    /// word if it is missing.
    pub fn new(mut words: Vec<WordId>) -> Self {
        words.push(EOS_ID);
        words.sort_unstable();
        words.dedup();
        FilterIndices { indices: words }
    }

    /// Number of shortlist columns.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Vocabulary word behind shortlist column `column`.
    ///
    /// # Panics
    /// If `column` is out of range.
    pub fn word_at(&self, column: usize) -> WordId {
        self.indices[column]
    }

    /// Whether `word` survived filtering.
    pub fn contains(&self, word: WordId) -> bool {
        self.indices.binary_search(&word).is_ok()
    }

    /// All retained words in ascending order.
    pub fn as_slice(&self) -> &[WordId] {
        &self.indices
    }
}

/// Chooses which target words are worth scoring for a batch.
pub trait Filter: Send + Sync {
    /// Shortlist for a batch whose source side uses `source_words`.
    ///
    /// `vocab_size` is the scorers' full output width; words at or above
    /// it must not appear in the result.
    fn filtered_vocab(&self, source_words: &BTreeSet<WordId>, vocab_size: usize) -> FilterIndices;
}

/// Shortlist built from a source-to-target alignment table.
///
/// Keeps the `num_first_words` lowest word ids unconditionally (the id
/// space is assumed frequency-sorted, with the reserved markers first),
/// then adds every table entry of every source word in the batch.
#[derive(Debug, Clone)]
pub struct TableFilter {
    mappings: HashMap<WordId, Vec<WordId>>,
    num_first_words: usize,
}

impl TableFilter {
    /// # Parameters
    /// - `mappings`: likely target words per source word; source words
    ///   missing from the table contribute nothing
    /// - `num_first_words`: how many leading vocabulary entries survive
    ///   regardless of the source
    pub fn new(mappings: HashMap<WordId, Vec<WordId>>, num_first_words: usize) -> Self {
        TableFilter {
            mappings,
            num_first_words,
        }
    }
}

impl Filter for TableFilter {
    fn filtered_vocab(&self, source_words: &BTreeSet<WordId>, vocab_size: usize) -> FilterIndices {
        let first_words = self.num_first_words.min(vocab_size) as WordId;
        let mut retained: Vec<WordId> = (0..first_words).collect();
        for source in source_words {
            if let Some(targets) = self.mappings.get(source) {
                retained.extend(
                    targets
                        .iter()
                        .copied()
                        .filter(|&word| (word as usize) < vocab_size),
                );
            }
        }
        FilterIndices::new(retained)
    }
}
