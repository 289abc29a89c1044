//! Per-sentence beam widths.

/// Tracks how many hypotheses each sentence of a batch keeps alive.
///
/// Widths start at one so the first decode step scores a single start
/// hypothesis per sentence, jump to the configured beam width right
/// after it, and from then on only shrink: every finished hypothesis
/// gives one slot back. A sentence at width zero is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeamSizes {
    sizes: Vec<usize>,
}

impl BeamSizes {
    /// One entry per sentence, all set to `width`.
    pub fn uniform(sentences: usize, width: usize) -> Self {
        BeamSizes {
            sizes: vec![width; sentences],
        }
    }

    /// Number of sentences tracked.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Width currently granted to sentence `index`.
    ///
    /// # Panics
    /// If `index` is out of range.
    pub fn get(&self, index: usize) -> usize {
        self.sizes[index]
    }

    /// All widths, indexed by sentence.
    pub fn as_slice(&self) -> &[usize] {
        &self.sizes
    }

    /// Sum of widths across the batch, the number of live hypotheses.
    pub fn total(&self) -> usize {
        self.sizes.iter().sum()
    }

    pub(crate) fn set_all(&mut self, width: usize) {
        self.sizes.fill(width);
    }

    /// Gives one slot of sentence `index` back.
    ///
    /// # Panics
    /// If the sentence has no width left to give up.
    pub(crate) fn decrement(&mut self, index: usize) {
        assert!(
            self.sizes[index] > 0,
            "beam width for sentence {index} already exhausted"
        );
        self.sizes[index] -= 1;
    }
}
