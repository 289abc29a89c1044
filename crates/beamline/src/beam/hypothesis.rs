//! Candidate continuations and their recorded form.

use crate::words::{EOS_ID, WordId};

/// Index of a recorded hypothesis inside its sentence's
/// [`History`](super::History) arena.
pub type HypId = u32;

/// A continuation drafted by a beam-selection strategy.
///
/// Drafts are plain values; recording one into a
/// [`History`](super::History) assigns the [`HypId`] later steps use as
/// a backpointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hypothesis {
    word: WordId,
    score: f32,
    parent: Option<HypId>,
    prev_state_index: u32,
}

impl Hypothesis {
    /// # Parameters
    /// - `word`: token this hypothesis appends
    /// - `score`: cumulative log score including `word`
    /// - `parent`: recorded hypothesis this one extends, `None` only for
    ///   the start marker
    /// - `prev_state_index`: row the parent occupied in the decoder
    ///   state that produced the distribution `word` was drawn from
    pub fn new(word: WordId, score: f32, parent: Option<HypId>, prev_state_index: u32) -> Self {
        Hypothesis {
            word,
            score,
            parent,
            prev_state_index,
        }
    }

    pub fn word(&self) -> WordId {
        self.word
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn parent(&self) -> Option<HypId> {
        self.parent
    }

    pub fn prev_state_index(&self) -> u32 {
        self.prev_state_index
    }

    /// Whether this hypothesis finishes its sentence.
    pub fn is_eos(&self) -> bool {
        self.word == EOS_ID
    }
}

/// A hypothesis that has been recorded into its sentence's history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HypRef {
    id: HypId,
    sentence: u32,
    word: WordId,
    score: f32,
    prev_state_index: u32,
}

impl HypRef {
    pub(crate) fn new(
        id: HypId,
        sentence: u32,
        word: WordId,
        score: f32,
        prev_state_index: u32,
    ) -> Self {
        HypRef {
            id,
            sentence,
            word,
            score,
            prev_state_index,
        }
    }

    /// Arena slot of this hypothesis, the parent id for its children.
    pub fn id(&self) -> HypId {
        self.id
    }

    /// Batch row of the sentence this hypothesis belongs to.
    pub fn sentence(&self) -> u32 {
        self.sentence
    }

    pub fn word(&self) -> WordId {
        self.word
    }

    pub fn score(&self) -> f32 {
        self.score
    }

    /// Row this hypothesis reads its recurrent state from.
    pub fn prev_state_index(&self) -> u32 {
        self.prev_state_index
    }

    pub fn is_eos(&self) -> bool {
        self.word == EOS_ID
    }
}

/// Live hypotheses across the whole batch, grouped by sentence in batch
/// order.
pub type Beam = Vec<HypRef>;

/// Per-sentence draft rows produced by one beam-selection round.
pub type Beams = Vec<Vec<Hypothesis>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eos_detection_uses_the_reserved_word() {
        let finished = Hypothesis::new(EOS_ID, -1.5, Some(3), 0);
        let open = Hypothesis::new(42, -1.5, Some(3), 0);

        assert!(finished.is_eos());
        assert!(!open.is_eos());
    }

    #[test]
    fn recorded_hypotheses_echo_their_draft() {
        let recorded = HypRef::new(7, 2, 42, -0.25, 5);

        assert_eq!(recorded.id(), 7);
        assert_eq!(recorded.sentence(), 2);
        assert_eq!(recorded.word(), 42);
        assert_eq!(recorded.score(), -0.25);
        assert_eq!(recorded.prev_state_index(), 5);
        assert!(!recorded.is_eos());
    }
}
