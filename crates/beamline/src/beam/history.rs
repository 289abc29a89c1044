//! Backpointer forest recording every hypothesis a search produced.

use crate::sentence::Sentences;
use crate::words::{EOS_ID, WordId, Words};

use super::hypothesis::{Beam, Beams, HypId, HypRef, Hypothesis};

/// A finished candidate with the score it was ranked under.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    words: Words,
    score: f32,
}

impl Translation {
    /// Target tokens in emission order. The start marker is not part of
    /// the sequence; the closing end-of-sequence token (or the token the
    /// sentence was cut off at) is.
    pub fn words(&self) -> &[WordId] {
        &self.words
    }

    pub fn into_words(self) -> Words {
        self.words
    }

    /// Cumulative log score, divided by length when the search was
    /// configured to normalize.
    pub fn score(&self) -> f32 {
        self.score
    }
}

#[derive(Debug, Clone, Copy)]
struct Node {
    word: WordId,
    score: f32,
    parent: Option<HypId>,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    node: HypId,
    score: f32,
}

/// Decoding record for a single sentence.
///
/// Hypotheses live in an append-only arena and name their parent by
/// arena index, so reading a candidate out is a walk from its leaf back
/// to the start marker, reversed. A hypothesis becomes a candidate when
/// it emits end-of-sequence, or when the sentence hits its step bound
/// and everything still alive is cut off as-is.
#[derive(Debug, Clone)]
pub struct History {
    sentence_index: usize,
    normalize: bool,
    max_length: usize,
    nodes: Vec<Node>,
    steps: Vec<Vec<HypId>>,
    candidates: Vec<Candidate>,
}

impl History {
    pub(crate) fn new(sentence_index: usize, normalize: bool, max_length: usize) -> Self {
        // arena slot 0 is the start marker every chain ends at
        History {
            sentence_index,
            normalize,
            max_length,
            nodes: vec![Node {
                word: EOS_ID,
                score: 0.0,
                parent: None,
            }],
            steps: vec![vec![0]],
            candidates: Vec::new(),
        }
    }

    /// Position of this sentence in its input batch.
    pub fn sentence_index(&self) -> usize {
        self.sentence_index
    }

    /// Number of recorded beam rounds, the start marker included.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Records one round of drafts for this sentence and returns their
    /// recorded form, in draft order.
    ///
    /// The drafts' cumulative scores stay untouched; only the ranking
    /// score of a candidate is length-normalized, at the moment the
    /// candidate is pushed, by the number of tokens it carries.
    pub(crate) fn add_step(&mut self, sentence: u32, drafts: &[Hypothesis]) -> Beam {
        let steps_so_far = self.steps.len();
        let mut ids = Vec::with_capacity(drafts.len());
        let mut recorded = Beam::with_capacity(drafts.len());
        for draft in drafts {
            let parent = draft
                .parent()
                .expect("drafted hypothesis must extend a recorded parent");
            assert!(
                (parent as usize) < self.nodes.len(),
                "hypothesis parent {parent} is not recorded"
            );
            let id = self.nodes.len() as HypId;
            self.nodes.push(Node {
                word: draft.word(),
                score: draft.score(),
                parent: Some(parent),
            });
            if draft.is_eos() || steps_so_far == self.max_length {
                let score = if self.normalize {
                    draft.score() / steps_so_far as f32
                } else {
                    draft.score()
                };
                self.candidates.push(Candidate { node: id, score });
            }
            ids.push(id);
            recorded.push(HypRef::new(
                id,
                sentence,
                draft.word(),
                draft.score(),
                draft.prev_state_index(),
            ));
        }
        self.steps.push(ids);
        recorded
    }

    /// Best `n` finished candidates, highest ranking score first.
    ///
    /// Returns fewer than `n` when the sentence produced fewer
    /// candidates. Ties keep the order in which candidates finished.
    pub fn n_best(&self, n: usize) -> Vec<Translation> {
        let mut ranked = self.candidates.clone();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(n);
        ranked
            .into_iter()
            .map(|candidate| Translation {
                words: self.walk_back(candidate.node),
                score: candidate.score,
            })
            .collect()
    }

    /// The single best candidate, if any step produced one.
    pub fn top(&self) -> Option<Translation> {
        self.n_best(1).into_iter().next()
    }

    fn walk_back(&self, leaf: HypId) -> Words {
        let mut words = Words::new();
        let mut cursor = leaf;
        loop {
            let node = self.nodes[cursor as usize];
            match node.parent {
                Some(parent) => {
                    words.push(node.word);
                    cursor = parent;
                }
                None => break,
            }
        }
        words.reverse();
        words
    }
}

/// One [`History`] per sentence of a batch, in input order.
#[derive(Debug, Clone)]
pub struct Histories {
    coll: Vec<History>,
}

impl Histories {
    /// Builds an empty record for every sentence.
    ///
    /// Each sentence is allowed three times its own length in decode
    /// steps before its surviving hypotheses are cut off.
    pub fn new(sentences: &Sentences, normalize: bool) -> Self {
        let coll = sentences
            .iter()
            .map(|sentence| History::new(sentence.index(), normalize, 3 * sentence.len()))
            .collect();
        Histories { coll }
    }

    /// Number of sentences tracked.
    pub fn len(&self) -> usize {
        self.coll.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coll.is_empty()
    }

    /// History of the sentence at batch position `index`.
    ///
    /// # Panics
    /// If `index` is out of range.
    pub fn get(&self, index: usize) -> &History {
        &self.coll[index]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, History> {
        self.coll.iter()
    }

    /// Start markers for every sentence, the hypotheses the first decode
    /// step extends. Row `i` reads its state from row `i` of the initial
    /// decoder state.
    pub fn get_first_hyps(&self) -> Beam {
        (0..self.coll.len())
            .map(|row| HypRef::new(0, row as u32, EOS_ID, 0.0, row as u32))
            .collect()
    }

    /// Records one beam-selection round across the batch.
    ///
    /// `beams[i]` holds sentence `i`'s drafts; empty rows are skipped
    /// and leave that sentence's history untouched. Returns the recorded
    /// form of every row, ready for survivor partitioning.
    pub fn add(&mut self, beams: &Beams) -> Vec<Beam> {
        assert_eq!(
            beams.len(),
            self.coll.len(),
            "got {} beam rows for a batch of {}",
            beams.len(),
            self.coll.len()
        );
        beams
            .iter()
            .enumerate()
            .map(|(row, drafts)| {
                if drafts.is_empty() {
                    Beam::new()
                } else {
                    self.coll[row].add_step(row as u32, drafts)
                }
            })
            .collect()
    }
}
