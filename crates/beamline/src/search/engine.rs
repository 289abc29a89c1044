//! The batched decoding loop.

use std::collections::BTreeSet;
use std::time::Instant;

use tracing::{Level, debug, info, trace};

use super::best_hyps::BestHyps;
use super::filter::{Filter, FilterIndices};
use super::scorer::Scorer;
use crate::backend::{DeviceInfo, DeviceTensor, Verbosity};
use crate::beam::{Beam, BeamSizes, Histories};
use crate::error::{Error, Result};
use crate::sentence::Sentences;

/// Knobs of a [`Search`].
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Hypotheses kept alive per sentence once decoding is under way.
    pub beam_size: usize,
    /// Rank finished candidates by score per emitted token instead of
    /// raw cumulative score.
    pub normalize_score: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            beam_size: 1,
            normalize_score: false,
        }
    }
}

impl SearchConfig {
    pub fn with_beam_size(mut self, beam_size: usize) -> Self {
        self.beam_size = beam_size;
        self
    }

    pub fn with_normalize_score(mut self, normalize_score: bool) -> Self {
        self.normalize_score = normalize_score;
        self
    }
}

/// Beam-search driver over an ensemble of scorers.
///
/// One `Search` owns its scorers and decodes one batch at a time:
/// [`Search::translate`] runs the whole loop for a batch and hands back
/// the per-sentence [`Histories`]. Scorer state never leaks across
/// batches; every call tears its working set down again, whether it
/// succeeded or not.
pub struct Search<B: DeviceTensor> {
    device: DeviceInfo,
    scorers: Vec<Box<dyn Scorer<B>>>,
    best_hyps: Box<dyn BestHyps<B>>,
    filter: Option<Box<dyn Filter>>,
    config: SearchConfig,
}

impl<B: DeviceTensor> Search<B> {
    /// # Parameters
    /// - `device`: label attached to this search's log lines
    /// - `scorers`: the ensemble, stepped in lockstep each round
    /// - `best_hyps`: beam-selection strategy
    /// - `filter`: optional vocabulary shortlist applied per batch
    /// - `config`: beam width and ranking behavior
    pub fn new(
        device: DeviceInfo,
        scorers: Vec<Box<dyn Scorer<B>>>,
        best_hyps: Box<dyn BestHyps<B>>,
        filter: Option<Box<dyn Filter>>,
        config: SearchConfig,
    ) -> Result<Self> {
        if scorers.is_empty() {
            return Err(Error::Config("a search needs at least one scorer".into()));
        }
        if config.beam_size == 0 {
            return Err(Error::Config("beam size must be at least one".into()));
        }
        Ok(Search {
            device,
            scorers,
            best_hyps,
            filter,
            config,
        })
    }

    /// Decodes a batch and returns one history per sentence, in batch
    /// order.
    ///
    /// Scorers are cleaned up after every call, also when decoding
    /// fails partway through.
    pub async fn translate(&mut self, sentences: &Sentences) -> Result<Histories> {
        if sentences.is_empty() {
            return Err(Error::Config("cannot translate an empty batch".into()));
        }
        for sentence in sentences.iter() {
            if sentence.is_empty() {
                return Err(Error::Config(format!(
                    "sentence {} is empty",
                    sentence.index()
                )));
            }
        }

        let started = Instant::now();
        let outcome = self.decode_batch(sentences).await;
        for scorer in &mut self.scorers {
            scorer.clean_up_after_sentence();
        }
        let histories = outcome?;
        // the longest history records an entry for every loop round
        let steps = histories
            .iter()
            .map(|history| history.len())
            .max()
            .unwrap_or(1)
            - 1;
        info!(
            device = %self.device,
            batch = sentences.len(),
            steps,
            "search took {:?}",
            started.elapsed()
        );
        Ok(histories)
    }

    async fn decode_batch(&mut self, sentences: &Sentences) -> Result<Histories> {
        let filter = self.filter_target_vocab(sentences).await?;
        let batch_size = sentences.len();

        for scorer in &mut self.scorers {
            scorer.encode(sentences).await?;
        }

        let mut states = Vec::with_capacity(self.scorers.len());
        let mut next_states = Vec::with_capacity(self.scorers.len());
        for scorer in &self.scorers {
            let mut state = scorer.new_state();
            scorer
                .begin_sentence_state(state.as_mut(), batch_size)
                .await?;
            states.push(state);
            next_states.push(scorer.new_state());
        }

        let mut beam_sizes = BeamSizes::uniform(batch_size, 1);
        let mut histories = Histories::new(sentences, self.config.normalize_score);
        let mut prev_hyps = histories.get_first_hyps();

        for step in 0..3 * sentences.max_length() {
            for (i, scorer) in self.scorers.iter_mut().enumerate() {
                scorer
                    .decode(states[i].as_ref(), next_states[i].as_mut(), &beam_sizes)
                    .await?;
            }
            if step == 0 {
                // every sentence starts from the lone start marker; the
                // configured width applies once first distributions exist
                beam_sizes.set_all(self.config.beam_size);
            }
            if tracing::enabled!(Level::TRACE) {
                let summary = self.scorers[0].probs().describe(Verbosity::Summary).await?;
                trace!(step, probs = %summary, "decoded");
            }

            let beams = self
                .best_hyps
                .calc_beam(&prev_hyps, &self.scorers, filter.as_ref(), &beam_sizes)
                .await?;
            let recorded = histories.add(&beams);

            let mut survivors = Beam::new();
            let mut finished = 0;
            for row in recorded {
                for hyp in row {
                    if hyp.is_eos() {
                        beam_sizes.decrement(hyp.sentence() as usize);
                        finished += 1;
                    } else {
                        survivors.push(hyp);
                    }
                }
            }
            debug!(
                step,
                live = prev_hyps.len(),
                survivors = survivors.len(),
                finished,
                "beam step"
            );
            if survivors.is_empty() {
                break;
            }

            for (i, scorer) in self.scorers.iter().enumerate() {
                scorer
                    .assemble_beam_state(next_states[i].as_ref(), &survivors, states[i].as_mut())
                    .await?;
            }
            prev_hyps = survivors;
        }

        Ok(histories)
    }

    /// Builds the batch's vocabulary shortlist and pushes it into every
    /// scorer. Returns `None` when no filter is configured.
    async fn filter_target_vocab(&mut self, sentences: &Sentences) -> Result<Option<FilterIndices>> {
        let Some(filter) = &self.filter else {
            return Ok(None);
        };

        let mut source_words = BTreeSet::new();
        for sentence in sentences.iter() {
            source_words.extend(sentence.words().iter().copied());
        }
        let indices = filter.filtered_vocab(&source_words, self.scorers[0].vocab_size());
        debug!(shortlist = indices.len(), "filtered target vocabulary");

        for scorer in &mut self.scorers {
            scorer.filter(&indices).await?;
        }
        Ok(Some(indices))
    }
}
