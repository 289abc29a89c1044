//! Beam-selection strategies.

use async_trait::async_trait;

use super::filter::FilterIndices;
use super::scorer::Scorer;
use crate::backend::DeviceTensor;
use crate::beam::{Beam, Beams, BeamSizes, Hypothesis};
use crate::error::Result;
use crate::words::{UNK_ID, WordId};

/// Picks each sentence's next beam from the scorers' distributions.
///
/// Implementations receive the whole ensemble. The bundled
/// [`HostBestHyps`] ranks by the first scorer's distribution alone;
/// strategies that blend ensemble members plug in here.
#[async_trait]
pub trait BestHyps<B: DeviceTensor>: Send + Sync {
    /// Drafts the next beam.
    ///
    /// `prev_hyps` holds the live hypotheses in sentence order, matching
    /// the distribution rows of every scorer. The result has one row per
    /// sentence of the batch; row `i` carries at most
    /// `beam_sizes.get(i)` drafts and stays empty for sentences that are
    /// done.
    async fn calc_beam(
        &self,
        prev_hyps: &Beam,
        scorers: &[Box<dyn Scorer<B>>],
        filter: Option<&FilterIndices>,
        beam_sizes: &BeamSizes,
    ) -> Result<Beams>;
}

/// Reference selection strategy: copies the first scorer's distribution
/// to the host and ranks continuations there.
///
/// Ranking is fully deterministic. Score ties fall back to the parent's
/// row, then to the word id, so equal inputs always draft equal beams.
#[derive(Debug, Clone, Default)]
pub struct HostBestHyps {
    forbid_unk: bool,
}

impl HostBestHyps {
    /// `forbid_unk` drops continuations that would emit the
    /// unknown-word token.
    pub fn new(forbid_unk: bool) -> Self {
        HostBestHyps { forbid_unk }
    }
}

#[async_trait]
impl<B: DeviceTensor> BestHyps<B> for HostBestHyps {
    async fn calc_beam(
        &self,
        prev_hyps: &Beam,
        scorers: &[Box<dyn Scorer<B>>],
        filter: Option<&FilterIndices>,
        beam_sizes: &BeamSizes,
    ) -> Result<Beams> {
        assert!(
            !scorers.is_empty(),
            "beam selection needs at least one scorer"
        );
        let probs = scorers[0].probs();
        let rows = probs.rows();
        assert_eq!(
            rows,
            prev_hyps.len(),
            "scorer produced {rows} distribution rows for {} live hypotheses",
            prev_hyps.len()
        );
        let width = if rows == 0 { 0 } else { probs.size() / rows };
        if let Some(filter) = filter {
            assert_eq!(
                width,
                filter.len(),
                "distribution width {width} does not match a shortlist of {}",
                filter.len()
            );
        }

        let scores = probs.to_host().await?;
        let mut beams: Beams = vec![Vec::new(); beam_sizes.len()];

        // Live hypotheses arrive grouped by sentence, so one pass over
        // contiguous runs covers the batch.
        let mut base = 0;
        while base < prev_hyps.len() {
            let sentence = prev_hyps[base].sentence() as usize;
            let mut end = base + 1;
            while end < prev_hyps.len() && prev_hyps[end].sentence() as usize == sentence {
                end += 1;
            }

            let mut drafts = Vec::with_capacity((end - base) * width);
            for row in base..end {
                let parent = &prev_hyps[row];
                let block = &scores[row * width..(row + 1) * width];
                for (column, &value) in block.iter().enumerate() {
                    let word = match filter {
                        Some(filter) => filter.word_at(column),
                        None => column as WordId,
                    };
                    if self.forbid_unk && word == UNK_ID {
                        continue;
                    }
                    drafts.push(Hypothesis::new(
                        word,
                        parent.score() + value,
                        Some(parent.id()),
                        row as u32,
                    ));
                }
            }

            drafts.sort_by(|a, b| {
                b.score()
                    .total_cmp(&a.score())
                    .then(a.prev_state_index().cmp(&b.prev_state_index()))
                    .then(a.word().cmp(&b.word()))
            });
            drafts.truncate(beam_sizes.get(sentence));
            beams[sentence] = drafts;

            base = end;
        }

        Ok(beams)
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;
    use crate::backend::HostTensor;
    use crate::beam::HypRef;
    use crate::error::Result;
    use crate::search::scorer::DecoderState;
    use crate::sentence::Sentences;
    use crate::words::EOS_ID;

    #[derive(Debug)]
    struct NullState;

    impl DecoderState for NullState {
        fn rows(&self) -> usize {
            0
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    /// Scorer stub that only serves a fixed distribution.
    #[derive(Debug)]
    struct ProbsOnly {
        probs: HostTensor,
    }

    #[async_trait]
    impl Scorer<HostTensor> for ProbsOnly {
        fn name(&self) -> &str {
            "probs-only"
        }

        fn vocab_size(&self) -> usize {
            self.probs.extent().cols()
        }

        async fn encode(&mut self, _sentences: &Sentences) -> Result<()> {
            Ok(())
        }

        fn new_state(&self) -> Box<dyn DecoderState> {
            Box::new(NullState)
        }

        async fn begin_sentence_state(
            &self,
            _state: &mut dyn DecoderState,
            _batch_size: usize,
        ) -> Result<()> {
            Ok(())
        }

        async fn decode(
            &mut self,
            _state: &dyn DecoderState,
            _next_state: &mut dyn DecoderState,
            _beam_sizes: &BeamSizes,
        ) -> Result<()> {
            Ok(())
        }

        fn probs(&self) -> &HostTensor {
            &self.probs
        }

        async fn assemble_beam_state(
            &self,
            _source: &dyn DecoderState,
            _survivors: &Beam,
            _dest: &mut dyn DecoderState,
        ) -> Result<()> {
            Ok(())
        }

        async fn filter(&mut self, _indices: &FilterIndices) -> Result<()> {
            Ok(())
        }

        fn clean_up_after_sentence(&mut self) {}
    }

    fn ensemble(probs: HostTensor) -> Vec<Box<dyn Scorer<HostTensor>>> {
        vec![Box::new(ProbsOnly { probs })]
    }

    fn seed(sentence: u32) -> HypRef {
        HypRef::new(0, sentence, EOS_ID, 0.0, sentence)
    }

    #[tokio::test]
    async fn selects_the_top_k_per_sentence() {
        let probs = HostTensor::matrix(
            vec![
                -1.0, -0.5, -0.1, -2.0, // sentence 0
                -0.3, -0.9, -1.5, -0.4, // sentence 1
            ],
            2,
            4,
        );
        let prev_hyps = vec![seed(0), seed(1)];
        let strategy = HostBestHyps::new(false);

        let beams = strategy
            .calc_beam(
                &prev_hyps,
                &ensemble(probs),
                None,
                &BeamSizes::uniform(2, 2),
            )
            .await
            .unwrap();

        let words_0: Vec<_> = beams[0].iter().map(Hypothesis::word).collect();
        let words_1: Vec<_> = beams[1].iter().map(Hypothesis::word).collect();
        assert_eq!(words_0, vec![2, 1]);
        assert_eq!(words_1, vec![0, 3]);
        assert_eq!(beams[0][0].score(), -0.1);
        assert_eq!(beams[0][0].parent(), Some(0));
        assert_eq!(beams[1][0].prev_state_index(), 1);
    }

    #[tokio::test]
    async fn accumulates_parent_scores_and_tracks_rows() {
        // Two live hypotheses of the same sentence, parents at rows 0/1.
        let prev_hyps = vec![
            HypRef::new(1, 0, 5, -1.0, 0),
            HypRef::new(2, 0, 6, -0.2, 0),
        ];
        let probs = HostTensor::matrix(
            vec![
                -0.5, -2.0, -2.0, // cum: -1.5 -3.0 -3.0
                -1.0, -0.4, -2.0, // cum: -1.2 -0.6 -2.2
            ],
            2,
            3,
        );
        let strategy = HostBestHyps::new(false);

        let beams = strategy
            .calc_beam(
                &prev_hyps,
                &ensemble(probs),
                None,
                &BeamSizes::uniform(1, 3),
            )
            .await
            .unwrap();

        let top = &beams[0];
        assert_eq!(top.len(), 3);

        assert_eq!(top[0].word(), 1);
        assert_eq!(top[0].score(), -0.6);
        assert_eq!(top[0].parent(), Some(2));
        assert_eq!(top[0].prev_state_index(), 1);

        assert_eq!(top[1].word(), 0);
        assert_eq!(top[1].score(), -1.2);

        assert_eq!(top[2].word(), 0);
        assert_eq!(top[2].parent(), Some(1));
        assert_eq!(top[2].prev_state_index(), 0);
    }

    #[tokio::test]
    async fn maps_shortlist_columns_to_vocabulary_words() {
        let shortlist = FilterIndices::new(vec![4, 7]);
        assert_eq!(shortlist.len(), 3);

        let probs = HostTensor::matrix(vec![-1.0, -0.1, -0.5], 1, 3);
        let strategy = HostBestHyps::new(false);

        let beams = strategy
            .calc_beam(
                &vec![seed(0)],
                &ensemble(probs),
                Some(&shortlist),
                &BeamSizes::uniform(1, 2),
            )
            .await
            .unwrap();

        let words: Vec<_> = beams[0].iter().map(Hypothesis::word).collect();
        assert_eq!(words, vec![4, 7]);
        for hyp in &beams[0] {
            assert!(shortlist.contains(hyp.word()));
        }
    }

    #[tokio::test]
    async fn forbids_unknown_words_when_asked() {
        let probs = HostTensor::matrix(vec![-1.0, -0.05, -0.5], 1, 3);

        let permissive = HostBestHyps::new(false)
            .calc_beam(
                &vec![seed(0)],
                &ensemble(probs.clone()),
                None,
                &BeamSizes::uniform(1, 1),
            )
            .await
            .unwrap();
        assert_eq!(permissive[0][0].word(), UNK_ID);

        let strict = HostBestHyps::new(true)
            .calc_beam(
                &vec![seed(0)],
                &ensemble(probs),
                None,
                &BeamSizes::uniform(1, 3),
            )
            .await
            .unwrap();
        let words: Vec<_> = strict[0].iter().map(Hypothesis::word).collect();
        assert_eq!(words, vec![2, 0]);
    }

    #[tokio::test]
    async fn equal_scores_fall_back_to_row_then_word_order() {
        let prev_hyps = vec![
            HypRef::new(1, 0, 5, 0.0, 0),
            HypRef::new(2, 0, 6, 0.0, 0),
        ];
        let probs = HostTensor::matrix(vec![-0.5; 4], 2, 2);
        let strategy = HostBestHyps::new(false);

        let first = strategy
            .calc_beam(
                &prev_hyps,
                &ensemble(probs.clone()),
                None,
                &BeamSizes::uniform(1, 3),
            )
            .await
            .unwrap();

        let order: Vec<_> = first[0]
            .iter()
            .map(|hyp| (hyp.prev_state_index(), hyp.word()))
            .collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 0)]);

        let second = strategy
            .calc_beam(
                &prev_hyps,
                &ensemble(probs),
                None,
                &BeamSizes::uniform(1, 3),
            )
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn zero_width_sentences_get_no_drafts() {
        // Sentence 0 is done; only sentence 1 still has a live hypothesis.
        let mut sizes = BeamSizes::uniform(2, 1);
        sizes.decrement(0);

        let probs = HostTensor::matrix(vec![-0.2, -0.4], 1, 2);

        let beams = HostBestHyps::new(false)
            .calc_beam(&vec![seed(1)], &ensemble(probs), None, &sizes)
            .await
            .unwrap();

        assert!(beams[0].is_empty());
        assert_eq!(beams[1].len(), 1);
        assert_eq!(beams[1][0].word(), 0);
    }

    #[tokio::test]
    #[should_panic(expected = "distribution rows")]
    async fn panics_when_rows_disagree_with_live_hypotheses() {
        let probs = HostTensor::matrix(vec![-0.2, -0.4, -0.1, -0.3], 2, 2);

        let _ = HostBestHyps::new(false)
            .calc_beam(
                &vec![seed(0)],
                &ensemble(probs),
                None,
                &BeamSizes::uniform(1, 1),
            )
            .await;
    }
}
