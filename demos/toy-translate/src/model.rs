use std::any::Any;
use std::collections::HashMap;

use async_trait::async_trait;
use beamline::backend::{DeviceTensor, HostTensor};
use beamline::beam::{Beam, BeamSizes};
use beamline::search::{DecoderState, FilterIndices, Scorer};
use beamline::{EOS_ID, Result, Sentences, UNK_ID, WordId};

const STEP_SCORE: f32 = -0.1;
const OFF_SCRIPT_SCORE: f32 = -5.0;

/// One row per live hypothesis: column 0 is the sentence row, column 1
/// how many target words the hypothesis has emitted so far.
#[derive(Debug)]
pub struct CursorState {
    cursors: HostTensor,
}

impl DecoderState for CursorState {
    fn rows(&self) -> usize {
        self.cursors.extent().rows()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Word-for-word glossing model.
///
/// Every source word maps through a fixed lexicon to one target word;
/// words without an entry gloss to the unknown token, and sentences
/// close with end-of-sequence once the source is used up. Good enough
/// to watch the beam machinery run end to end.
pub struct LexiconModel {
    vocab_size: usize,
    lexicon: HashMap<WordId, WordId>,
    targets: Vec<Vec<WordId>>,
    shortlist: Option<FilterIndices>,
    probs: HostTensor,
}

impl LexiconModel {
    pub fn new(vocab_size: usize, entries: &[(WordId, WordId)]) -> Self {
        LexiconModel {
            vocab_size,
            lexicon: entries.iter().copied().collect(),
            targets: Vec::new(),
            shortlist: None,
            probs: HostTensor::new(),
        }
    }

    fn favored(&self, sentence: usize, position: usize) -> WordId {
        self.targets
            .get(sentence)
            .and_then(|target| target.get(position))
            .copied()
            .unwrap_or(EOS_ID)
    }

    fn cursor<'a>(&self, state: &'a dyn DecoderState) -> &'a CursorState {
        state
            .as_any()
            .downcast_ref()
            .expect("state built by this model")
    }

    fn cursor_mut<'a>(&self, state: &'a mut dyn DecoderState) -> &'a mut CursorState {
        state
            .as_any_mut()
            .downcast_mut()
            .expect("state built by this model")
    }
}

#[async_trait]
impl Scorer<HostTensor> for LexiconModel {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    async fn encode(&mut self, sentences: &Sentences) -> Result<()> {
        let lexicon = &self.lexicon;
        self.targets = sentences
            .iter()
            .map(|sentence| {
                sentence
                    .words()
                    .iter()
                    .map(|word| lexicon.get(word).copied().unwrap_or(UNK_ID))
                    .collect()
            })
            .collect();
        Ok(())
    }

    fn new_state(&self) -> Box<dyn DecoderState> {
        Box::new(CursorState {
            cursors: HostTensor::new(),
        })
    }

    async fn begin_sentence_state(
        &self,
        state: &mut dyn DecoderState,
        batch_size: usize,
    ) -> Result<()> {
        let state = self.cursor_mut(state);
        state.cursors.resize(batch_size, 2, 1, 1);
        for row in 0..batch_size {
            let cells = state.cursors.row_mut(row);
            cells[0] = row as f32;
            cells[1] = 0.0;
        }
        Ok(())
    }

    async fn decode(
        &mut self,
        state: &dyn DecoderState,
        next_state: &mut dyn DecoderState,
        _beam_sizes: &BeamSizes,
    ) -> Result<()> {
        let src = self.cursor(state);
        let rows = src.rows();
        let width = match &self.shortlist {
            Some(shortlist) => shortlist.len(),
            None => self.vocab_size,
        };

        let mut probs =
            HostTensor::from_vec(vec![OFF_SCRIPT_SCORE; rows * width], rows, width, 1, 1);
        for row in 0..rows {
            let cells = src.cursors.row(row);
            let favored = self.favored(cells[0] as usize, cells[1] as usize);
            let column = match &self.shortlist {
                Some(shortlist) => shortlist
                    .as_slice()
                    .iter()
                    .position(|&word| word == favored),
                None => Some(favored as usize),
            };
            if let Some(column) = column {
                probs.row_mut(row)[column] = STEP_SCORE;
            }
        }

        let next = self.cursor_mut(next_state);
        next.cursors.resize(rows, 2, 1, 1);
        for row in 0..rows {
            let cells = src.cursors.row(row);
            let out = next.cursors.row_mut(row);
            out[0] = cells[0];
            out[1] = cells[1] + 1.0;
        }

        self.probs = probs;
        Ok(())
    }

    fn probs(&self) -> &HostTensor {
        &self.probs
    }

    async fn assemble_beam_state(
        &self,
        source: &dyn DecoderState,
        survivors: &Beam,
        dest: &mut dyn DecoderState,
    ) -> Result<()> {
        let indices: Vec<u32> = survivors.iter().map(|hyp| hyp.prev_state_index()).collect();
        let gathered = self.cursor(source).cursors.gather_rows(&indices).await?;
        self.cursor_mut(dest).cursors = gathered;
        Ok(())
    }

    async fn filter(&mut self, indices: &FilterIndices) -> Result<()> {
        self.shortlist = Some(indices.clone());
        Ok(())
    }

    fn clean_up_after_sentence(&mut self) {
        self.targets.clear();
        self.shortlist = None;
    }
}
