//! Collaborator contracts: model scorers and their decoder states.

use std::any::Any;
use std::fmt::Debug;

use async_trait::async_trait;

use super::filter::FilterIndices;
use crate::backend::DeviceTensor;
use crate::beam::{Beam, BeamSizes};
use crate::error::Result;
use crate::sentence::Sentences;

/// Opaque per-scorer recurrent state.
///
/// The engine never looks inside a state beyond its row count; it only
/// moves whole states between the slot a scorer reads and the slot it
/// writes. Scorers get their concrete type back by downcasting through
/// [`DecoderState::as_any`].
pub trait DecoderState: Debug + Send + Sync {
    /// Number of hypothesis rows the state currently holds.
    fn rows(&self) -> usize;

    /// Upcast for scorer-side downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for scorer-side downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A model that scores target-side continuations.
///
/// A [`Search`](super::Search) owns an ensemble of scorers and steps
/// them in lockstep: every scorer sees the same beam widths and the same
/// survivor order, so the rows of all their states stay aligned
/// one-to-one with the live hypotheses.
///
/// The per-batch lifecycle is:
///
/// 1. [`Scorer::filter`], when a vocabulary filter is configured
/// 2. [`Scorer::encode`] once over the source batch
/// 3. [`Scorer::new_state`] twice (read and write slot), then
///    [`Scorer::begin_sentence_state`] on the read slot
/// 4. per step: [`Scorer::decode`], then
///    [`Scorer::assemble_beam_state`] to line the read slot up behind
///    the surviving hypotheses
/// 5. [`Scorer::clean_up_after_sentence`], on success and on failure
///
/// Weights are expected to be shared read-only state: several searches
/// may hold scorers over the same model concurrently.
#[async_trait]
pub trait Scorer<B: DeviceTensor>: Send + Sync {
    /// Short name used in logs and error reports.
    fn name(&self) -> &str;

    /// Size of the unfiltered target vocabulary this scorer emits.
    fn vocab_size(&self) -> usize;

    /// Runs the source side once per batch, caching whatever the decode
    /// steps will need.
    async fn encode(&mut self, sentences: &Sentences) -> Result<()>;

    /// Fresh, empty state of this scorer's concrete type.
    fn new_state(&self) -> Box<dyn DecoderState>;

    /// Fills `state` with one start row per sentence, in batch order.
    async fn begin_sentence_state(
        &self,
        state: &mut dyn DecoderState,
        batch_size: usize,
    ) -> Result<()>;

    /// One decode step: reads `state`, writes the stepped rows into
    /// `next_state`, and leaves a distribution over the (possibly
    /// filtered) vocabulary in the buffer served by [`Scorer::probs`],
    /// one row per live hypothesis.
    async fn decode(
        &mut self,
        state: &dyn DecoderState,
        next_state: &mut dyn DecoderState,
        beam_sizes: &BeamSizes,
    ) -> Result<()>;

    /// Distribution produced by the most recent [`Scorer::decode`] call.
    fn probs(&self) -> &B;

    /// Rebuilds `dest` from `source` so its rows follow the surviving
    /// hypotheses: row `i` of `dest` is row
    /// `survivors[i].prev_state_index()` of `source`.
    async fn assemble_beam_state(
        &self,
        source: &dyn DecoderState,
        survivors: &Beam,
        dest: &mut dyn DecoderState,
    ) -> Result<()>;

    /// Restricts every later distribution to the given vocabulary
    /// shortlist, in shortlist column order.
    async fn filter(&mut self, indices: &FilterIndices) -> Result<()>;

    /// Drops per-batch caches once a translation finishes, successfully
    /// or not.
    fn clean_up_after_sentence(&mut self);
}
