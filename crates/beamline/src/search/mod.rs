//! Beam search over pluggable scorers.
//!
//! ## Overview
//!
//! A [`Search`] drives one or more [`Scorer`]s through the decode loop:
//! encode the batch, step every scorer in lockstep, pick each
//! sentence's best continuations with a [`BestHyps`] strategy, and
//! rebuild decoder state behind the survivors until every sentence has
//! finished or hit its step bound. An optional [`Filter`] shrinks the
//! target vocabulary per batch before any of that starts.
//!
//! Scorers stay generic over the tensor backend their distributions
//! live in, so the same loop drives host-memory stubs in tests and
//! device-resident models in production.
//!
//! ## Example
//!
//! A minimal scorer that favors end-of-sequence everywhere, decoded
//! greedily over a host tensor:
//!
//! ```
//! use std::any::Any;
//!
//! use async_trait::async_trait;
//! use beamline::backend::{DeviceInfo, HostTensor};
//! use beamline::beam::{Beam, BeamSizes};
//! use beamline::search::{
//!     DecoderState, FilterIndices, HostBestHyps, Scorer, Search, SearchConfig,
//! };
//! use beamline::{EOS_ID, Result, Sentences};
//!
//! #[derive(Debug)]
//! struct EosState {
//!     rows: usize,
//! }
//!
//! impl DecoderState for EosState {
//!     fn rows(&self) -> usize {
//!         self.rows
//!     }
//!
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//!
//!     fn as_any_mut(&mut self) -> &mut dyn Any {
//!         self
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct EosScorer {
//!     probs: HostTensor,
//! }
//!
//! #[async_trait]
//! impl Scorer<HostTensor> for EosScorer {
//!     fn name(&self) -> &str {
//!         "eos"
//!     }
//!
//!     fn vocab_size(&self) -> usize {
//!         4
//!     }
//!
//!     async fn encode(&mut self, _sentences: &Sentences) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn new_state(&self) -> Box<dyn DecoderState> {
//!         Box::new(EosState { rows: 0 })
//!     }
//!
//!     async fn begin_sentence_state(
//!         &self,
//!         state: &mut dyn DecoderState,
//!         batch_size: usize,
//!     ) -> Result<()> {
//!         state.as_any_mut().downcast_mut::<EosState>().unwrap().rows = batch_size;
//!         Ok(())
//!     }
//!
//!     async fn decode(
//!         &mut self,
//!         state: &dyn DecoderState,
//!         next_state: &mut dyn DecoderState,
//!         _beam_sizes: &BeamSizes,
//!     ) -> Result<()> {
//!         let rows = state.rows();
//!         let mut data = vec![-4.0; rows * self.vocab_size()];
//!         for row in 0..rows {
//!             data[row * self.vocab_size()] = -0.5;
//!         }
//!         self.probs = HostTensor::matrix(data, rows, self.vocab_size());
//!         next_state.as_any_mut().downcast_mut::<EosState>().unwrap().rows = rows;
//!         Ok(())
//!     }
//!
//!     fn probs(&self) -> &HostTensor {
//!         &self.probs
//!     }
//!
//!     async fn assemble_beam_state(
//!         &self,
//!         _source: &dyn DecoderState,
//!         survivors: &Beam,
//!         dest: &mut dyn DecoderState,
//!     ) -> Result<()> {
//!         dest.as_any_mut().downcast_mut::<EosState>().unwrap().rows = survivors.len();
//!         Ok(())
//!     }
//!
//!     async fn filter(&mut self, _indices: &FilterIndices) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn clean_up_after_sentence(&mut self) {}
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let scorers: Vec<Box<dyn Scorer<HostTensor>>> = vec![Box::new(EosScorer {
//!     probs: HostTensor::new(),
//! })];
//! let mut search = Search::new(
//!     DeviceInfo::cpu(),
//!     scorers,
//!     Box::new(HostBestHyps::new(true)),
//!     None,
//!     SearchConfig::default(),
//! )?;
//!
//! let histories = search
//!     .translate(&Sentences::from_words(vec![vec![2, 3]]))
//!     .await?;
//! let best = histories.get(0).top().expect("a finished candidate");
//! assert_eq!(best.words(), &[EOS_ID]);
//! # Ok(())
//! # }
//! ```

mod best_hyps;
mod engine;
mod filter;
mod scorer;

pub use best_hyps::{BestHyps, HostBestHyps};
pub use engine::{Search, SearchConfig};
pub use filter::{Filter, FilterIndices, TableFilter};
pub use scorer::{DecoderState, Scorer};
