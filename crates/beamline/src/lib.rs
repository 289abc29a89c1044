//! # Beamline
//!
//! A batched **beam** search decoding engine for sequence-to-sequence
//! models, built around a thin device tensor abstraction.
//!
//! ## Overview
//!
//! This library runs the target-side search loop of a translation (or
//! any other sequence generation) system. It takes a batch of source
//! sentences, steps an ensemble of model scorers in lockstep, keeps a
//! per-sentence beam of live hypotheses, and records every candidate in
//! a backpointer forest that finished translations are read out of.
//!
//! Key components include:
//!
//! - A tensor abstraction layer supporting various backends
//! - The [`search::Search`] engine driving the decode loop
//! - Beam bookkeeping: per-sentence widths, hypothesis records, and
//!   n-best extraction
//! - Vocabulary shortlists that shrink the output layer per batch
//!
//! ## Architecture
//!
//! The engine is built around several key abstractions:
//!
//! ### Assumptions
//!
//! Regardless of backend used, beamline reserves the leading tensor
//! dimension with a special meaning:
//!  - The `0th` dimension is the hypothesis (row) dimension
//!  - Tensors may fill in other dimensions as their models require
//!
//! Between decode steps the engine reorders rows so that every scorer's
//! recurrent state lines up one-to-one with the surviving hypotheses.
//!
//! ### Backend Trait
//!
//! The [`backend::DeviceTensor`] trait defines the interface any tensor
//! implementation must satisfy to carry decoder state: shape queries, a
//! row gather, a host readback, and a diagnostic reduction. This keeps
//! the core search logic independent of the specific tensor library.
//!
//! ### Scorers and Selection
//!
//! The [`search::Scorer`] trait defines the interface for models that
//! score continuations step by step, while [`search::BestHyps`]
//! encapsulates how the next beam is chosen from their distributions.
//!
//! ## Features
//!
//! - **candle** - Enables the candle backend
//! - **burn** - Enables the burn backend
//!
//! ## Implementation Details
//!
//! Hypotheses are recorded per sentence in an append-only arena and
//! reference their parent by index, so extracting a translation is a
//! walk from a finished leaf back to the start marker. Sentences leave
//! the batch individually: each end-of-sequence hypothesis shrinks its
//! sentence's beam width, and decoding stops once every width reaches
//! zero or the step bound is hit.

mod error;
mod sentence;
mod words;

pub mod backend;
pub mod beam;
pub mod search;

pub use error::{Error, Result};
pub use sentence::{Sentence, Sentences};
pub use words::{EOS_ID, UNK_ID, WordId, Words};
