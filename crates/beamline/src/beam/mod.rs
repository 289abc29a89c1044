//! Beam bookkeeping: hypothesis records, per-sentence beam widths, and
//! the backpointer forest finished translations are read out of.

mod history;
mod hypothesis;
mod sizes;

pub use history::{Histories, History, Translation};
pub use hypothesis::{Beam, Beams, HypId, HypRef, Hypothesis};
pub use sizes::BeamSizes;
