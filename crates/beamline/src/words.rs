//! Token identifiers shared across the decoding pipeline.

/// Numeric identifier of a vocabulary entry.
pub type WordId = u32;

/// A token sequence, source or target side.
pub type Words = Vec<WordId>;

/// End-of-sequence marker, fixed at vocabulary slot `0`.
pub const EOS_ID: WordId = 0;

/// Unknown-word marker, fixed at vocabulary slot `1`.
pub const UNK_ID: WordId = 1;
