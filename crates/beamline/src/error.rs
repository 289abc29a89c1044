//! Error type shared by the engine, the tensor runtime, and scorers.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures a search can surface to its caller.
///
/// Contract violations between the engine and its collaborators (row
/// counts out of step, beam widths going negative) are bugs, not
/// runtime conditions, and panic instead of producing a variant here.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected before decoding starts: empty ensembles, zero beam
    /// widths, malformed batches.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A device-side tensor operation failed.
    #[error("device error: {0}")]
    Device(String),

    /// A scorer failed while encoding, stepping, or rebuilding state.
    #[error("scorer `{name}`: {message}")]
    Scorer { name: String, message: String },
}

impl Error {
    /// Builds an [`Error::Scorer`] tagged with the offending scorer's name.
    pub fn scorer(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Scorer {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[cfg(feature = "candle")]
impl From<candle_core::Error> for Error {
    fn from(value: candle_core::Error) -> Self {
        Error::Device(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_variants_with_context() {
        let config = Error::Config("empty batch".to_string());
        assert_eq!(config.to_string(), "invalid configuration: empty batch");

        let device = Error::Device("gather out of range".to_string());
        assert_eq!(device.to_string(), "device error: gather out of range");

        let scorer = Error::scorer("nmt", "weights missing");
        assert_eq!(scorer.to_string(), "scorer `nmt`: weights missing");
    }
}
