//! # Device Tensor Runtime
//!
//! This module provides a unified interface over the device-resident
//! buffers decoder state lives in, allowing the search loop to work in
//! a backend-agnostic manner.
//!
//! The contract is deliberately small. Decoding needs exactly three
//! things from a tensor: its shape, a row gather to reorder hypothesis
//! state between steps, and a host readback at decision points. A
//! scalar reduction rounds it out for diagnostics.
//!
//! ## Feature Flags
//!
//! The module uses feature flags to conditionally compile support for
//! different backends:
//!
//! - `candle`: Enables support for the Candle tensor library
//! - `burn`: Enables support for the Burn tensor library
//!
//! [`HostTensor`] is always available and keeps the reference semantics
//! device implementations must match.

mod core_trait;
mod host;

#[cfg_attr(docsrs, doc(cfg(feature = "candle")))]
#[cfg(feature = "candle")]
/// Candle tensor runtime implementation.
///
/// This module is only available when the `candle` feature flag is
/// enabled. It implements [`DeviceTensor`] for Candle's `Tensor` type,
/// wrapping candle-core's operations to match the expected behavior of
/// the tensor contract.
pub mod candle;

#[cfg_attr(docsrs, doc(cfg(feature = "burn")))]
#[cfg(feature = "burn")]
/// Burn tensor runtime implementation.
///
/// This module is only available when the `burn` feature flag is
/// enabled. It implements [`DeviceTensor`] for Burn's float tensors up
/// to rank four.
pub mod burn;

// Re-export the core trait for convenient imports
pub use core_trait::*;
pub use host::{HostTensor, SHAPE_SIZE, Shape};

use std::fmt;

/// Kind of compute device a search is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Cpu,
    Gpu,
    Fpga,
}

/// Identifies the device a [`Search`](crate::search::Search) runs
/// against. The engine itself only reports it in logs; scorers are
/// expected to have placed their weights there already.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    pub kind: DeviceKind,
    pub id: usize,
}

impl DeviceInfo {
    pub fn new(kind: DeviceKind, id: usize) -> Self {
        DeviceInfo { kind, id }
    }

    /// Host CPU, device id `0`.
    pub fn cpu() -> Self {
        DeviceInfo::new(DeviceKind::Cpu, 0)
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            DeviceKind::Cpu => "cpu",
            DeviceKind::Gpu => "gpu",
            DeviceKind::Fpga => "fpga",
        };
        write!(f, "{}:{}", kind, self.id)
    }
}
