use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::Result;

/// How much detail [`DeviceTensor::describe`] includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Shape and element count only.
    Shape,
    /// Adds the element sum.
    Summary,
    /// Adds every element value.
    Full,
}

/// The tensor contract the decoding engine requires from a backend.
///
/// Implementations wrap a contiguous, row-major, device-resident `f32`
/// buffer. The leading dimension is the row dimension: the engine keeps
/// one row per live hypothesis and reshuffles rows between decode steps
/// with [`DeviceTensor::gather_rows`].
///
/// Operations are `async` because real devices execute them out of line
/// with control flow. A call submits work; the `await` is the
/// synchronization point. [`DeviceTensor::to_host`] and
/// [`DeviceTensor::sum`] complete all pending work on the tensor before
/// returning, so callers always observe their own writes.
#[async_trait]
pub trait DeviceTensor: Debug + Clone + Send + Sync + 'static {
    /// Dimensions of the tensor, row dimension first.
    fn shape(&self) -> Vec<usize>;

    /// Number of rows the tensor holds.
    fn rows(&self) -> usize {
        self.shape().first().copied().unwrap_or(0)
    }

    /// Total number of elements.
    fn size(&self) -> usize {
        self.shape().iter().product()
    }

    /// Reduces the whole buffer to its element sum.
    ///
    /// Diagnostic use only. Implementations are free to be slow and
    /// simple here; the search loop never calls this while ranking.
    async fn sum(&self) -> Result<f32>;

    /// Builds a new tensor whose row `i` is row `indices[i]` of `self`.
    ///
    /// Indices may repeat and may arrive in any order; the source is
    /// left untouched either way. An index outside `0..self.rows()` is
    /// reported as [`Error::Device`](crate::Error::Device).
    async fn gather_rows(&self, indices: &[u32]) -> Result<Self>;

    /// Copies the buffer back to host memory in row-major order.
    async fn to_host(&self) -> Result<Vec<f32>>;

    /// Human-readable summary of the tensor, for logging.
    async fn describe(&self, verbosity: Verbosity) -> Result<String> {
        let mut out = format!("shape={:?} size={}", self.shape(), self.size());
        if verbosity >= Verbosity::Summary {
            out.push_str(&format!(" sum={}", self.sum().await?));
        }
        if verbosity >= Verbosity::Full {
            let values: Vec<String> = self
                .to_host()
                .await?
                .iter()
                .map(|value| value.to_string())
                .collect();
            out.push_str(&format!(" values=[{}]", values.join(" ")));
        }
        Ok(out)
    }
}
