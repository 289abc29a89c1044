//! Reference tensor runtime in host memory.
//!
//! [`HostTensor`] backs the test suite, the demos, and any scorer that
//! is happy running on the CPU. It pins down the exact semantics device
//! implementations must reproduce, in plain `Vec<f32>` form.

use async_trait::async_trait;

use super::core_trait::DeviceTensor;
use crate::error::{Error, Result};

/// Number of dimensions every [`HostTensor`] carries.
pub const SHAPE_SIZE: usize = 4;

/// Row-major extent of a [`HostTensor`].
///
/// Decoder math only ever needs matrices, so almost every tensor is
/// `(rows, cols, 1, 1)`. The two trailing dimensions exist for models
/// that keep per-row planes around; they fold into the row stride.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shape {
    dims: [usize; SHAPE_SIZE],
}

impl Shape {
    pub fn new(rows: usize, cols: usize, c: usize, d: usize) -> Self {
        Shape {
            dims: [rows, cols, c, d],
        }
    }

    /// Extent along `index`.
    ///
    /// # Panics
    /// If `index` is not below [`SHAPE_SIZE`].
    pub fn dim(&self, index: usize) -> usize {
        self.dims[index]
    }

    pub fn rows(&self) -> usize {
        self.dims[0]
    }

    pub fn cols(&self) -> usize {
        self.dims[1]
    }

    /// Total number of elements.
    pub fn size(&self) -> usize {
        self.dims.iter().product()
    }

    /// Elements per row, the product of the trailing dimensions.
    pub fn row_size(&self) -> usize {
        self.dims[1] * self.dims[2] * self.dims[3]
    }

    pub fn dims(&self) -> [usize; SHAPE_SIZE] {
        self.dims
    }
}

/// Dense `f32` tensor in host memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostTensor {
    shape: Shape,
    data: Vec<f32>,
}

impl HostTensor {
    /// Empty tensor with zero extent in every dimension.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tensor of the given extent, filled with zeros.
    pub fn zeros(rows: usize, cols: usize, c: usize, d: usize) -> Self {
        let shape = Shape::new(rows, cols, c, d);
        HostTensor {
            shape,
            data: vec![0.0; shape.size()],
        }
    }

    /// Wraps an existing row-major buffer.
    ///
    /// # Panics
    /// If `data.len()` does not match the extent.
    pub fn from_vec(data: Vec<f32>, rows: usize, cols: usize, c: usize, d: usize) -> Self {
        let shape = Shape::new(rows, cols, c, d);
        assert_eq!(
            data.len(),
            shape.size(),
            "buffer of {} elements does not fill shape {:?}",
            data.len(),
            shape.dims()
        );
        HostTensor { shape, data }
    }

    /// Matrix helper with the trailing dimensions pinned to one.
    pub fn matrix(data: Vec<f32>, rows: usize, cols: usize) -> Self {
        Self::from_vec(data, rows, cols, 1, 1)
    }

    /// The tensor's 4-D extent.
    pub fn extent(&self) -> Shape {
        self.shape
    }

    /// Read-only view of the underlying row-major buffer.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable view of the underlying row-major buffer.
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Row `index` as a flat slice of `row_size` elements.
    pub fn row(&self, index: usize) -> &[f32] {
        let width = self.shape.row_size();
        &self.data[index * width..(index + 1) * width]
    }

    /// Mutable counterpart of [`HostTensor::row`].
    pub fn row_mut(&mut self, index: usize) -> &mut [f32] {
        let width = self.shape.row_size();
        &mut self.data[index * width..(index + 1) * width]
    }

    /// Reinterprets the buffer under a new extent.
    ///
    /// Growth zero-fills, shrinking truncates; the surviving prefix is
    /// carried over as raw row-major data. The underlying allocation
    /// never shrinks, so a buffer can be resized every step without
    /// churning memory.
    pub fn resize(&mut self, rows: usize, cols: usize, c: usize, d: usize) {
        let shape = Shape::new(rows, cols, c, d);
        self.data.resize(shape.size(), 0.0);
        self.shape = shape;
    }
}

#[async_trait]
impl DeviceTensor for HostTensor {
    fn shape(&self) -> Vec<usize> {
        self.shape.dims().to_vec()
    }

    async fn sum(&self) -> Result<f32> {
        Ok(self.data.iter().sum())
    }

    async fn gather_rows(&self, indices: &[u32]) -> Result<Self> {
        let rows = self.shape.rows();
        let width = self.shape.row_size();
        let mut out = HostTensor::zeros(
            indices.len(),
            self.shape.cols(),
            self.shape.dim(2),
            self.shape.dim(3),
        );
        for (dest, &src) in indices.iter().enumerate() {
            let src = src as usize;
            if src >= rows {
                return Err(Error::Device(format!(
                    "gather row {src} out of range for tensor with {rows} rows"
                )));
            }
            out.data[dest * width..(dest + 1) * width]
                .copy_from_slice(&self.data[src * width..(src + 1) * width]);
        }
        Ok(out)
    }

    async fn to_host(&self) -> Result<Vec<f32>> {
        Ok(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Verbosity;

    #[tokio::test]
    async fn gather_with_identity_indices_copies_the_tensor() {
        let tensor = HostTensor::matrix(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);

        let gathered = tensor.gather_rows(&[0, 1, 2]).await.unwrap();

        assert_eq!(gathered, tensor);
    }

    #[tokio::test]
    async fn gather_duplicates_and_reorders_rows() {
        let tensor = HostTensor::matrix(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);

        let gathered = tensor.gather_rows(&[2, 0, 0]).await.unwrap();

        assert_eq!(gathered.data(), &[5.0, 6.0, 1.0, 2.0, 1.0, 2.0]);
        assert_eq!(gathered.extent().rows(), 3);
        // Source rows stay put
        assert_eq!(tensor.row(0), &[1.0, 2.0]);
        assert_eq!(tensor.row(2), &[5.0, 6.0]);
    }

    #[tokio::test]
    async fn gather_with_no_indices_yields_an_empty_tensor() {
        let tensor = HostTensor::matrix(vec![1.0, 2.0], 1, 2);

        let gathered = tensor.gather_rows(&[]).await.unwrap();

        assert_eq!(gathered.extent().rows(), 0);
        assert!(gathered.data().is_empty());
    }

    #[tokio::test]
    async fn gather_rejects_out_of_range_rows() {
        let tensor = HostTensor::matrix(vec![1.0, 2.0, 3.0, 4.0], 2, 2);

        let result = tensor.gather_rows(&[0, 2]).await;

        assert!(matches!(result, Err(Error::Device(_))));
    }

    #[tokio::test]
    async fn gather_respects_trailing_dimensions() {
        // two rows of a 2x2 plane each
        let tensor = HostTensor::from_vec((0..8).map(|v| v as f32).collect(), 2, 2, 2, 1);

        let gathered = tensor.gather_rows(&[1]).await.unwrap();

        assert_eq!(gathered.data(), &[4.0, 5.0, 6.0, 7.0]);
        assert_eq!(gathered.extent().dims(), [1, 2, 2, 1]);
    }

    #[tokio::test]
    async fn sum_of_zeros_is_zero() {
        let tensor = HostTensor::zeros(4, 3, 1, 1);
        assert_eq!(tensor.sum().await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn sum_finds_a_single_value_anywhere() {
        for position in [0, 5, 11] {
            let mut tensor = HostTensor::zeros(3, 4, 1, 1);
            tensor.data_mut()[position] = 2.5;
            assert_eq!(tensor.sum().await.unwrap(), 2.5);
        }
    }

    #[tokio::test]
    async fn to_host_returns_row_major_order() {
        let tensor = HostTensor::matrix(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        assert_eq!(tensor.to_host().await.unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[tokio::test]
    async fn describe_levels_add_detail() {
        let tensor = HostTensor::matrix(vec![1.0, 2.0, 3.0], 1, 3);

        let shape_only = tensor.describe(Verbosity::Shape).await.unwrap();
        assert!(shape_only.contains("shape=[1, 3, 1, 1]"));
        assert!(!shape_only.contains("sum="));

        let summary = tensor.describe(Verbosity::Summary).await.unwrap();
        assert!(summary.contains("sum=6"));
        assert!(!summary.contains("values="));

        let full = tensor.describe(Verbosity::Full).await.unwrap();
        assert!(full.contains("values=[1 2 3]"));
    }

    #[test]
    fn resize_grows_with_zero_fill_and_truncates_on_shrink() {
        let mut tensor = HostTensor::matrix(vec![1.0, 2.0, 3.0, 4.0], 2, 2);

        tensor.resize(3, 2, 1, 1);
        assert_eq!(tensor.data(), &[1.0, 2.0, 3.0, 4.0, 0.0, 0.0]);

        tensor.resize(1, 2, 1, 1);
        assert_eq!(tensor.data(), &[1.0, 2.0]);
        assert_eq!(tensor.extent().rows(), 1);
    }

    #[test]
    fn rows_and_size_come_from_the_shape() {
        let tensor = HostTensor::zeros(5, 2, 3, 1);
        assert_eq!(tensor.rows(), 5);
        assert_eq!(tensor.size(), 30);
        assert_eq!(tensor.extent().row_size(), 6);
    }

    #[test]
    #[should_panic(expected = "does not fill shape")]
    fn from_vec_rejects_mismatched_buffers() {
        HostTensor::from_vec(vec![1.0, 2.0, 3.0], 2, 2, 1, 1);
    }
}
