use async_trait::async_trait;
use candle_core::{DType, Tensor};

use super::core_trait::DeviceTensor;
use crate::error::Result;

#[async_trait]
impl DeviceTensor for Tensor {
    fn shape(&self) -> Vec<usize> {
        self.dims().to_vec()
    }

    async fn sum(&self) -> Result<f32> {
        let total = self.sum_all()?.to_dtype(DType::F32)?.to_scalar::<f32>()?;
        Ok(total)
    }

    async fn gather_rows(&self, indices: &[u32]) -> Result<Self> {
        let lookup = Tensor::new(indices, self.device())?;
        let gathered = self.index_select(&lookup, 0)?.contiguous()?;
        Ok(gathered)
    }

    async fn to_host(&self) -> Result<Vec<f32>> {
        let flat = self.flatten_all()?.to_dtype(DType::F32)?;
        Ok(flat.to_vec1::<f32>()?)
    }
}
