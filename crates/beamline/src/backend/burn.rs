use async_trait::async_trait;
use burn::prelude::Backend as BurnBackend;
use burn::tensor::{ElementConversion, Int, Tensor, TensorData};

use super::core_trait::DeviceTensor;
use crate::error::{Error, Result};

/// Burn tensors are ranked at the type level, so the contract is
/// implemented once per rank the decoder runtime supports.
macro_rules! device_tensor_impl {
    ($rank:literal) => {
        #[async_trait]
        impl<B> DeviceTensor for Tensor<B, $rank>
        where
            B: BurnBackend,
        {
            fn shape(&self) -> Vec<usize> {
                self.dims().to_vec()
            }

            async fn sum(&self) -> Result<f32> {
                Ok(self.clone().sum().into_scalar().elem::<f32>())
            }

            async fn gather_rows(&self, indices: &[u32]) -> Result<Self> {
                let rows = self.dims()[0];
                if let Some(&bad) = indices.iter().find(|&&index| index as usize >= rows) {
                    return Err(Error::Device(format!(
                        "gather row {bad} out of range for tensor with {rows} rows"
                    )));
                }
                let lookup: Vec<i32> = indices.iter().map(|&index| index as i32).collect();
                let lookup = Tensor::<B, 1, Int>::from_data(
                    TensorData::new(lookup, [indices.len()]),
                    &self.device(),
                );
                Ok(self.clone().select(0, lookup))
            }

            async fn to_host(&self) -> Result<Vec<f32>> {
                self.clone()
                    .into_data()
                    .convert::<f32>()
                    .to_vec::<f32>()
                    .map_err(|error| Error::Device(format!("tensor readback failed: {error:?}")))
            }
        }
    };
}

device_tensor_impl!(1);
device_tensor_impl!(2);
device_tensor_impl!(3);
device_tensor_impl!(4);
