//! REINFORCE agent implemented with [candle](https://crates.io/crates/candle-core).
pub mod mlp;
pub mod model;
pub mod opt;
pub mod reinforce;
pub mod util;
use anyhow::Result;
use candle_core::Tensor;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The main GPU device.
    Cuda(usize),
}

impl Default for Device {
    fn default() -> Self {
        Self::Cpu
    }
}

impl TryFrom<Device> for candle_core::Device {
    type Error = candle_core::Error;

    fn try_from(device: Device) -> Result<Self, Self::Error> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(n) => candle_core::Device::new_cuda(n),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
/// Activation function applied to the output of a network.
pub enum Activation {
    /// Identity.
    None,

    /// ReLU.
    ReLU,

    /// Tanh.
    Tanh,

    /// Logistic sigmoid, mapping the output into `(0, 1)`.
    Sigmoid,
}

impl Activation {
    /// Applies the activation function.
    pub fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        match self {
            Self::None => Ok(xs.clone()),
            Self::ReLU => xs.relu(),
            Self::Tanh => xs.tanh(),
            Self::Sigmoid => candle_nn::ops::sigmoid(xs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid() -> Result<()> {
        let xs = Tensor::from_slice(&[-100f32, 0.0, 2.0], (3,), &candle_core::Device::Cpu)?;
        let ys = Activation::Sigmoid.forward(&xs)?.to_vec1::<f32>()?;
        assert!(ys[0] >= 0.0 && ys[0] < 1e-6);
        assert!((ys[1] - 0.5).abs() < 1e-6);
        assert!((ys[2] - 0.880797).abs() < 1e-5);
        Ok(())
    }

    #[test]
    fn test_device() -> Result<()> {
        let device = candle_core::Device::try_from(Device::default())?;
        assert!(device.is_cpu());
        Ok(())
    }
}
