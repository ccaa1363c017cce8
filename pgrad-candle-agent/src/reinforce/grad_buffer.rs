//! Accumulation of gradients over a batch of episodes.
use crate::opt::Optimizer;
use anyhow::Result;
use candle_core::{backprop::GradStore, Tensor, Var};

/// Sums the gradients of a set of variables over several backward passes.
///
/// The summed gradients are applied with a single optimizer step in
/// [`GradBuffer::apply`], after which the buffer is zero again.
pub struct GradBuffer {
    vars: Vec<Var>,
    sums: Vec<Tensor>,

    /// Gradient store of the latest backward pass. The sums are written into
    /// it before being passed to the optimizer.
    store: Option<GradStore>,

    n_accumulated: usize,
}

impl GradBuffer {
    /// Creates a zeroed buffer for `vars`.
    pub fn new(vars: Vec<Var>) -> Result<Self> {
        let sums = zeros(&vars)?;
        Ok(Self {
            vars,
            sums,
            store: None,
            n_accumulated: 0,
        })
    }

    /// Adds the gradients of a backward pass.
    pub fn accumulate(&mut self, grads: GradStore) -> Result<()> {
        for (var, sum) in self.vars.iter().zip(self.sums.iter_mut()) {
            if let Some(g) = grads.get(var.as_tensor()) {
                *sum = sum.add(&g.detach())?;
            }
        }
        self.store = Some(grads);
        self.n_accumulated += 1;
        Ok(())
    }

    /// Number of backward passes accumulated since the last apply.
    pub fn n_accumulated(&self) -> usize {
        self.n_accumulated
    }

    /// Current sums, in the order of the variables given to [`GradBuffer::new`].
    pub fn sums(&self) -> &[Tensor] {
        &self.sums
    }

    /// Updates the variables with the summed gradients and zeroes the buffer.
    ///
    /// Does nothing if no gradient was accumulated.
    pub fn apply(&mut self, opt: &mut Optimizer) -> Result<()> {
        if let Some(mut store) = self.store.take() {
            for (var, sum) in self.vars.iter().zip(self.sums.iter()) {
                store.insert(var.as_tensor(), sum.clone());
            }
            opt.step(&store)?;
        }
        self.sums = zeros(&self.vars)?;
        self.n_accumulated = 0;
        Ok(())
    }
}

fn zeros(vars: &[Var]) -> Result<Vec<Tensor>> {
    Ok(vars
        .iter()
        .map(|v| v.as_tensor().zeros_like())
        .collect::<candle_core::Result<Vec<_>>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opt::OptimizerConfig;
    use candle_core::{DType, Device};

    fn scalar_sum(t: &Tensor) -> Result<f32> {
        Ok(t.sum_all()?.to_scalar::<f32>()?)
    }

    #[test]
    fn test_accumulate_and_apply() -> Result<()> {
        let x = Var::from_tensor(&Tensor::ones(3, DType::F32, &Device::Cpu)?)?;
        let mut buffer = GradBuffer::new(vec![x.clone()])?;
        let mut opt = OptimizerConfig::Adam { lr: 0.1 }.build(vec![x.clone()])?;

        // d/dx sum(2x) = 2 for each element
        for _ in 0..3 {
            let loss = x.as_tensor().affine(2.0, 0.0)?.sum_all()?;
            buffer.accumulate(loss.backward()?)?;
        }
        assert_eq!(buffer.n_accumulated(), 3);
        assert_eq!(buffer.sums()[0].to_vec1::<f32>()?, vec![6.0; 3]);

        buffer.apply(&mut opt)?;
        assert_eq!(buffer.n_accumulated(), 0);
        assert_eq!(scalar_sum(&buffer.sums()[0])?, 0.0);

        let v = x.as_tensor().to_vec1::<f32>()?;
        assert!(v.iter().all(|&v| v < 1.0));
        Ok(())
    }

    #[test]
    fn test_apply_empty() -> Result<()> {
        let x = Var::from_tensor(&Tensor::ones(2, DType::F32, &Device::Cpu)?)?;
        let mut buffer = GradBuffer::new(vec![x.clone()])?;
        let mut opt = OptimizerConfig::default().build(vec![x.clone()])?;

        buffer.apply(&mut opt)?;
        assert_eq!(x.as_tensor().to_vec1::<f32>()?, vec![1.0; 2]);
        Ok(())
    }
}
