//! Utilities.
use anyhow::{anyhow, Result};
use candle_core::{Tensor, Var};
use candle_nn::VarMap;
use pgrad_core::record::{Record, RecordValue};
use rand::{Rng, RngCore};

fn sorted_vars(varmap: &VarMap) -> Result<Vec<(String, Var)>> {
    let data = varmap
        .data()
        .lock()
        .map_err(|_| anyhow!("VarMap lock is poisoned"))?;
    let mut vars: Vec<_> = data.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    vars.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(vars)
}

/// Initializes the parameters in `varmap` for a seeded run.
///
/// Each `(fan_out, fan_in)` weight matrix is drawn from Xavier/Glorot
/// uniform `U(-a, a)` with `a = sqrt(6 / (fan_in + fan_out))`. Bias vectors
/// are set to zero. Variables are visited in name order, so a seeded `rng`
/// gives reproducible parameters.
pub fn xavier_uniform(varmap: &VarMap, rng: &mut impl RngCore) -> Result<()> {
    for (name, var) in sorted_vars(varmap)? {
        let t = match var.as_tensor().dims() {
            &[_] => var.as_tensor().zeros_like()?,
            &[fan_out, fan_in] => {
                let a = (6.0 / (fan_in + fan_out) as f32).sqrt();
                let w: Vec<f32> = (0..fan_out * fan_in)
                    .map(|_| rng.gen_range(-a..a))
                    .collect();
                Tensor::from_vec(w, (fan_out, fan_in), var.device())?
            }
            dims => return Err(anyhow!("{} has unsupported shape {:?}", name, dims)),
        };
        var.set(&t)?;
    }
    Ok(())
}

/// Returns the standard deviation of a tensor.
pub fn std(t: &Tensor) -> Result<f32> {
    Ok(t
        .broadcast_sub(&t.mean_all()?)?
        .sqr()?
        .mean_all()?
        .sqrt()?
        .to_vec0::<f32>()?)
}

/// Returns the mean and standard deviation of the parameters.
pub fn param_stats(varmap: &VarMap) -> Result<Record> {
    let mut record = Record::empty();

    for (k, v) in sorted_vars(varmap)? {
        let m: f32 = v.mean_all()?.to_vec0()?;
        record.insert(format!("{}_mean", &k), RecordValue::Scalar(m));
        record.insert(format!("{}_std", &k), RecordValue::Scalar(std(v.as_tensor())?));
    }

    Ok(record)
}
