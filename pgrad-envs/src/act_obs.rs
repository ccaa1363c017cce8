use pgrad_core::{Act, Obs};

/// Observation as a vector of `f32`.
#[derive(Clone, Debug, PartialEq)]
pub struct VecObs(pub Vec<f32>);

impl Obs for VecObs {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl AsRef<[f32]> for VecObs {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}

impl From<Vec<f32>> for VecObs {
    fn from(v: Vec<f32>) -> Self {
        Self(v)
    }
}

/// Index of a discrete action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiscreteAct(pub usize);

impl Act for DiscreteAct {}

impl From<usize> for DiscreteAct {
    fn from(a: usize) -> Self {
        Self(a)
    }
}

impl From<DiscreteAct> for usize {
    fn from(a: DiscreteAct) -> Self {
        a.0
    }
}
