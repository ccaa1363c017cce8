//! Sampling actions from the output of the policy network.
use rand::Rng;

/// Draws an action from `K` output probabilities and a residual outcome.
///
/// The distribution has `K + 1` outcomes. Outcome `i < K` has weight
/// `probs[i]` and the last outcome has weight `1 - sum(probs)`. Negative or
/// non-finite probabilities count as zero.
///
/// If the probabilities sum to more than one, they are read as independent
/// Bernoulli outputs: the residual outcome gets the probability that all of
/// them are zero, `prod(1 - probs[i])`, and the `K + 1` weights are
/// renormalized. For `K = 1` both rules give `1 - probs[0]`.
///
/// Returns `(action, label)`. For outcome `i < K` the action is `i` and the
/// label has a `1.0` at `i`. For the residual outcome the action is `K` and
/// the label is all zeros.
pub fn sample_action(probs: &[f32], rng: &mut impl Rng) -> (usize, Vec<f32>) {
    let k = probs.len();
    let mut weights: Vec<f32> = probs
        .iter()
        .map(|&p| if p.is_finite() && p > 0.0 { p.min(1.0) } else { 0.0 })
        .collect();
    let sum: f32 = weights.iter().sum();
    let residual: f32 = if sum > 1.0 {
        weights.iter().map(|w| 1.0 - w).product()
    } else {
        1.0 - sum
    };
    weights.push(residual);
    let total: f32 = weights.iter().sum();

    let u = rng.gen::<f32>() * total;
    let mut acc = 0.0;
    for (i, w) in weights.iter().enumerate() {
        acc += w;
        if u < acc {
            return (i, label_for_action(i, k));
        }
    }

    // Rounding can leave u above the cumulative sum.
    let i = weights.iter().rposition(|&w| w > 0.0).unwrap_or(k);
    (i, label_for_action(i, k))
}

/// Returns the label of `action` for a network with `k` outputs.
///
/// Actions `0..k` give the indicator vector of the action, the residual
/// action `k` (or anything larger) gives zeros.
pub fn label_for_action(action: usize, k: usize) -> Vec<f32> {
    let mut label = vec![0.0; k];
    if let Some(v) = label.get_mut(action) {
        *v = 1.0;
    }
    label
}
