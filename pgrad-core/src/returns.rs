//! Discounted returns.
//!
//! Actions near the end of a failed episode get a small or negative weight
//! after normalization, early actions a larger one.

/// Standard deviations below this value are treated as zero.
pub const STD_EPS: f32 = 1e-8;

/// Computes discounted returns of a reward sequence.
///
/// `R[t] = r[t] + gamma * R[t + 1]`, scanning from the end of the episode.
pub fn discount_rewards(rewards: &[f32], gamma: f32) -> Vec<f32> {
    let mut discounted = vec![0f32; rewards.len()];
    let mut running_add = 0f32;

    for t in (0..rewards.len()).rev() {
        running_add = running_add * gamma + rewards[t];
        discounted[t] = running_add;
    }

    discounted
}

/// Mean and population standard deviation.
pub fn mean_std(xs: &[f32]) -> (f32, f32) {
    if xs.is_empty() {
        return (0.0, 0.0);
    }
    let n = xs.len() as f32;
    let mean = xs.iter().sum::<f32>() / n;
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f32>() / n;
    (mean, var.sqrt())
}

/// Normalizes values to zero mean and unit variance in place.
///
/// A single value is left untouched. If the standard deviation of two or
/// more values is (numerically) zero, they are only centered.
pub fn normalize(xs: &mut [f32]) {
    if xs.len() < 2 {
        return;
    }
    let (mean, std) = mean_std(xs);
    let scale = if std < STD_EPS { 1.0 } else { std };
    xs.iter_mut().for_each(|x| *x = (*x - mean) / scale);
}

/// Discounted returns normalized with [`normalize`].
pub fn normalized_returns(rewards: &[f32], gamma: f32) -> Vec<f32> {
    let mut returns = discount_rewards(rewards, gamma);
    normalize(&mut returns);
    returns
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAMMA: f32 = 0.99;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "{} != {}", a, b);
    }

    #[test]
    fn test_discount_rewards_ones() {
        let r = discount_rewards(&[1.0, 1.0, 1.0], GAMMA);
        assert_close(r[0], 2.9701);
        assert_close(r[1], 1.99);
        assert_close(r[2], 1.0);
    }

    #[test]
    fn test_discount_rewards_recurrence() {
        let rewards = [0.5f32, -1.0, 2.0, 0.0, 3.0, 1.0, -0.25];
        let r = discount_rewards(&rewards, GAMMA);
        let n = rewards.len();

        assert_eq!(r.len(), n);
        assert_eq!(r[n - 1], rewards[n - 1]);
        for t in 0..n - 1 {
            assert_close(r[t], rewards[t] + GAMMA * r[t + 1]);
        }
    }

    #[test]
    fn test_discount_rewards_empty() {
        assert!(discount_rewards(&[], GAMMA).is_empty());
        assert!(normalized_returns(&[], GAMMA).is_empty());
    }

    #[test]
    fn test_normalized_returns() {
        let r = normalized_returns(&[1.0; 20], GAMMA);
        let (mean, std) = mean_std(&r);
        assert_close(mean, 0.0);
        assert_close(std, 1.0);
    }

    #[test]
    fn test_normalize_single_step() {
        let r = normalized_returns(&[1.0], GAMMA);
        assert_eq!(r, vec![1.0]);
        assert!(r[0].is_finite());

        let r = normalized_returns(&[0.0], GAMMA);
        assert_eq!(r, vec![0.0]);
    }

    #[test]
    fn test_normalize_equal_returns() {
        // 0.01 + 0.99 * 1.0 == 1.0
        let r = normalized_returns(&[0.01, 1.0], GAMMA);
        let (mean, std) = mean_std(&r);
        assert_close(mean, 0.0);
        assert_close(std, 0.0);
        assert!(r.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_normalize_constant() {
        let mut xs = vec![0.0f32; 4];
        normalize(&mut xs);
        assert!(xs.iter().all(|x| *x == 0.0));

        let mut xs = vec![2.5f32; 3];
        normalize(&mut xs);
        assert!(xs.iter().all(|x| x.abs() < 1e-6));
    }
}
