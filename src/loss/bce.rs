/// Binary cross-entropy, the objective both players of the GAN minimise.
pub struct BceLoss;

const EPS: f64 = 1e-12;

/// Predictions above this count as "real" when scoring accuracy.
pub const DECISION_THRESHOLD: f64 = 0.5;

impl BceLoss {
    /// Scalar BCE: -mean(y·log(p+ε) + (1-y)·log(1-p+ε))
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        let n = predicted.len() as f64;
        predicted.iter().zip(expected.iter())
            .map(|(p, y)| -(y * (p + EPS).ln() + (1.0 - y) * (1.0 - p + EPS).ln()))
            .sum::<f64>() / n
    }

    /// Per-output gradient of the summed (not averaged) loss:
    /// (p - y) / ((p + ε) · (1 - p + ε))
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(p, y)| (p - y) / ((p + EPS) * (1.0 - p + EPS)))
            .collect()
    }

    /// Fraction of predictions on the correct side of `DECISION_THRESHOLD`.
    pub fn accuracy(predicted: &[f64], expected: &[f64]) -> f64 {
        if predicted.is_empty() {
            return 0.0;
        }
        let correct = predicted.iter().zip(expected.iter())
            .filter(|(p, y)| (**p > DECISION_THRESHOLD) == (**y > DECISION_THRESHOLD))
            .count();
        correct as f64 / predicted.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn loss_is_mean_over_outputs() {
        let loss = BceLoss::loss(&[0.8, 0.4], &[1.0, 1.0]);
        assert_relative_eq!(loss, -(0.8f64.ln() + 0.4f64.ln()) / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let h = 1e-7;
        for &(p, y) in &[(0.3, 1.0), (0.7, 0.0), (0.5, 1.0)] {
            let numeric = (BceLoss::loss(&[p + h], &[y]) - BceLoss::loss(&[p - h], &[y])) / (2.0 * h);
            assert_relative_eq!(BceLoss::derivative(&[p], &[y])[0], numeric, epsilon = 1e-5);
        }
    }

    #[test]
    fn accuracy_thresholds_at_one_half() {
        assert_eq!(BceLoss::accuracy(&[0.9, 0.2, 0.5, 0.51], &[1.0, 1.0, 0.0, 0.0]), 0.5);
    }
}
