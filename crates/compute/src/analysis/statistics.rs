pub struct Statistics;

impl Statistics {
    pub fn sum(values: &[f64]) -> f64 {
        values.iter().sum()
    }

    /// Each value as a percentage of the total.
    ///
    /// Returns `None` when the total is zero or not finite, so callers pick an
    /// explicit fallback instead of propagating NaN or infinities.
    pub fn shares_percent(values: &[f64]) -> Option<Vec<f64>> {
        let total = Self::sum(values);
        if total == 0.0 || !total.is_finite() {
            return None;
        }
        Some(values.iter().map(|v| v / total * 100.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::Statistics;

    #[test]
    fn sum_works() {
        assert!((Statistics::sum(&[1.0, 2.0, 3.5]) - 6.5).abs() < 1e-9);
        assert_eq!(Statistics::sum(&[]), 0.0);
    }

    #[test]
    fn shares_reject_zero_total() {
        assert!(Statistics::shares_percent(&[0.0, 0.0]).is_none());
        assert!(Statistics::shares_percent(&[]).is_none());
        let shares = Statistics::shares_percent(&[1.0, 3.0]).unwrap();
        assert_eq!(shares, vec![25.0, 75.0]);
    }
}
