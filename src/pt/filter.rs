use super::*;

/// Tabulation resolution for [`GaussianFilter::eval_tabulated`] (§4.8).
const TABLE_RESOLUTION: usize = 32;

/// Gaussian pixel reconstruction filter (§4.8), grounded in Nori's
/// `GaussianFilter` (radius 2, stddev 0.5).
#[derive(Clone, Debug)]
pub struct GaussianFilter {
    radius: f32,
    stddev: f32,
    alpha: f32,
    offset: f32,
    table: [f32; TABLE_RESOLUTION],
}

impl GaussianFilter {
    pub fn new(radius: f32, stddev: f32) -> Self {
        let alpha = -1.0 / (2.0 * stddev * stddev);
        let offset = (alpha * radius * radius).exp();
        let mut filter = Self {
            radius,
            stddev,
            alpha,
            offset,
            table: [0.0; TABLE_RESOLUTION],
        };
        for (i, slot) in filter.table.iter_mut().enumerate() {
            let x = (i as f32 + 0.5) / TABLE_RESOLUTION as f32 * radius;
            *slot = filter.eval(x);
        }
        filter
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Exact Gaussian-minus-tail evaluation at distance `x` from the pixel center.
    pub fn eval(&self, x: f32) -> f32 {
        f32::max(0.0, (self.alpha * x * x).exp() - self.offset)
    }

    /// Tabulated evaluation: matches [`Self::eval`] within sampling error of the
    /// `TABLE_RESOLUTION`-bucket table, used on the hot path of splatting.
    pub fn eval_tabulated(&self, x: f32) -> f32 {
        let index = ((x.abs() / self.radius) * TABLE_RESOLUTION as f32) as usize;
        self.table.get(index.min(TABLE_RESOLUTION - 1)).copied().unwrap_or(0.0)
    }
}

impl Default for GaussianFilter {
    fn default() -> Self {
        Self::new(2.0, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_eval_peaks_at_center() {
        let f = GaussianFilter::default();
        assert!(f.eval(0.0) > f.eval(1.0));
        assert!(f.eval(1.0) > f.eval(1.9));
    }

    #[test]
    fn test_eval_is_zero_at_and_beyond_radius() {
        let f = GaussianFilter::default();
        assert_abs_diff_eq!(f.eval(2.0), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(f.eval(3.0), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_tabulated_matches_exact_within_bucket_width() {
        let f = GaussianFilter::default();
        for i in 0..20 {
            let x = i as f32 * 0.1;
            assert!((f.eval_tabulated(x) - f.eval(x)).abs() < 0.05);
        }
    }
}
