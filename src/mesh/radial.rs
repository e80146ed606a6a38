/// Source of the radial shell-spacing ratio δ.
///
/// δ is the dimensionless scale factor for one radial shell step: a zone one
/// shell inward of the principal face has its centroid rescaled by `1 + δ`
/// and one shell outward by `1 / (1 + δ)` when the least-squares geometry
/// matrix is assembled. How δ is derived from the block's reference radial
/// bounds is up to the implementation; the block queries it once per mesh
/// association and caches the value.
pub trait RadialMap: Send + Sync {
    fn shell_ratio(&self, xi_min: f64, xi_max: f64, shells: usize) -> f64;
}

/// A precomputed ratio, for callers that derived δ elsewhere.
#[derive(Clone, Copy, Debug)]
pub struct FixedShellRatio(pub f64);

impl RadialMap for FixedShellRatio {
    fn shell_ratio(&self, _xi_min: f64, _xi_max: f64, _shells: usize) -> f64 {
        self.0
    }
}

/// Geometrically spaced shells between the block's radial bounds. The
/// radius ratio of successive shells is constant, so δ is exact rather
/// than an average.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogRadialMap;

impl RadialMap for LogRadialMap {
    fn shell_ratio(&self, xi_min: f64, xi_max: f64, shells: usize) -> f64 {
        (xi_max / xi_min).powf(1.0 / shells as f64) - 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_map_ratio_is_exact_per_shell() {
        let delta = LogRadialMap.shell_ratio(1.0, 16.0, 4);
        assert!((delta - 1.0).abs() < 1e-12);

        // n shell steps of (1 + δ) must span the full radial extent.
        let delta = LogRadialMap.shell_ratio(2.0, 7.0, 5);
        assert!((2.0 * (1.0 + delta).powi(5) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn fixed_ratio_ignores_bounds() {
        assert_eq!(FixedShellRatio(0.25).shell_ratio(1.0, 9.0, 3), 0.25);
    }
}
