use crate::dose_grid::DoseGrid;
use crate::enums::DistanceMetric;
use crate::params::GammaParameters;

/// Gamma value of a single planned cell against its measured neighborhood.
pub struct NeighborhoodGammaEvaluator;

impl NeighborhoodGammaEvaluator {
    /// Evaluate the cell at column `x`, row `y` with the default
    /// [`DistanceMetric`].
    ///
    /// Returns `None` when `(x, y)` lies outside the planned grid or the
    /// planned dose there is zero, in which case gamma is undefined.
    /// `params` is expected to be validated and both grids to share a shape.
    #[inline]
    pub fn evaluate(
        x: usize,
        y: usize,
        planned: &DoseGrid,
        measured: &DoseGrid,
        params: &GammaParameters,
    ) -> Option<f64> {
        Self::evaluate_with_metric(x, y, planned, measured, params, DistanceMetric::default())
    }

    pub fn evaluate_with_metric(
        x: usize,
        y: usize,
        planned: &DoseGrid,
        measured: &DoseGrid,
        params: &GammaParameters,
        metric: DistanceMetric,
    ) -> Option<f64> {
        let planned_dose = planned.value(x, y)?;
        if planned_dose == 0.0 {
            return None;
        }

        let (height, width) = measured.dim();
        let half = params.half_window();
        let dose_tolerance = params.dose_tolerance();
        let distance_tolerance_sq = params.distance_tolerance_sq();
        let spacing = planned.spacing();
        let samples = measured.data();

        // Clip the window to the grid instead of wrapping or extrapolating.
        let x_range = x.saturating_sub(half)..=(x + half).min(width.checked_sub(1)?);
        let y_range = y.saturating_sub(half)..=(y + half).min(height.checked_sub(1)?);

        let mut min_gamma: Option<f64> = None;
        for ny in y_range {
            let dy = (ny as f64 - y as f64) * spacing.height_mm;
            for nx in x_range.clone() {
                let dx = (nx as f64 - x as f64) * spacing.width_mm;

                let dose_diff = (samples[[ny, nx]] - planned_dose).abs() / planned_dose;
                let dist_sq = dx * dx + dy * dy;

                let dose_term = dose_diff / dose_tolerance;
                let distance_term = match metric {
                    DistanceMetric::SquaredRatio => dist_sq / distance_tolerance_sq,
                    DistanceMetric::Classical => (dist_sq / distance_tolerance_sq).sqrt(),
                };
                let gamma = dose_term.hypot(distance_term);

                if min_gamma.is_none_or(|min| gamma < min) {
                    min_gamma = Some(gamma);
                }
            }
        }

        // Empty only if `measured` is smaller than `planned`.
        min_gamma
    }
}
