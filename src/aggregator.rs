use crate::dose_grid::DoseGrid;
use crate::enums::{DistanceMetric, Processor};
use crate::error::GammaError;
use crate::evaluator::NeighborhoodGammaEvaluator;
use crate::field::GammaField;
use crate::params::GammaParameters;
use crate::statistics::{GammaStatistics, StatisticsAccumulator};

use ndarray::{Array2, Zip};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use web_time::Instant;

/// Result of a completed run: the full field and, if any cell was defined,
/// its statistics.
#[derive(Clone, Debug)]
pub struct GammaAnalysis {
    pub field: GammaField,
    statistics: Option<GammaStatistics>,
}

impl GammaAnalysis {
    /// # Errors
    ///
    /// [`GammaError::NoDefinedSamples`] if every planned dose was zero. The
    /// field is still available in that case.
    pub fn statistics(&self) -> Result<&GammaStatistics, GammaError> {
        self.statistics.as_ref().ok_or(GammaError::NoDefinedSamples)
    }

    pub fn into_parts(self) -> (GammaField, Option<GammaStatistics>) {
        (self.field, self.statistics)
    }
}

/// Drives [`NeighborhoodGammaEvaluator`] over a whole grid.
#[derive(Clone, Copy, Debug, Default)]
pub struct GammaFieldAggregator {
    pub processor: Processor,
    pub metric: DistanceMetric,
}

impl GammaFieldAggregator {
    pub fn new(processor: Processor, metric: DistanceMetric) -> Self {
        Self { processor, metric }
    }

    /// Evaluate every cell of `planned` against `measured`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, before touching any cell, if the
    /// parameters are invalid or the grids differ in shape.
    pub fn run(
        &self,
        planned: &DoseGrid,
        measured: &DoseGrid,
        params: &GammaParameters,
    ) -> Result<GammaAnalysis, GammaError> {
        self.run_cancellable(planned, measured, params, &AtomicBool::new(false))
    }

    /// Like [`run`](Self::run), but stops early with
    /// [`GammaError::Cancelled`] once `cancel` is set.
    pub fn run_cancellable(
        &self,
        planned: &DoseGrid,
        measured: &DoseGrid,
        params: &GammaParameters,
        cancel: &AtomicBool,
    ) -> Result<GammaAnalysis, GammaError> {
        params.validate()?;
        planned.ensure_same_shape(measured)?;

        let (height, width) = planned.dim();
        log::debug!(
            "gamma {}%/{}mm, {n}x{n} window over {width}x{height} cells ({:?}, {:?})",
            params.dose_criterion_percent,
            params.distance_criterion_mm,
            self.processor,
            self.metric,
            n = params.neighborhood_size,
        );
        let started = Instant::now();

        let cells = self.evaluate_cells(planned, measured, params, cancel);
        if cancel.load(Ordering::Relaxed) {
            return Err(GammaError::Cancelled);
        }

        let statistics = match self.processor {
            Processor::Sequential => cells
                .iter()
                .filter_map(|cell| *cell)
                .collect::<StatisticsAccumulator>(),
            Processor::Parallel => cells
                .par_iter()
                .filter_map(|cell| *cell)
                .fold(StatisticsAccumulator::default, StatisticsAccumulator::push)
                .reduce(StatisticsAccumulator::default, StatisticsAccumulator::merge),
        }
        .finish();

        match &statistics {
            Some(stats) => log::info!(
                "gamma done in {:?}: {} defined cells, pass rate {:.2}%",
                started.elapsed(),
                stats.defined_count,
                stats.pass_rate_percent
            ),
            None => log::warn!("gamma done: no cell with nonzero planned dose"),
        }

        Ok(GammaAnalysis {
            field: GammaField::from_cells(&cells),
            statistics,
        })
    }

    fn evaluate_cells(
        &self,
        planned: &DoseGrid,
        measured: &DoseGrid,
        params: &GammaParameters,
        cancel: &AtomicBool,
    ) -> Array2<Option<f64>> {
        let metric = self.metric;
        let cell = |(y, x): (usize, usize), &dose: &f64| {
            if dose == 0.0 || cancel.load(Ordering::Relaxed) {
                return None;
            }
            NeighborhoodGammaEvaluator::evaluate_with_metric(x, y, planned, measured, params, metric)
        };

        let zip = Zip::indexed(planned.data());
        match self.processor {
            Processor::Sequential => zip.map_collect(cell),
            Processor::Parallel => zip.par_map_collect(cell),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GammaFieldAggregator;
    use crate::dose_grid::{DoseGrid, PixelSpacing};
    use crate::enums::{DistanceMetric, Processor};
    use crate::error::GammaError;
    use crate::params::GammaParameters;
    use ndarray::{Array2, array};
    use std::sync::atomic::AtomicBool;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    fn grid(data: Array2<f64>) -> DoseGrid {
        DoseGrid::new(data, PixelSpacing::new(1.0, 1.0).unwrap()).unwrap()
    }

    #[test]
    fn test_configuration_errors() {
        let a = grid(Array2::from_elem((2, 2), 1.0));
        let b = grid(Array2::from_elem((2, 3), 1.0));
        let agg = GammaFieldAggregator::default();

        let even = GammaParameters {
            neighborhood_size: 2,
            ..Default::default()
        };
        assert_eq!(
            agg.run(&a, &a, &even).unwrap_err(),
            GammaError::EvenNeighborhood(2)
        );
        assert!(matches!(
            agg.run(&a, &b, &GammaParameters::default()).unwrap_err(),
            GammaError::ShapeMismatch { .. }
        ));
    }

    #[test]
    fn test_zero_planned_dose_is_undefined() {
        let planned = grid(array![[0.0, 10.0], [10.0, 0.0]]);
        let measured = grid(array![[5.0, 10.5], [10.0, 5.0]]);
        let analysis = GammaFieldAggregator::default()
            .run(&planned, &measured, &GammaParameters::default())
            .unwrap();

        assert_eq!(analysis.field.values()[[0, 0]], 0.0);
        assert_eq!(analysis.field.get(0, 0), None);
        assert_eq!(analysis.field.get(1, 1), None);
        assert_eq!(analysis.field.get(0, 1), Some(0.0));
        assert_eq!(analysis.statistics().unwrap().defined_count, 2);
    }

    #[test]
    fn test_subnormal_planned_dose_is_counted() {
        let planned = grid(array![[5e-324]]);
        let measured = grid(array![[100.0]]);
        let params = GammaParameters::new(3.0, 3.0, 1).unwrap();
        let analysis = GammaFieldAggregator::default()
            .run(&planned, &measured, &params)
            .unwrap();

        assert_eq!(analysis.field.get(0, 0), Some(f64::INFINITY));
        let stats = analysis.statistics().unwrap();
        assert_eq!(stats.defined_count, 1);
        assert_eq!(stats.passing_count, 0);
        assert_eq!(stats.pass_rate_percent, 0.0);
    }

    #[test]
    fn test_all_zero_plan() {
        let planned = grid(Array2::zeros((3, 4)));
        let measured = grid(Array2::from_elem((3, 4), 1.0));
        let analysis = GammaFieldAggregator::default()
            .run(&planned, &measured, &GammaParameters::default())
            .unwrap();
        assert_eq!(analysis.statistics(), Err(GammaError::NoDefinedSamples));
        assert_eq!(analysis.field.dim(), (3, 4));
        assert!(analysis.field.values().iter().all(|&v| v == 0.0));
        assert_eq!(analysis.field.defined_count(), 0);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let planned = Array2::from_shape_fn((17, 23), |(y, x)| ((x * 7 + y * 3) % 11) as f64);
        let measured = Array2::from_shape_fn((17, 23), |(y, x)| ((x * 5 + y * 2) % 13) as f64);
        let planned = grid(planned);
        let measured = grid(measured);
        let params = GammaParameters::new(3.0, 2.0, 5).unwrap();

        for metric in [DistanceMetric::SquaredRatio, DistanceMetric::Classical] {
            let seq = GammaFieldAggregator::new(Processor::Sequential, metric)
                .run(&planned, &measured, &params)
                .unwrap();
            let par = GammaFieldAggregator::new(Processor::Parallel, metric)
                .run(&planned, &measured, &params)
                .unwrap();

            assert_eq!(seq.field, par.field);
            let (s, p) = (seq.statistics().unwrap(), par.statistics().unwrap());
            assert!(f64_eq(s.mean, p.mean));
            assert!(f64_eq(s.std_dev, p.std_dev));
            assert_eq!(s.min, p.min);
            assert_eq!(s.max, p.max);
            assert_eq!(s.passing_count, p.passing_count);
        }
    }

    #[test]
    fn test_cancelled_run() {
        let planned = grid(Array2::from_elem((8, 8), 1.0));
        let cancel = AtomicBool::new(true);
        let err = GammaFieldAggregator::default()
            .run_cancellable(&planned, &planned, &GammaParameters::default(), &cancel)
            .unwrap_err();
        assert_eq!(err, GammaError::Cancelled);
    }
}
