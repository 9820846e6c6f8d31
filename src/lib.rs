//! # Dose-gamma library
//!
//! This crate computes the gamma index between a planned and a measured
//! 2D radiotherapy dose distribution.

//!
//! For every planned cell with nonzero dose, the measured grid is searched
//! in a square window around the same position for the sample that agrees
//! best, combining the relative dose difference and the physical offset
//! into one dimensionless value. Values at or below 1.0 pass. The resulting
//! field is summarised by mean, min, max, population standard deviation and
//! pass rate. If the environment supports it the cells are evaluated in
//! parallel using rayon.
//!
//! The grids are assumed to be:
//!  - registered pixel for pixel (no alignment step)
//!  - of identical shape (no resampling)
//!  - sampled at discrete points (no interpolation between them)
//!
//! Cells with zero planned dose have no gamma value. They hold `0.0` in
//! [`GammaField::values`] and are excluded from the statistics; the
//! [`GammaField::defined`] mask tells them apart from perfect matches.
//!
//! The default [`DistanceMetric::SquaredRatio`] reproduces the reference
//! ImageJ plugin, whose distance term is `(distance / criterion)^4` rather
//! than the `^2` of the published gamma index. Select
//! [`DistanceMetric::Classical`] for the latter.
//!
//! # Examples
//!
//! ## Comparing two RT Dose planes
//!
//! ```no_run
//! # use dose_gamma::{DoseLoader, GammaFieldAggregator, GammaParameters};
//! let planned = DoseLoader::load_from_file("planned.dcm").expect("should load plan");
//! let measured = DoseLoader::load_from_file("measured.dcm").expect("should load measurement");
//! let analysis = GammaFieldAggregator::default()
//!     .run(&planned, &measured, &GammaParameters::default())
//!     .expect("parameters and shapes should be valid");
//! if let Ok(stats) = analysis.statistics() {
//!     println!("pass rate: {:.1}%", stats.pass_rate_percent);
//! }
//! if let Some(image) = analysis.field.to_image() {
//!     image.save("gamma.png").expect("should write gamma map");
//! }
//! ```

pub mod aggregator;
pub mod dose_grid;
pub mod dose_loader;
pub mod enums;
pub mod error;
pub mod evaluator;
pub mod field;
pub mod params;
pub mod statistics;

pub use aggregator::{GammaAnalysis, GammaFieldAggregator};
pub use dose_grid::{DoseGrid, PixelSpacing};
pub use dose_loader::{DoseLoader, DoseLoaderError};
pub use enums::{DistanceMetric, Processor};
pub use error::GammaError;
pub use evaluator::NeighborhoodGammaEvaluator;
pub use field::GammaField;
pub use params::GammaParameters;
pub use statistics::{GammaStatistics, PASS_THRESHOLD};
