use crate::error::GammaError;

use ndarray::Array2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Physical size of one grid cell in millimeters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PixelSpacing {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PixelSpacing {
    pub fn new(width_mm: f64, height_mm: f64) -> Result<Self, GammaError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width_mm) || !valid(height_mm) {
            return Err(GammaError::InvalidSpacing {
                width: width_mm,
                height: height_mm,
            });
        }
        Ok(Self {
            width_mm,
            height_mm,
        })
    }
}

/// A read-only 2D dose distribution together with its pixel spacing.
///
/// Samples are stored as `(height, width)`, so `data[[y, x]]` is the dose
/// at column `x` of row `y`.
#[derive(Clone, Debug)]
pub struct DoseGrid {
    data: Array2<f64>,
    spacing: PixelSpacing,
}

impl DoseGrid {
    /// Build a grid from dose samples and spacing.
    ///
    /// # Errors
    ///
    /// Returns [`GammaError::InvalidDose`] if any sample is negative or not
    /// finite, and [`GammaError::InvalidSpacing`] for a non-positive spacing.
    pub fn new(data: Array2<f64>, spacing: PixelSpacing) -> Result<Self, GammaError> {
        let spacing = PixelSpacing::new(spacing.width_mm, spacing.height_mm)?;
        if data.iter().any(|&v| !v.is_finite() || v < 0.0) {
            return Err(GammaError::InvalidDose);
        }
        Ok(Self { data, spacing })
    }

    /// Get the dimensions of the grid (height, width)
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Get a reference to the underlying samples
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn spacing(&self) -> PixelSpacing {
        self.spacing
    }

    /// Dose at column `x`, row `y`, or `None` outside the grid.
    #[inline]
    pub fn value(&self, x: usize, y: usize) -> Option<f64> {
        self.data.get([y, x]).copied()
    }

    pub(crate) fn ensure_same_shape(&self, other: &DoseGrid) -> Result<(), GammaError> {
        if self.dim() != other.dim() {
            return Err(GammaError::ShapeMismatch {
                planned: self.dim(),
                measured: other.dim(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DoseGrid, PixelSpacing};
    use crate::error::GammaError;
    use ndarray::{Array2, array};

    #[test]
    fn test_spacing_must_be_positive() {
        assert!(PixelSpacing::new(1.0, 0.5).is_ok());
        assert_eq!(
            PixelSpacing::new(0.0, 1.0).unwrap_err(),
            GammaError::InvalidSpacing {
                width: 0.0,
                height: 1.0
            }
        );
        assert!(PixelSpacing::new(1.0, -2.0).is_err());
        assert!(PixelSpacing::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_grid_rejects_bad_samples() {
        let spacing = PixelSpacing::new(1.0, 1.0).unwrap();
        let err = DoseGrid::new(array![[1.0, -0.5]], spacing).unwrap_err();
        assert_eq!(err, GammaError::InvalidDose);
        let err = DoseGrid::new(array![[f64::INFINITY]], spacing).unwrap_err();
        assert_eq!(err, GammaError::InvalidDose);
    }

    #[test]
    fn test_grid_rejects_unchecked_spacing() {
        let spacing = PixelSpacing {
            width_mm: 1.0,
            height_mm: 0.0,
        };
        assert!(DoseGrid::new(array![[1.0]], spacing).is_err());
    }

    #[test]
    fn test_grid_indexing() {
        let spacing = PixelSpacing::new(2.0, 3.0).unwrap();
        // 2 rows, 3 columns
        let grid = DoseGrid::new(array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], spacing).unwrap();
        assert_eq!(grid.dim(), (2, 3));
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.value(2, 0), Some(3.0));
        assert_eq!(grid.value(0, 1), Some(4.0));
        assert_eq!(grid.value(3, 0), None);
        assert_eq!(grid.value(0, 2), None);
    }

    #[test]
    fn test_shape_mismatch() {
        let spacing = PixelSpacing::new(1.0, 1.0).unwrap();
        let a = DoseGrid::new(Array2::zeros((2, 3)), spacing).unwrap();
        let b = DoseGrid::new(Array2::zeros((3, 2)), spacing).unwrap();
        assert!(a.ensure_same_shape(&a).is_ok());
        assert_eq!(
            a.ensure_same_shape(&b).unwrap_err(),
            GammaError::ShapeMismatch {
                planned: (2, 3),
                measured: (3, 2)
            }
        );
    }
}
