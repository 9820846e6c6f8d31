use crate::error::GammaError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Acceptance criteria and search window of a gamma evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GammaParameters {
    /// Allowed dose difference in percent of the planned dose, e.g. `3.0`.
    pub dose_criterion_percent: f64,
    /// Distance to agreement in millimeters.
    pub distance_criterion_mm: f64,
    /// Side length of the square search window, in cells. Must be odd.
    pub neighborhood_size: usize,
}

impl Default for GammaParameters {
    /// 3 % / 3 mm with a 3x3 window.
    fn default() -> Self {
        Self {
            dose_criterion_percent: 3.0,
            distance_criterion_mm: 3.0,
            neighborhood_size: 3,
        }
    }
}

impl GammaParameters {
    pub fn new(
        dose_criterion_percent: f64,
        distance_criterion_mm: f64,
        neighborhood_size: usize,
    ) -> Result<Self, GammaError> {
        let params = Self {
            dose_criterion_percent,
            distance_criterion_mm,
            neighborhood_size,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check the parameters once, before any grid work.
    pub fn validate(&self) -> Result<(), GammaError> {
        if self.neighborhood_size == 0 {
            return Err(GammaError::EmptyNeighborhood);
        }
        if self.neighborhood_size % 2 == 0 {
            return Err(GammaError::EvenNeighborhood(self.neighborhood_size));
        }
        if !(self.dose_criterion_percent.is_finite() && self.dose_criterion_percent > 0.0) {
            return Err(GammaError::InvalidDoseCriterion(
                self.dose_criterion_percent,
            ));
        }
        if !(self.distance_criterion_mm.is_finite() && self.distance_criterion_mm > 0.0) {
            return Err(GammaError::InvalidDistanceCriterion(
                self.distance_criterion_mm,
            ));
        }
        Ok(())
    }

    #[inline]
    pub fn half_window(&self) -> usize {
        (self.neighborhood_size - 1) / 2
    }

    /// Dose criterion as a fraction.
    #[inline]
    pub fn dose_tolerance(&self) -> f64 {
        self.dose_criterion_percent / 100.0
    }

    #[inline]
    pub fn distance_tolerance_sq(&self) -> f64 {
        self.distance_criterion_mm * self.distance_criterion_mm
    }
}
