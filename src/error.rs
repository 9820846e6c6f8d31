use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GammaError {
    #[error("Neighborhood size must be odd, got {0}")]
    EvenNeighborhood(usize),

    #[error("Neighborhood size must be at least 1")]
    EmptyNeighborhood,

    #[error("Dose criterion must be a positive percentage, got {0}")]
    InvalidDoseCriterion(f64),

    #[error("Distance criterion must be a positive length in mm, got {0}")]
    InvalidDistanceCriterion(f64),

    #[error("Pixel spacing must be positive, got {width} x {height} mm")]
    InvalidSpacing { width: f64, height: f64 },

    #[error("Dose samples must be finite and non-negative")]
    InvalidDose,

    #[error("Grid shapes differ: planned {planned:?}, measured {measured:?}")]
    ShapeMismatch {
        planned: (usize, usize),
        measured: (usize, usize),
    },

    #[error("No defined samples: every planned dose is zero")]
    NoDefinedSamples,

    #[error("Gamma evaluation was cancelled")]
    Cancelled,
}
