#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the per-cell evaluations are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Processor {
    Sequential,
    #[default]
    Parallel,
}

/// Shape of the distance-to-agreement term in the combined gamma value.
///
/// `SquaredRatio` divides the squared offset distance by the squared
/// distance criterion and squares the ratio again, so the spatial term
/// grows with `(distance / criterion)^4`. This is the behaviour of the
/// ImageJ plugin the numbers are compared against, and it is most likely a
/// defect there: the published gamma index uses `Classical`, where the
/// spatial term is `(distance / criterion)^2` like the dose term.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DistanceMetric {
    #[default]
    SquaredRatio,
    Classical,
}
