#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Gamma values at or below this threshold pass.
pub const PASS_THRESHOLD: f64 = 1.0;

/// Summary of the defined cells of a gamma field.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GammaStatistics {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Share of defined cells with gamma <= 1.0, in percent.
    pub pass_rate_percent: f64,
    pub defined_count: usize,
    pub passing_count: usize,
}

/// Mergeable running moments, suitable for a rayon `fold`/`reduce`.
///
/// The variance is tracked with Welford's update and combined across
/// partial results with Chan's formula.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StatisticsAccumulator {
    count: usize,
    passing: usize,
    sum: f64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for StatisticsAccumulator {
    fn default() -> Self {
        Self {
            count: 0,
            passing: 0,
            sum: 0.0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl StatisticsAccumulator {
    pub(crate) fn push(mut self, value: f64) -> Self {
        self.count += 1;
        if value <= PASS_THRESHOLD {
            self.passing += 1;
        }
        self.sum += value;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self
    }

    pub(crate) fn merge(self, other: Self) -> Self {
        if self.count == 0 {
            return other;
        }
        if other.count == 0 {
            return self;
        }
        let count = self.count + other.count;
        let (na, nb, n) = (self.count as f64, other.count as f64, count as f64);
        let delta = other.mean - self.mean;
        Self {
            count,
            passing: self.passing + other.passing,
            sum: self.sum + other.sum,
            mean: self.mean + delta * nb / n,
            m2: self.m2 + other.m2 + delta * delta * na * nb / n,
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// `None` when no value was pushed.
    pub(crate) fn finish(self) -> Option<GammaStatistics> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        // The mean is sum / count. The clamp only takes effect when summation
        // rounding lands it an ulp or so outside [min, max].
        let mean = (self.sum / n).clamp(self.min, self.max);
        Some(GammaStatistics {
            mean,
            min: self.min,
            max: self.max,
            std_dev: (self.m2.max(0.0) / n).sqrt(),
            pass_rate_percent: 100.0 * self.passing as f64 / n,
            defined_count: self.count,
            passing_count: self.passing,
        })
    }
}

impl FromIterator<f64> for StatisticsAccumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), Self::push)
    }
}
