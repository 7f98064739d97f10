//! Velocity, acceleration, and dispersion of a sampled series.

use std::ops::Range;

use chrono::{DateTime, Utc};

use persona_core::models::Sample;

/// Summary statistics for one dimension's samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendAnalysis {
    pub sample_count: usize,
    /// Time between first and last sample, in forecast units.
    pub elapsed_units: f64,
    pub first: f64,
    pub last: f64,
    /// `(last - first) / elapsed`.
    pub velocity: f64,
    /// Change in velocity between the two halves, per unit time.
    pub acceleration: f64,
    pub mean: f64,
    /// Population standard deviation of the values.
    pub stddev: f64,
    /// Population variance of consecutive step changes.
    pub step_variance: f64,
    /// Mean of the second half minus mean of the first half.
    pub half_change: f64,
}

/// `None` for an empty series. Samples must be in timestamp order.
pub fn analyze(samples: &[Sample], unit_secs: u64) -> Option<TrendAnalysis> {
    let first = samples.first()?;
    let last = samples.last()?;
    let n = samples.len();
    let elapsed_units = units_between(first.timestamp, last.timestamp, unit_secs);

    let velocity = slope(samples, unit_secs);

    let (first_half, second_half) = halves(n);
    let acceleration = if n >= 3 && elapsed_units > 0.0 {
        let v1 = slope(&samples[first_half.clone()], unit_secs);
        let v2 = slope(&samples[second_half.clone()], unit_secs);
        (v2 - v1) / (elapsed_units / 2.0)
    } else {
        0.0
    };

    let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
    let mean = mean(&values);
    let stddev = variance(&values, mean).sqrt();

    let steps: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let step_variance = if steps.len() >= 2 {
        variance(&steps, self::mean(&steps))
    } else {
        0.0
    };

    let half_change = if n >= 2 {
        self::mean(&values[second_half]) - self::mean(&values[first_half])
    } else {
        0.0
    };

    Some(TrendAnalysis {
        sample_count: n,
        elapsed_units,
        first: first.value,
        last: last.value,
        velocity,
        acceleration,
        mean,
        stddev,
        step_variance,
        half_change,
    })
}

/// Split `0..n` into two halves. Odd counts share the middle sample so both
/// halves span the same time for evenly spaced series.
fn halves(n: usize) -> (Range<usize>, Range<usize>) {
    if n % 2 == 1 {
        let mid = n / 2;
        (0..mid + 1, mid..n)
    } else {
        (0..n / 2, n / 2..n)
    }
}

fn slope(samples: &[Sample], unit_secs: u64) -> f64 {
    match (samples.first(), samples.last()) {
        (Some(a), Some(b)) => {
            let dt = units_between(a.timestamp, b.timestamp, unit_secs);
            if dt > 0.0 {
                (b.value - a.value) / dt
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

fn units_between(a: DateTime<Utc>, b: DateTime<Utc>, unit_secs: u64) -> f64 {
    let millis = (b - a).num_milliseconds() as f64;
    millis / (unit_secs.max(1) as f64 * 1000.0)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn variance(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
    }
}
