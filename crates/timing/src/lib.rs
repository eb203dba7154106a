//! Random sources and pacing clocks injected into stations.

use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tf_core::Seconds;
use tracing::trace;

/// Fraction by which the real delay is shrunk relative to simulated seconds.
pub const DEFAULT_TIME_SCALE: f64 = 0.1;

/// Supplies uniform samples for dwell-time jitter and color picks.
pub trait RandomSource: Send {
    /// Next sample in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// An independent source, for handing to another worker.
    fn fork(&mut self) -> Box<dyn RandomSource>;
}

/// `StdRng`-backed source; reproducible when built from a seed.
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn fork(&mut self) -> Box<dyn RandomSource> {
        Box::new(Self::from_seed(self.rng.gen()))
    }
}

/// Always returns the same sample.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(f64);

impl FixedRandom {
    pub fn new(unit: f64) -> Self {
        Self(clamp_unit(unit))
    }
}

impl RandomSource for FixedRandom {
    fn next_unit(&mut self) -> f64 {
        self.0
    }

    fn fork(&mut self) -> Box<dyn RandomSource> {
        Box::new(*self)
    }
}

/// Replays a list of samples, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceRandom {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let mut values: Vec<f64> = values.into_iter().map(clamp_unit).collect();
        if values.is_empty() {
            values.push(0.5);
        }
        Self { values, cursor: 0 }
    }
}

impl RandomSource for SequenceRandom {
    fn next_unit(&mut self) -> f64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor = self.cursor.wrapping_add(1);
        value
    }

    fn fork(&mut self) -> Box<dyn RandomSource> {
        Box::new(self.clone())
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0 - f64::EPSILON)
}

/// Draws a dwell time uniformly from `[0.5 * average, 1.5 * average)`.
pub fn jittered_duration(average: Seconds, random: &mut dyn RandomSource) -> Seconds {
    if !average.is_finite() || average <= 0.0 {
        return 0.0;
    }
    let low = 0.5 * average;
    let high = 1.5 * average;
    let sample = low + (high - low) * random.next_unit();
    if sample >= high {
        // Rounding can land exactly on the open bound.
        f64::from_bits(high.to_bits() - 1)
    } else {
        sample
    }
}

/// Turns simulated seconds into a blocking delay.
pub trait Pacer: Send + Sync {
    fn pause(&self, simulated: Seconds);
}

/// Sleeps the calling thread for `simulated * scale` real seconds.
#[derive(Debug, Clone, Copy)]
pub struct ScaledSleep {
    scale: f64,
}

impl ScaledSleep {
    pub fn new(scale: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 0.0 };
        Self { scale }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Default for ScaledSleep {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_SCALE)
    }
}

impl Pacer for ScaledSleep {
    fn pause(&self, simulated: Seconds) {
        let real = simulated * self.scale;
        if real.is_finite() && real > 0.0 {
            trace!(simulated, real, "pacing");
            thread::sleep(Duration::from_secs_f64(real));
        }
    }
}

/// Returns immediately; used by tests and dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPause;

impl Pacer for NoPause {
    fn pause(&self, _simulated: Seconds) {}
}
