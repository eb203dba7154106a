//! Station queues and the factory that routes items through them.

use serde::{Deserialize, Serialize};
use tf_timing::DEFAULT_TIME_SCALE;

pub mod factory;
pub mod generator;
pub mod station;

pub use factory::Factory;
pub use generator::ItemGenerator;
pub use station::Station;

/// Run-level knobs. Station names and baselines are fixed by `Stage`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactoryConfig {
    /// Seed for dwell-time jitter; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Real seconds slept per simulated second.
    pub time_scale: f64,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self { seed: None, time_scale: DEFAULT_TIME_SCALE }
    }
}
