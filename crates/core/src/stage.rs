use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Seconds;

/// One step of the fixed factory pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Assembly,
    Painting,
    QualityControl,
    Packaging,
}

impl Stage {
    /// Pipeline order. Routing always walks this array, never a map.
    pub const PIPELINE: [Stage; 4] = [
        Stage::Assembly,
        Stage::Painting,
        Stage::QualityControl,
        Stage::Packaging,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Assembly => "assembly",
            Stage::Painting => "painting",
            Stage::QualityControl => "quality-control",
            Stage::Packaging => "packaging",
        }
    }

    /// Baseline dwell time in simulated seconds.
    pub fn average_duration(&self) -> Seconds {
        match self {
            Stage::Assembly => 5.0,
            Stage::Painting => 3.0,
            Stage::QualityControl => 2.0,
            Stage::Packaging => 1.5,
        }
    }

    pub fn position(&self) -> usize {
        match self {
            Stage::Assembly => 0,
            Stage::Painting => 1,
            Stage::QualityControl => 2,
            Stage::Packaging => 3,
        }
    }

    pub fn next(&self) -> Option<Stage> {
        Self::PIPELINE.get(self.position() + 1).copied()
    }

    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }

    pub fn first() -> Stage {
        Self::PIPELINE[0]
    }

    pub fn from_name(name: &str) -> Option<Stage> {
        Self::PIPELINE.into_iter().find(|stage| stage.name() == name)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
