//! Core types for the toy factory: items, stages and their errors.

pub type Seconds = f64;
pub type Serial = u32;

/// Highest serial that still renders as three digits in an item id.
pub const MAX_SERIAL: Serial = 999;

#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("serial {0} is outside 1..=999")]
    InvalidSerial(Serial),
    #[error("color {0:?} must be non-empty and alphabetic")]
    InvalidColor(String),
    #[error("invalid item record: {0}")]
    InvalidRecord(String),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub mod item;
pub mod stage;

pub use item::{Item, ItemStatus};
pub use stage::Stage;
