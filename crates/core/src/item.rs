use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{CoreError, Seconds, Serial, MAX_SERIAL};

// Anchored at the start only: `TOY-001-RED1` still counts as well formed.
static ITEM_ID_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^TOY-\d{3}-[A-Z]+").expect("item id pattern is valid")
});

static ITEM_SERIAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"TOY-(\d{3})-[A-Z]+").expect("item serial pattern is valid")
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ItemStatus {
    InProgress,
    Done,
    /// Reserved for quality-control failures; nothing in the pipeline sets it yet.
    Rejected,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::InProgress => "in-progress",
            ItemStatus::Done => "done",
            ItemStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A toy travelling through the factory.
///
/// The id is fixed at construction. Processing time and the stage history only
/// ever grow, and are changed exclusively by the station that currently holds
/// the item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "ItemRecord")]
pub struct Item {
    id: String,
    status: ItemStatus,
    total_time: Seconds,
    completed_stages: Vec<String>,
}

impl Item {
    /// Builds an item whose id is `TOY-<serial:03>-<COLOR>`.
    pub fn new(serial: Serial, color: &str) -> Self {
        Self {
            id: format!("TOY-{:03}-{}", serial, color.to_uppercase()),
            status: ItemStatus::InProgress,
            total_time: 0.0,
            completed_stages: Vec::new(),
        }
    }

    /// Like [`Item::new`], but refuses inputs that would produce an invalid id.
    pub fn try_new(serial: Serial, color: &str) -> Result<Self, CoreError> {
        if serial == 0 || serial > MAX_SERIAL {
            return Err(CoreError::InvalidSerial(serial));
        }
        if color.is_empty() || !color.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::InvalidColor(color.to_string()));
        }
        Ok(Self::new(serial, color))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    pub fn total_time(&self) -> Seconds {
        self.total_time
    }

    pub fn completed_stages(&self) -> &[String] {
        &self.completed_stages
    }

    pub fn validate_id(&self) -> bool {
        ITEM_ID_PREFIX.is_match(&self.id)
    }

    /// Zero-padded serial taken back out of the id, `None` if the id is malformed.
    pub fn serial_number(&self) -> Option<&str> {
        ITEM_SERIAL
            .captures(&self.id)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    pub fn describe(&self) -> String {
        self.to_string()
    }

    /// Accounts for one finished stage. Negative durations count as zero.
    pub fn record_stage(&mut self, stage: &str, duration: Seconds) {
        self.total_time += duration.max(0.0);
        self.completed_stages.push(stage.to_string());
    }

    pub fn mark_done(&mut self) {
        self.status = ItemStatus::Done;
    }

    pub fn reject(&mut self) {
        self.status = ItemStatus::Rejected;
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Status: {}, Temps: {}s)",
            self.id, self.status, self.total_time
        )
    }
}

/// Wire shape of an [`Item`]; checked before it becomes one.
#[derive(Deserialize)]
struct ItemRecord {
    id: String,
    status: ItemStatus,
    total_time: Seconds,
    completed_stages: Vec<String>,
}

impl TryFrom<ItemRecord> for Item {
    type Error = CoreError;

    fn try_from(record: ItemRecord) -> Result<Self, Self::Error> {
        if !ITEM_ID_PREFIX.is_match(&record.id) {
            return Err(CoreError::InvalidRecord(format!("malformed id {:?}", record.id)));
        }
        if !record.total_time.is_finite() || record.total_time < 0.0 {
            return Err(CoreError::InvalidRecord(format!(
                "total_time {} must be finite and non-negative",
                record.total_time
            )));
        }
        Ok(Self {
            id: record.id,
            status: record.status,
            total_time: record.total_time,
            completed_stages: record.completed_stages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_fresh_item() {
        let item = Item::new(1, "red");
        assert_eq!(item.describe(), "TOY-001-RED (Status: in-progress, Temps: 0s)");
        assert_eq!(item.to_string(), item.describe());
    }

    #[test]
    fn every_three_digit_serial_validates() {
        for serial in 1..=MAX_SERIAL {
            let item = Item::new(serial, "blue");
            assert!(item.validate_id(), "{} should validate", item.id());
            assert_eq!(item.serial_number(), Some(format!("{:03}", serial).as_str()));
        }
    }

    #[test]
    fn serial_is_zero_padded() {
        assert_eq!(Item::new(1, "green").serial_number(), Some("001"));
        assert_eq!(Item::new(42, "green").serial_number(), Some("042"));
    }

    #[test]
    fn non_alphabetic_color_fails_validation() {
        let item = Item::new(1, "1");
        assert_eq!(item.id(), "TOY-001-1");
        assert!(!item.validate_id());
        assert_eq!(item.serial_number(), None);
    }

    #[test]
    fn trailing_characters_after_color_still_validate() {
        let item = Item::new(1, "red1");
        assert_eq!(item.id(), "TOY-001-RED1");
        assert!(item.validate_id());
        assert_eq!(item.serial_number(), Some("001"));
    }

    #[test]
    fn deserializing_rejects_malformed_id() {
        let json = r#"{"id":"BOX-1-RED","status":"done","total_time":1.0,"completed_stages":[]}"#;
        let err = serde_json::from_str::<Item>(json).expect_err("malformed id accepted");
        assert!(err.to_string().contains("malformed id"));
    }

    #[test]
    fn deserializing_rejects_negative_time() {
        let json = r#"{"id":"TOY-001-RED","status":"done","total_time":-2.0,"completed_stages":[]}"#;
        let err = serde_json::from_str::<Item>(json).expect_err("negative time accepted");
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn four_digit_serial_fails_validation() {
        assert!(!Item::new(1000, "red").validate_id());
    }

    #[test]
    fn try_new_rejects_bad_inputs() {
        assert!(matches!(Item::try_new(0, "red"), Err(CoreError::InvalidSerial(0))));
        assert!(matches!(
            Item::try_new(1000, "red"),
            Err(CoreError::InvalidSerial(1000))
        ));
        assert!(matches!(Item::try_new(5, ""), Err(CoreError::InvalidColor(_))));
        assert!(matches!(Item::try_new(5, "r3d"), Err(CoreError::InvalidColor(_))));
        let item = Item::try_new(5, "Red").expect("valid item");
        assert_eq!(item.id(), "TOY-005-RED");
    }

    #[test]
    fn record_stage_accumulates_in_order() {
        let mut item = Item::new(7, "red");
        item.record_stage("assembly", 2.5);
        item.record_stage("painting", -1.0);
        item.record_stage("packaging", 0.5);
        assert_eq!(item.total_time(), 3.0);
        assert_eq!(item.completed_stages(), ["assembly", "painting", "packaging"]);
        assert_eq!(item.describe(), "TOY-007-RED (Status: in-progress, Temps: 3s)");
    }

    #[test]
    fn status_transitions() {
        let mut item = Item::new(3, "blue");
        item.mark_done();
        assert_eq!(item.status(), ItemStatus::Done);
        item.reject();
        assert_eq!(item.status(), ItemStatus::Rejected);
        assert!(item.describe().contains("Status: rejected"));
    }

    #[test]
    fn serializes_status_in_kebab_case() {
        let json = Item::new(9, "red").to_json().expect("serialize item");
        assert!(json.contains("\"id\":\"TOY-009-RED\""));
        assert!(json.contains("\"status\":\"in-progress\""));
        let back: Item = serde_json::from_str(&json).expect("deserialize item");
        assert_eq!(back, Item::new(9, "red"));
    }
}
