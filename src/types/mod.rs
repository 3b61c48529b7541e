//! Core types for the selection pipeline
//!
//! Contains the identifiers and entities shared by the catalog, the
//! prediction model and the job registry. Everything here is immutable
//! after construction.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// Unique identifier for a catalog item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ItemId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a job
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for JobId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Grid position of an item in the storage area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

/// Static attributes of an orderable item
///
/// Owned by the catalog; tasks hold a shared reference to the resolved item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub location: Location,
    pub reward: f64,
    pub weight: f64,
}

/// One (item, quantity) requirement within a job
#[derive(Debug, Clone)]
pub struct Task {
    pub item_id: ItemId,
    pub quantity: u32,
    pub item: Arc<Item>,
}

/// Predicted or recorded outcome of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Completed,
    Cancelled,
}

impl Outcome {
    /// Binary flag as used by the label records (0 = completed, 1 = cancelled)
    pub fn flag(&self) -> u8 {
        match self {
            Outcome::Completed => 0,
            Outcome::Cancelled => 1,
        }
    }

    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0 => Some(Outcome::Completed),
            1 => Some(Outcome::Cancelled),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Completed => write!(f, "Completed"),
            Outcome::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// A selectable unit of work
///
/// Carries its ordered task list, the derived total reward used as the
/// queue ordering key, and the cancellation prediction assigned exactly
/// once when the registry is built.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub tasks: Vec<Task>,
    pub total_reward: f64,
    pub predicted: Outcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_item_id_display() {
        let id = ItemId::new("a");
        assert_eq!(id.to_string(), "a");
        assert_eq!(id.as_str(), "a");
    }

    #[test]
    fn test_job_id_from_str() {
        let id = JobId::from_str("10100").unwrap();
        assert_eq!(id.to_string(), "10100");
    }

    #[test]
    fn test_outcome_flags() {
        assert_eq!(Outcome::Completed.flag(), 0);
        assert_eq!(Outcome::Cancelled.flag(), 1);
        assert_eq!(Outcome::from_flag(0), Some(Outcome::Completed));
        assert_eq!(Outcome::from_flag(1), Some(Outcome::Cancelled));
        assert_eq!(Outcome::from_flag(2), None);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(format!("{}", Outcome::Completed), "Completed");
        assert_eq!(format!("{}", Outcome::Cancelled), "Cancelled");
    }

    #[test]
    fn test_outcome_is_cancelled() {
        assert!(Outcome::Cancelled.is_cancelled());
        assert!(!Outcome::Completed.is_cancelled());
    }
}
