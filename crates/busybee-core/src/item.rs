//! Plain data records for schedulable items.
//!
//! Events and tasks share a common item identity (name, notes, audit
//! timestamps) and a kind discriminator. All records here are behavior-free;
//! persistence lives in [`crate::storage`].

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Discriminator for the two schedulable item kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ItemKind {
    Event,
    Task,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Event => "EVENT",
            ItemKind::Task => "TASK",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "EVENT" => Ok(ItemKind::Event),
            "TASK" => Ok(ItemKind::Task),
            other => Err(CoreError::InvalidArgument {
                field: "kind",
                message: format!("unknown item kind '{other}'"),
            }),
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Low
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        }
    }

    /// Parse from the stored/CLI form (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            other => Err(CoreError::InvalidArgument {
                field: "priority",
                message: format!("unknown priority '{other}'"),
            }),
        }
    }
}

/// Repeat frequency for a recurring event.
///
/// "Does not repeat" is expressed as the absence of a [`RecurrenceRule`],
/// not as a variant here; callers special-case it before expansion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }

    /// Parse from the stored/CLI form (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            other => Err(CoreError::InvalidArgument {
                field: "frequency",
                message: format!("unknown frequency '{other}'"),
            }),
        }
    }
}

/// A repeat rule: how often, and how many occurrences in total
/// (including the first).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    pub times: u32,
}

/// A persisted recurrence record shared by its expanded event occurrences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recurrence {
    pub id: String,
    pub frequency: Frequency,
    pub times: u32,
}

/// A calendar event occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub notes: Option<String>,
    pub place: Option<String>,
    pub start: NaiveDateTime,
    /// Set when this event is one occurrence of a repeating series.
    pub recurrence_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A to-do task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub notes: Option<String>,
    pub complete: bool,
    pub priority: Priority,
    pub due: Option<NaiveDateTime>,
    pub category_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named tag with a display color, shared by events and tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color_hex: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input record for saving an event, possibly recurring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub name: String,
    pub notes: Option<String>,
    pub place: Option<String>,
    pub start: NaiveDateTime,
    /// None means "does not repeat".
    pub repeat: Option<RecurrenceRule>,
}

/// Input record for saving a task.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NewTask {
    pub name: String,
    pub notes: Option<String>,
    /// Defaults to [`Priority::Low`] when unspecified.
    pub priority: Option<Priority>,
    pub due: Option<NaiveDateTime>,
    pub category_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_round_trips_through_text() {
        for p in [Priority::Low, Priority::Medium, Priority::High] {
            assert_eq!(Priority::parse(p.as_str()).unwrap(), p);
        }
    }

    #[test]
    fn frequency_parse_is_case_insensitive() {
        assert_eq!(Frequency::parse("weekly").unwrap(), Frequency::Weekly);
        assert_eq!(Frequency::parse("MONTHLY").unwrap(), Frequency::Monthly);
    }

    #[test]
    fn unknown_frequency_is_invalid_argument() {
        let err = Frequency::parse("FORTNIGHTLY").unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidArgument { field: "frequency", .. }
        ));
    }

    #[test]
    fn priority_defaults_to_low() {
        assert_eq!(Priority::default(), Priority::Low);
    }
}
