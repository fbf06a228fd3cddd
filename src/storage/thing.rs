//! Thing - the sole persisted entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{THING_NAME_BYTES_MAX, THING_VALUE_BYTES_MAX};

/// A name/value pair with identity and timestamps.
///
/// Invariants:
/// - `uuid` is assigned exactly once at creation and never reused
/// - `name` is set at creation and never mutated afterwards
/// - `value` is the only field update operations may change
/// - `created <= updated` always
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thing {
    /// Unique identifier (UUID v4), the primary lookup key
    pub uuid: String,
    /// Display name, immutable after creation
    pub name: String,
    /// The payload, mutable via update
    pub value: String,
    /// Last update timestamp (UTC), refreshed on every successful update
    pub updated: DateTime<Utc>,
    /// Creation timestamp (UTC), set once
    pub created: DateTime<Utc>,
}

impl Thing {
    /// Create a new thing with a fresh id and `created == updated == now`.
    ///
    /// # Panics
    /// Panics if name or value exceed their byte limits. Callers taking
    /// external input must validate lengths first.
    #[must_use]
    pub fn new(name: &str, value: &str) -> Self {
        // Preconditions
        assert!(
            name.len() <= THING_NAME_BYTES_MAX,
            "name {} bytes exceeds max {}",
            name.len(),
            THING_NAME_BYTES_MAX
        );
        assert!(
            value.len() <= THING_VALUE_BYTES_MAX,
            "value {} bytes exceeds max {}",
            value.len(),
            THING_VALUE_BYTES_MAX
        );

        let now = Utc::now();
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            value: value.to_string(),
            updated: now,
            created: now,
        }
    }

    /// Replace the value and refresh the update timestamp.
    pub fn set_value(&mut self, value: &str) {
        assert!(
            value.len() <= THING_VALUE_BYTES_MAX,
            "value {} bytes exceeds max {}",
            value.len(),
            THING_VALUE_BYTES_MAX
        );
        self.value = value.to_string();
        self.updated = Utc::now();
    }
}
