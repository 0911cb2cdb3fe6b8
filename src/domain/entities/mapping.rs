//! Mapping entity: a short alias bound to a destination URL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activity of a mapping at a given instant.
///
/// Never stored; always derived from `expires_at` at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingStatus {
    Active,
    Expired,
}

/// A stored alias → destination mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub alias: String,
    pub destination: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Mapping {
    /// Creates a new Mapping instance.
    pub fn new(
        alias: String,
        destination: String,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            alias,
            destination,
            created_at,
            expires_at,
        }
    }

    /// Returns true if the expiry is set and not later than `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| e <= now)
    }

    /// Returns true if the mapping has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> MappingStatus {
        if self.is_expired_at(now) {
            MappingStatus::Expired
        } else {
            MappingStatus::Active
        }
    }
}

/// Input data for persisting a new mapping.
///
/// `expires_at` always starts empty; expiry is only ever set by extending it.
#[derive(Debug, Clone)]
pub struct NewMapping {
    pub alias: String,
    pub destination: String,
    pub created_at: DateTime<Utc>,
}
