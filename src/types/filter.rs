//! Structured predicate over log records.
//!
//! Every clause is optional and clauses combine with AND. Stores interpret
//! the filter uniformly; nothing in the crate assembles query strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::LogRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Inclusive lower bound on the timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
}

impl LogFilter {
    /// The unconstrained filter.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn is_unconstrained(&self) -> bool {
        self.level.is_none() && self.service.is_none() && self.since.is_none() && self.until.is_none()
    }

    /// True when the record satisfies every present clause.
    pub fn matches(&self, record: &LogRecord) -> bool {
        if let Some(level) = &self.level {
            if record.level != *level {
                return false;
            }
        }
        if let Some(service) = &self.service {
            if record.service != *service {
                return false;
            }
        }
        if let Some(since) = self.since {
            if record.timestamp < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if record.timestamp > until {
                return false;
            }
        }
        true
    }
}
