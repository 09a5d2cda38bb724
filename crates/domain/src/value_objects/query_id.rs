//! Identifier of a persisted query record

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique, time-ordered query record identifier (UUID v7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryId(Uuid);

impl QueryId {
    /// Create a new time-ordered id
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create an id from an existing UUID
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse an id from its string form
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the underlying UUID
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for QueryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(QueryId::new(), QueryId::new());
    }

    #[test]
    fn later_ids_sort_after_earlier_ones() {
        let first = QueryId::new();
        let second = QueryId::new();
        assert!(second > first);
    }

    #[test]
    fn roundtrips_through_string() {
        let id = QueryId::new();
        assert_eq!(QueryId::parse(&id.to_string()).unwrap(), id);
    }
}
