//! Query record store - append-only persistence of handled questions

use async_trait::async_trait;
use domain::QueryRecord;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for persisting query records
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QueryRecordStore: Send + Sync {
    /// Append a record
    async fn insert(&self, record: &QueryRecord) -> Result<(), ApplicationError>;

    /// Records ordered newest first, optionally limited
    async fn list_newest_first(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<QueryRecord>, ApplicationError>;
}
