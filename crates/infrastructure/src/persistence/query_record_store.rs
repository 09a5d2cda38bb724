//! SQLite query record store

use application::{error::ApplicationError, ports::QueryRecordStore};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use domain::{CallerId, Confidence, NewQueryRecord, QueryId, QueryRecord};
use sqlx::SqlitePool;
use tracing::{debug, instrument, warn};

use super::error::map_sqlx_error;

/// Append-only store over the `query_records` table
#[derive(Debug, Clone)]
pub struct SqliteQueryRecordStore {
    pool: SqlitePool,
}

impl SqliteQueryRecordStore {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct QueryRecordRow {
    id: String,
    caller: String,
    question: String,
    answer: String,
    sources: String,
    confidence: f64,
    created_at: String,
}

impl QueryRecordRow {
    fn into_record(self) -> Result<QueryRecord, ApplicationError> {
        let id = QueryId::parse(&self.id)
            .map_err(|e| ApplicationError::Persistence(format!("Invalid record id: {e}")))?;
        let caller = CallerId::new(self.caller)?;
        let sources: Vec<String> = serde_json::from_str(&self.sources).unwrap_or_else(|e| {
            warn!(record_id = %id, error = %e, "Unreadable sources column, treating as empty");
            Vec::new()
        });

        let new = NewQueryRecord::new(caller, self.question, self.answer)
            .with_sources(sources)
            .with_confidence(Confidence::new(self.confidence));
        Ok(QueryRecord::restore(id, new, parse_datetime(&self.created_at)?))
    }
}

fn format_datetime(at: DateTime<Utc>) -> String {
    // fixed width so text ordering matches time ordering
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, ApplicationError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ApplicationError::Persistence(format!("Invalid timestamp '{s}': {e}")))
}

#[async_trait]
impl QueryRecordStore for SqliteQueryRecordStore {
    #[instrument(skip(self, record), fields(record_id = %record.id()))]
    async fn insert(&self, record: &QueryRecord) -> Result<(), ApplicationError> {
        sqlx::query(
            "INSERT INTO query_records \
             (id, caller, question, answer, sources, confidence, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(record.id().to_string())
        .bind(record.caller().as_str())
        .bind(record.question())
        .bind(record.answer())
        .bind(record.sources_json())
        .bind(record.confidence().value())
        .bind(format_datetime(record.created_at()))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!("Query record stored");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_newest_first(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<QueryRecord>, ApplicationError> {
        // SQLite treats a negative limit as "no limit"
        let limit = limit.map_or(-1, i64::from);

        let rows: Vec<QueryRecordRow> = sqlx::query_as(
            "SELECT id, caller, question, answer, sources, confidence, created_at \
             FROM query_records \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(QueryRecordRow::into_record).collect()
    }
}
