//! Infrastructure layer - Adapters for external systems
//!
//! Implements the ports defined in the application layer: speech, language
//! model and translation providers, Twilio messaging, recording download,
//! the passage corpus, the audio artifact store and SQLite persistence.
//! Also owns configuration loading, logging setup and the provider registry
//! builder.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod registry_builder;
pub mod telemetry;

pub use adapters::*;
pub use config::{
    AppConfig, DatabaseConfig, MessagingConfig, PipelineConfig, ServerConfig, TelemetryAppConfig,
};
pub use persistence::{AsyncDatabase, AsyncDatabaseConfig, AsyncDatabaseError, SqliteQueryRecordStore};
pub use registry_builder::build_provider_registry;
pub use telemetry::{LogFormat, TelemetryError, TelemetryGuard, init_telemetry};
