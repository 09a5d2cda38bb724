//! Application layer - Use cases and orchestration
//!
//! Contains the call pipeline, its stages, the provider chain every external
//! capability runs through, and the port definitions adapters implement.

pub mod error;
pub mod fallback_messages;
pub mod knowledge;
pub mod ports;
pub mod provider_chain;
pub mod registry;
pub mod services;
pub mod stages;

pub use error::ApplicationError;
pub use fallback_messages::FallbackKind;
pub use ports::*;
pub use provider_chain::{
    ChainSuccess, ProviderAttemptResult, ProviderChain, ProviderChainExhausted, ProviderFailure,
};
pub use registry::{ProviderRegistry, ProviderSummary};
pub use services::*;
pub use stages::{ChannelOutcome, NotificationReport, TranslationResult, TranslationStatus};
