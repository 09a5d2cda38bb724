//! Domain layer for the farmer call service
//!
//! Contains the call session state machine, the values produced by each
//! pipeline stage and the persisted query record.
//! This layer has no I/O and defines the ubiquitous language.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
