//! Value Objects - Immutable, identity-less domain primitives

mod caller_id;
mod confidence;
mod language;
mod query_id;

pub use caller_id::{CallerId, MAX_CALLER_ID_LEN};
pub use confidence::Confidence;
pub use language::{LanguagePair, LanguageTag};
pub use query_id::QueryId;
