//! Domain entities - Objects with identity and lifecycle

mod answer;
mod call_session;
mod query_record;
mod transcript;

pub use answer::Answer;
pub use call_session::{CallSession, CallStatus};
pub use query_record::{NewQueryRecord, QueryRecord};
pub use transcript::Transcript;
