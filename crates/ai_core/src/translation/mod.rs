//! Text translation backends
//!
//! Each translator keeps its per-pair resources in a [`PairRegistry`], so a
//! pair is prepared once on first use and shared afterwards.

mod libre;
mod llm;
mod registry;

pub use libre::LibreTranslator;
pub use llm::{LlmTranslator, language_name};
pub use registry::PairRegistry;
