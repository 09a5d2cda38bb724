//! Call pipeline configuration.

use serde::{Deserialize, Serialize};

/// Languages, retrieval depth and the worker pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Language answers are produced in
    #[serde(default = "default_working_language")]
    pub working_language: String,

    /// Language assumed for callers that send no hint
    #[serde(default = "default_caller_language")]
    pub default_caller_language: String,

    /// Passages retrieved per question
    #[serde(default = "default_top_k")]
    pub retrieval_top_k: usize,

    /// Concurrent call workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Calls that may wait for a worker
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Per-attempt provider timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,
}

fn default_working_language() -> String {
    "en".to_string()
}

fn default_caller_language() -> String {
    "ml".to_string()
}

const fn default_top_k() -> usize {
    3
}

const fn default_workers() -> usize {
    4
}

const fn default_queue_capacity() -> usize {
    256
}

const fn default_provider_timeout() -> u64 {
    30
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            working_language: default_working_language(),
            default_caller_language: default_caller_language(),
            retrieval_top_k: default_top_k(),
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            provider_timeout_secs: default_provider_timeout(),
        }
    }
}
