//! Ordered fallback over interchangeable providers
//!
//! A chain holds the providers of one capability in configured priority
//! order. Running it tries each provider in turn, bounded by a per-attempt
//! timeout, and stops at the first success. When every attempt fails the
//! chain hands back every failure instead of raising.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::error::ApplicationError;

/// Outcome of a single provider attempt
#[derive(Debug)]
pub enum ProviderAttemptResult<T> {
    Success { provider_id: &'static str, value: T },
    Failure(ProviderFailure),
}

impl<T> ProviderAttemptResult<T> {
    pub const fn provider_id(&self) -> &'static str {
        match self {
            Self::Success { provider_id, .. } => *provider_id,
            Self::Failure(failure) => failure.provider_id,
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Why one provider did not deliver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider_id: &'static str,
    pub error: String,
    pub timed_out: bool,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider_id, self.error)
    }
}

/// Every provider of a capability failed, or none was configured
#[derive(Debug, Clone, Error)]
#[error("all {capability} providers failed{}", summarize(.failures))]
pub struct ProviderChainExhausted {
    pub capability: &'static str,
    pub failures: Vec<ProviderFailure>,
}

fn summarize(failures: &[ProviderFailure]) -> String {
    if failures.is_empty() {
        return " (none configured)".to_string();
    }
    let parts: Vec<String> = failures.iter().map(ToString::to_string).collect();
    format!(": {}", parts.join("; "))
}

/// First successful attempt, with the failures that preceded it
#[derive(Debug)]
pub struct ChainSuccess<T> {
    pub provider_id: &'static str,
    pub value: T,
    pub skipped: Vec<ProviderFailure>,
}

struct ChainEntry<P: ?Sized> {
    id: &'static str,
    provider: Arc<P>,
}

/// Providers of one capability, in priority order
pub struct ProviderChain<P: ?Sized> {
    capability: &'static str,
    entries: Vec<ChainEntry<P>>,
    attempt_timeout: Duration,
}

impl<P: ?Sized> fmt::Debug for ProviderChain<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderChain")
            .field("capability", &self.capability)
            .field("providers", &self.provider_ids())
            .field("attempt_timeout", &self.attempt_timeout)
            .finish()
    }
}

impl<P: ?Sized> ProviderChain<P> {
    /// Create an empty chain
    pub const fn new(capability: &'static str, attempt_timeout: Duration) -> Self {
        Self {
            capability,
            entries: Vec::new(),
            attempt_timeout,
        }
    }

    /// Append a provider with the lowest priority so far
    #[must_use]
    pub fn with_provider(mut self, id: &'static str, provider: Arc<P>) -> Self {
        self.push(id, provider);
        self
    }

    /// Append a provider with the lowest priority so far
    pub fn push(&mut self, id: &'static str, provider: Arc<P>) {
        self.entries.push(ChainEntry { id, provider });
    }

    pub const fn capability(&self) -> &'static str {
        self.capability
    }

    pub fn provider_ids(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn providers(&self) -> impl Iterator<Item = &Arc<P>> {
        self.entries.iter().map(|e| &e.provider)
    }

    /// Attempt every provider in order until one succeeds
    ///
    /// # Errors
    ///
    /// Returns `ProviderChainExhausted` carrying one failure per provider
    /// when no attempt succeeds.
    pub async fn run<T, F, Fut>(
        &self,
        mut attempt: F,
    ) -> Result<ChainSuccess<T>, ProviderChainExhausted>
    where
        F: FnMut(Arc<P>) -> Fut,
        Fut: Future<Output = Result<T, ApplicationError>>,
    {
        let mut failures = Vec::new();

        for entry in &self.entries {
            match self.attempt_one(entry, &mut attempt).await {
                ProviderAttemptResult::Success { provider_id, value } => {
                    debug!(
                        capability = self.capability,
                        provider = provider_id,
                        failed_before = failures.len(),
                        "Provider succeeded"
                    );
                    return Ok(ChainSuccess {
                        provider_id,
                        value,
                        skipped: failures,
                    });
                },
                ProviderAttemptResult::Failure(failure) => {
                    warn!(
                        capability = self.capability,
                        provider = failure.provider_id,
                        timed_out = failure.timed_out,
                        error = %failure.error,
                        "Provider attempt failed"
                    );
                    failures.push(failure);
                },
            }
        }

        Err(ProviderChainExhausted {
            capability: self.capability,
            failures,
        })
    }

    async fn attempt_one<T, F, Fut>(
        &self,
        entry: &ChainEntry<P>,
        attempt: &mut F,
    ) -> ProviderAttemptResult<T>
    where
        F: FnMut(Arc<P>) -> Fut,
        Fut: Future<Output = Result<T, ApplicationError>>,
    {
        let provider_id = entry.id;
        match tokio::time::timeout(self.attempt_timeout, attempt(Arc::clone(&entry.provider)))
            .await
        {
            Ok(Ok(value)) => ProviderAttemptResult::Success { provider_id, value },
            Ok(Err(e)) => ProviderAttemptResult::Failure(ProviderFailure {
                provider_id,
                error: e.to_string(),
                timed_out: false,
            }),
            Err(_) => ProviderAttemptResult::Failure(ProviderFailure {
                provider_id,
                error: format!("timed out after {}ms", self.attempt_timeout.as_millis()),
                timed_out: true,
            }),
        }
    }
}
