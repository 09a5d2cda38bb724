//! Lazy, process-wide cache of per-language-pair resources

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::InferenceError;

type PairKey = (String, String);
type Slot<R> = Arc<OnceCell<Option<Arc<R>>>>;

/// Resources keyed by the ordered pair `(source, target)`
///
/// A loader runs at most once per pair, even when many callers ask for the
/// same pair at the same time. A loader that returns `Ok(None)` marks the
/// pair as unsupported and that answer is cached too. Loader errors are not
/// cached; the next caller retries.
pub struct PairRegistry<R> {
    slots: Mutex<HashMap<PairKey, Slot<R>>>,
}

impl<R> Default for PairRegistry<R> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<R> std::fmt::Debug for PairRegistry<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairRegistry")
            .field("pairs", &self.len())
            .finish()
    }
}

impl<R> PairRegistry<R> {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, source: &str, target: &str) -> Slot<R> {
        let mut slots = self.slots.lock();
        Arc::clone(
            slots
                .entry((source.to_string(), target.to_string()))
                .or_insert_with(|| Arc::new(OnceCell::new())),
        )
    }

    /// Get the resource for a pair, running `load` if it is not ready yet
    ///
    /// # Errors
    ///
    /// Propagates the loader error; the pair stays uninitialized.
    pub async fn get_or_load<F, Fut>(
        &self,
        source: &str,
        target: &str,
        load: F,
    ) -> Result<Option<Arc<R>>, InferenceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<R>, InferenceError>>,
    {
        let slot = self.slot(source, target);
        let resource = slot
            .get_or_try_init(|| async move {
                debug!(source, target, "Loading translation pair");
                load().await.map(|r| r.map(Arc::new))
            })
            .await?;
        Ok(resource.clone())
    }

    /// Number of pairs seen so far
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached pair
    pub fn clear(&self) {
        self.slots.lock().clear();
    }
}
