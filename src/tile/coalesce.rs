//! Per-key coalescing of concurrent cache misses.
//!
//! Without coalescing, N concurrent misses on one key regenerate the same
//! artifact N times. That is idempotent and correct, just wasteful for
//! expensive decodes. When enabled, the first miss on a key becomes the
//! leader and performs the regeneration; later misses on the same key park
//! until the leader publishes and then share its result.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{Mutex, Notify};

use crate::cache::CacheKey;
use crate::error::EngineError;

type FlightResult = Result<Option<Bytes>, EngineError>;

struct InFlightState {
    notify: Notify,
    result: Mutex<Option<FlightResult>>,
}

/// Collapses concurrent regenerations of one cache key into a single run.
pub(crate) struct MissCoalescer {
    in_flight: Mutex<HashMap<CacheKey, Arc<InFlightState>>>,
}

impl MissCoalescer {
    pub fn new() -> Self {
        Self {
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Run `generate` for `key`, sharing its result with concurrent callers.
    ///
    /// The caller that finds no flight in progress becomes the leader and
    /// runs `generate`; everyone else waits for the published result. Each
    /// flight resolves independently: a new miss arriving after the leader
    /// published starts a fresh flight.
    pub async fn run<F, Fut>(&self, key: &CacheKey, generate: F) -> FlightResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FlightResult>,
    {
        let state = {
            let mut in_flight = self.in_flight.lock().await;
            if let Some(state) = in_flight.get(key) {
                Arc::clone(state)
            } else {
                let state = Arc::new(InFlightState {
                    notify: Notify::new(),
                    result: Mutex::new(None),
                });
                in_flight.insert(key.clone(), Arc::clone(&state));
                drop(in_flight);

                let result = generate().await;

                *state.result.lock().await = Some(result.clone());
                self.in_flight.lock().await.remove(key);
                state.notify.notify_waiters();

                return result;
            }
        };

        // The leader publishes before notifying, so register for the wakeup
        // first and only park if the slot is still empty.
        loop {
            let notified = state.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(result) = state.result.lock().await.as_ref() {
                return result.clone();
            }

            notified.await;
        }
    }
}
