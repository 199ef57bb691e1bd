use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::errors::DomainError;
use crate::domain::ports::ReturnsApi;
use crate::domain::returns::{CustomerReturn, Item};
use crate::domain::session::{PendingConfirm, SessionEvent, SessionState};

/// Drives one operator session against the returns API.
///
/// State only changes through [`SessionState::reduce`]; the lock is released
/// before any remote call, so lookups and confirms for different items can be
/// in flight at the same time.
///
/// Each remote call runs in its own task together with the event that
/// settles it. A caller that goes away (a dropped handler future) does not
/// cancel the call, so `busy` and `loading` always clear once it returns.
pub struct ReturnLookupClient<A> {
    shared: Arc<Shared<A>>,
}

struct Shared<A> {
    api: A,
    state: Mutex<SessionState>,
}

impl<A: ReturnsApi> ReturnLookupClient<A> {
    pub fn new(api: A) -> Self {
        Self {
            shared: Arc::new(Shared {
                api,
                state: Mutex::new(SessionState::default()),
            }),
        }
    }

    pub fn session(&self) -> SessionState {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Look up the return for an order number typed by the operator.
    ///
    /// Only the first matching return is kept. Failures are recorded as the
    /// session's banner message and returned.
    pub async fn lookup(&self, raw: &str) -> Result<CustomerReturn, DomainError> {
        let query = raw.trim().to_string();
        if query.is_empty() {
            let err = DomainError::Validation;
            self.shared.dispatch(SessionEvent::LookupRejected {
                message: err.to_string(),
            });
            return Err(err);
        }

        let generation = self.shared.transition(|state| {
            let state = state.reduce(SessionEvent::LookupStarted);
            let generation = state.generation;
            (state, generation)
        });
        log::info!("Looking up return for order '{}'", query);

        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(async move {
            let outcome = shared
                .api
                .search_returns(&query)
                .await
                .and_then(|returns| returns.into_iter().next().ok_or(DomainError::NotFound));
            shared.settle_lookup(generation, &query, &outcome);
            outcome
        });

        task.await.unwrap_or_else(|e| {
            let err = DomainError::Interrupted(e.to_string());
            self.shared.settle_lookup(generation, raw.trim(), &Err(err.clone()));
            Err(err)
        })
    }

    /// Mark an item inspected, optimistically.
    ///
    /// Does nothing for an item without an id. The call is issued even when
    /// the item already reads as inspected.
    pub async fn confirm_item(&self, item: &Item) -> Result<(), DomainError> {
        let Some(id) = item.confirmable_id().cloned() else {
            return Ok(());
        };

        let pending = self
            .shared
            .transition(|state| state.begin_confirm(id.clone()));
        log::info!("Confirming inspection of item {}", id);

        let shared = Arc::clone(&self.shared);
        let settle = pending.clone();
        let task = tokio::spawn(async move {
            match shared.api.mark_inspected(&pending.id).await {
                Ok(patch) => {
                    shared.dispatch(SessionEvent::ConfirmCommitted { pending, patch });
                    Ok(())
                }
                Err(source) => Err(shared.revert_confirm(pending, source)),
            }
        });

        task.await.unwrap_or_else(|e| {
            let source = DomainError::Interrupted(e.to_string());
            Err(self.shared.revert_confirm(settle, source))
        })
    }

    pub fn clear(&self) {
        self.shared.dispatch(SessionEvent::Cleared);
    }
}

impl<A> Shared<A> {
    fn settle_lookup(
        &self,
        generation: u64,
        query: &str,
        outcome: &Result<CustomerReturn, DomainError>,
    ) {
        match outcome {
            Ok(customer_return) => {
                log::info!(
                    "Found return for order '{}' with {} item(s)",
                    query,
                    customer_return.items.len()
                );
                self.dispatch(SessionEvent::LookupFound {
                    generation,
                    customer_return: customer_return.clone(),
                });
            }
            Err(err) => {
                log::warn!("Lookup for order '{}' failed: {}", query, err);
                self.dispatch(SessionEvent::LookupFailed {
                    generation,
                    message: err.to_string(),
                });
            }
        }
    }

    fn revert_confirm(
        &self,
        pending: PendingConfirm,
        source: DomainError,
    ) -> DomainError {
        let err = DomainError::partial_update(pending.id.clone(), source);
        log::warn!("Rolling back confirm: {}", err);
        self.dispatch(SessionEvent::ConfirmReverted {
            pending,
            message: err.to_string(),
        });
        err
    }

    fn dispatch(&self, event: SessionEvent) {
        self.transition(|state| (state.reduce(event), ()));
    }

    fn transition<T>(&self, f: impl FnOnce(SessionState) -> (SessionState, T)) -> T {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let (next, out) = f(std::mem::take(&mut *guard));
        *guard = next;
        out
    }
}
