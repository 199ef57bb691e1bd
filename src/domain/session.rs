//! Session state for one operator and the pure transitions over it.
//!
//! Every change goes through [`SessionState::reduce`]. Confirming an item is
//! split into [`SessionState::begin_confirm`], which snapshots the list and
//! applies the change locally, and a later commit or revert event that
//! settles it.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::returns::{CustomerReturn, Item, ItemId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub customer_return: Option<CustomerReturn>,
    pub items: Vec<Item>,
    /// Ids with an update call in flight.
    pub busy: BTreeSet<ItemId>,
    /// Banner message from the last failed action.
    pub error: Option<String>,
    pub loading: bool,
    /// Bumped by every lookup and clear; completions from older ones are dropped.
    pub generation: u64,
}

/// Token handed out by `begin_confirm` and carried to the settling event.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingConfirm {
    pub id: ItemId,
    pub generation: u64,
    pub snapshot: Vec<Item>,
}

/// Result of resolving an id typed as text against the current items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemMatch<'a> {
    One(&'a Item),
    /// Items with different ids (e.g. `1` and `"1"`) share this text.
    Ambiguous,
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    LookupRejected { message: String },
    LookupStarted,
    LookupFound {
        generation: u64,
        customer_return: CustomerReturn,
    },
    LookupFailed { generation: u64, message: String },
    ConfirmStarted { id: ItemId },
    ConfirmCommitted {
        pending: PendingConfirm,
        patch: Option<Map<String, Value>>,
    },
    ConfirmReverted {
        pending: PendingConfirm,
        message: String,
    },
    Cleared,
}

impl SessionState {
    pub fn is_busy(&self, id: &ItemId) -> bool {
        self.busy.contains(id)
    }

    /// Resolve an id by its display text. A number and a string that render
    /// alike are refused rather than guessed between.
    pub fn find_item(&self, id: &str) -> ItemMatch<'_> {
        let mut found: Option<&Item> = None;
        for item in &self.items {
            let Some(item_id) = item.id.as_ref() else {
                continue;
            };
            if item_id.to_string() != id {
                continue;
            }
            match found {
                None => found = Some(item),
                Some(first) if first.id.as_ref() != Some(item_id) => return ItemMatch::Ambiguous,
                Some(_) => {}
            }
        }
        found.map_or(ItemMatch::Missing, ItemMatch::One)
    }

    /// Snapshot, then apply the optimistic change. The returned token must be
    /// settled with `ConfirmCommitted` or `ConfirmReverted`.
    pub fn begin_confirm(self, id: ItemId) -> (SessionState, PendingConfirm) {
        let pending = PendingConfirm {
            id: id.clone(),
            generation: self.generation,
            snapshot: self.items.clone(),
        };
        (self.reduce(SessionEvent::ConfirmStarted { id }), pending)
    }

    pub fn reduce(mut self, event: SessionEvent) -> SessionState {
        match event {
            SessionEvent::LookupRejected { message } => {
                self.error = Some(message);
            }
            SessionEvent::LookupStarted => {
                self.generation += 1;
                self.error = None;
                self.loading = true;
                self.customer_return = None;
                self.items.clear();
            }
            SessionEvent::LookupFound {
                generation,
                customer_return,
            } => {
                if generation == self.generation {
                    self.loading = false;
                    self.items = customer_return.items.clone();
                    self.customer_return = Some(customer_return);
                }
            }
            SessionEvent::LookupFailed {
                generation,
                message,
            } => {
                if generation == self.generation {
                    self.loading = false;
                    self.error = Some(message);
                }
            }
            SessionEvent::ConfirmStarted { id } => {
                for it in self.items.iter_mut().filter(|it| it.id.as_ref() == Some(&id)) {
                    it.is_inspected = Some(Value::Bool(true));
                }
                self.busy.insert(id);
            }
            SessionEvent::ConfirmCommitted { pending, patch } => {
                self.busy.remove(&pending.id);
                if let Some(patch) = patch {
                    for it in self
                        .items
                        .iter_mut()
                        .filter(|it| it.id.as_ref() == Some(&pending.id))
                    {
                        if let Err(e) = it.merge(&patch) {
                            log::warn!(
                                "Keeping local copy of item {}: server fields did not apply: {}",
                                pending.id,
                                e
                            );
                        }
                    }
                }
            }
            SessionEvent::ConfirmReverted { pending, message } => {
                self.busy.remove(&pending.id);
                self.error = Some(message);
                if pending.generation == self.generation {
                    self.items = pending.snapshot;
                }
            }
            SessionEvent::Cleared => {
                self.generation += 1;
                self.loading = false;
                self.customer_return = None;
                self.items.clear();
                self.error = None;
            }
        }
        self
    }
}
