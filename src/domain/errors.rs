use thiserror::Error;

use super::returns::ItemId;

/// Which remote call produced an HTTP failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Lookup,
    Update,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Lookup => f.write_str("Lookup"),
            Operation::Update => f.write_str("Update"),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Please enter an order number.")]
    Validation,
    #[error("No return found for that order number.")]
    NotFound,
    #[error("{operation} failed ({status})")]
    Http { operation: Operation, status: u16 },
    #[error("{0}")]
    Network(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// The task carrying a remote call died before settling.
    #[error("Request interrupted: {0}")]
    Interrupted(String),
    /// A confirm call failed after its optimistic change was applied locally.
    #[error("{source}")]
    PartialUpdate {
        item_id: ItemId,
        source: Box<DomainError>,
    },
}

impl DomainError {
    pub fn partial_update(item_id: ItemId, source: DomainError) -> Self {
        DomainError::PartialUpdate {
            item_id,
            source: Box::new(source),
        }
    }

    /// The error underneath any `PartialUpdate` wrapping.
    pub fn root(&self) -> &DomainError {
        match self {
            DomainError::PartialUpdate { source, .. } => source.root(),
            other => other,
        }
    }
}
