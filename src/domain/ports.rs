use std::future::Future;

use serde_json::{Map, Value};

use super::errors::DomainError;
use super::returns::{CustomerReturn, ItemId};

/// The remote returns-management API.
pub trait ReturnsApi: Send + Sync + 'static {
    /// Search returns by order number. `query` is already trimmed and
    /// non-empty. Only the first match needs to be decoded.
    fn search_returns(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<CustomerReturn>, DomainError>> + Send;

    /// Mark an item inspected. Yields the server's updated fields, or `None`
    /// when the response carried no JSON object.
    fn mark_inspected(
        &self,
        id: &ItemId,
    ) -> impl Future<Output = Result<Option<Map<String, Value>>, DomainError>> + Send;
}
