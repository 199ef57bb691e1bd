use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::lookup_service::ReturnLookupClient;
use crate::domain::returns::Item;
use crate::domain::session::{ItemMatch, SessionState};
use crate::errors::AppError;
use crate::infrastructure::returns_client::HttpReturnsApi;

pub type SessionClient = ReturnLookupClient<HttpReturnsApi>;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct LookupRequest {
    /// Order number as typed by the operator; surrounding whitespace is ignored.
    #[serde(default)]
    pub order: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReturnSummary {
    pub order_number: Option<String>,
    /// "—" when the return has no RMA.
    pub rma: String,
    pub item_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemRow {
    pub id: Option<String>,
    pub name: String,
    pub sku: String,
    /// Rendered as received; "1" when absent.
    pub quantity: String,
    /// "Inspected", "Arrived" or "Registered".
    pub status: String,
    pub busy: bool,
    /// "Saving...", "Inspected" or "Confirm".
    pub action_label: String,
    pub can_confirm: bool,
    /// Clipboard value for the "Copy SKU" button.
    pub copy_value: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionView {
    pub customer_return: Option<ReturnSummary>,
    pub items: Vec<ItemRow>,
    /// Banner message from the last failed action.
    pub error: Option<String>,
    pub loading: bool,
}

impl ItemRow {
    fn new(item: &Item, state: &SessionState) -> Self {
        let busy = item.id.as_ref().map(|id| state.is_busy(id)).unwrap_or(false);
        let inspected = item.inspected();
        let action_label = if busy {
            "Saving..."
        } else if inspected {
            "Inspected"
        } else {
            "Confirm"
        };
        Self {
            id: item.id.as_ref().map(ToString::to_string),
            name: item.display_name(),
            sku: item.display_sku(),
            quantity: item.display_quantity(),
            status: item.status().to_string(),
            busy,
            action_label: action_label.to_string(),
            can_confirm: !busy && !inspected && item.confirmable_id().is_some(),
            copy_value: item.copy_value(),
        }
    }
}

impl From<&SessionState> for SessionView {
    fn from(state: &SessionState) -> Self {
        Self {
            customer_return: state.customer_return.as_ref().map(|r| ReturnSummary {
                order_number: r.display_order_number(),
                rma: r.display_rma(),
                item_count: state.items.len(),
            }),
            items: state.items.iter().map(|it| ItemRow::new(it, state)).collect(),
            error: state.error.clone(),
            loading: state.loading,
        }
    }
}

fn view(client: &SessionClient) -> HttpResponse {
    HttpResponse::Ok().json(SessionView::from(&client.session()))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /session
///
/// Current return, its items and the banner message.
#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Current session", body = SessionView),
    ),
    tag = "session"
)]
pub async fn get_session(client: web::Data<SessionClient>) -> HttpResponse {
    view(&client)
}

/// POST /session/lookup
///
/// Replaces the current return with the first match for the order number.
#[utoipa::path(
    post,
    path = "/session/lookup",
    request_body = LookupRequest,
    responses(
        (status = 200, description = "Return found", body = SessionView),
        (status = 400, description = "Empty order number"),
        (status = 404, description = "No return for that order number"),
        (status = 502, description = "Returns API rejected the call"),
        (status = 503, description = "Returns API unreachable"),
    ),
    tag = "session"
)]
pub async fn lookup(
    client: web::Data<SessionClient>,
    body: web::Json<LookupRequest>,
) -> Result<HttpResponse, AppError> {
    client.lookup(&body.order).await?;
    Ok(view(&client))
}

/// POST /session/items/{id}/confirm
///
/// Marks an item of the current return inspected. The item shows as
/// inspected right away and is rolled back if the returns API refuses.
#[utoipa::path(
    post,
    path = "/session/items/{id}/confirm",
    params(
        ("id" = String, Path, description = "Item id as shown in the session"),
    ),
    responses(
        (status = 200, description = "Item confirmed", body = SessionView),
        (status = 400, description = "Id matches items with different ids"),
        (status = 404, description = "Item not in the current return"),
        (status = 502, description = "Returns API rejected the update; change rolled back"),
        (status = 503, description = "Returns API unreachable; change rolled back"),
    ),
    tag = "session"
)]
pub async fn confirm_item(
    client: web::Data<SessionClient>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let item = match client.session().find_item(&id) {
        ItemMatch::One(item) => item.clone(),
        ItemMatch::Ambiguous => {
            return Err(AppError::BadRequest(format!(
                "Item id {} is ambiguous in the current return",
                id
            )))
        }
        ItemMatch::Missing => {
            return Err(AppError::NotFound(format!(
                "Item {} is not in the current return",
                id
            )))
        }
    };

    client.confirm_item(&item).await?;
    Ok(view(&client))
}

/// DELETE /session
///
/// Drops the current return.
#[utoipa::path(
    delete,
    path = "/session",
    responses(
        (status = 200, description = "Session cleared", body = SessionView),
    ),
    tag = "session"
)]
pub async fn clear_session(client: web::Data<SessionClient>) -> HttpResponse {
    client.clear();
    view(&client)
}
