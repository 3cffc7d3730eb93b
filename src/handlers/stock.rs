use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::knife::StockCheck;
use crate::errors::AppError;

use super::{run_blocking, AppState};

// ── DTOs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockCheckResponse {
    pub available: bool,
    pub stock: i32,
    pub requested: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<StockCheck> for StockCheckResponse {
    fn from(c: StockCheck) -> Self {
        StockCheckResponse {
            available: c.available,
            stock: c.stock,
            requested: c.requested,
            product_name: c.product_name,
            reason: c.reason,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemResponse {
    /// The id exactly as it was sent.
    pub knife_id: String,
    #[serde(flatten)]
    pub check: StockCheckResponse,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub all_available: bool,
    pub items: Vec<BatchItemResponse>,
    pub total_items: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub knife_id: String,
    #[serde(default = "one")]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QuantityQuery {
    /// Defaults to 1.
    pub quantity: Option<i32>,
}

fn one() -> i32 {
    1
}

/// Ids that are not UUIDs cannot name a knife; they are checked as the nil id
/// so they come back as "Product not found".
fn knife_id(raw: &str) -> Uuid {
    Uuid::parse_str(raw.trim()).unwrap_or(Uuid::nil())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/stock/check/{knifeId}?quantity=
#[utoipa::path(
    get,
    path = "/api/stock/check/{knife_id}",
    params(
        ("knife_id" = String, Path, description = "Knife UUID"),
        QuantityQuery,
    ),
    responses((status = 200, description = "Availability of the knife", body = StockCheckResponse)),
    tag = "stock"
)]
pub async fn check_stock(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<QuantityQuery>,
) -> Result<HttpResponse, AppError> {
    let id = knife_id(&path.into_inner());
    let quantity = query.into_inner().quantity.unwrap_or(1);
    let knives = state.knives.clone();
    let check = run_blocking(move || knives.check_stock(id, quantity)).await?;
    Ok(HttpResponse::Ok().json(StockCheckResponse::from(check)))
}

/// POST /api/stock/check-batch
#[utoipa::path(
    post,
    path = "/api/stock/check-batch",
    request_body = Vec<BatchItem>,
    responses((status = 200, description = "Availability of every item", body = BatchResponse)),
    tag = "stock"
)]
pub async fn check_batch(
    state: web::Data<AppState>,
    body: web::Json<Vec<BatchItem>>,
) -> Result<HttpResponse, AppError> {
    let items = body.into_inner();
    let lookups: Vec<(Uuid, i32)> = items
        .iter()
        .map(|item| (knife_id(&item.knife_id), item.quantity))
        .collect();
    let knives = state.knives.clone();
    let batch = run_blocking(move || knives.check_stock_batch(&lookups)).await?;

    Ok(HttpResponse::Ok().json(BatchResponse {
        all_available: batch.all_available,
        total_items: batch.total_items,
        items: items
            .into_iter()
            .zip(batch.items)
            .map(|(item, check)| BatchItemResponse {
                knife_id: item.knife_id,
                check: check.into(),
            })
            .collect(),
    }))
}
