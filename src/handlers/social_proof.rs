use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::social_proof::{RecentPurchase, DEFAULT_LIMIT};

use super::{ApiResponse, AppState};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentPurchaseResponse {
    /// "Ahmet Y."
    pub customer_name: String,
    pub product_name: String,
    pub product_slug: String,
    pub location: String,
    /// e.g. "5 dakika önce", "dün"
    pub time_ago: String,
    pub category: Option<String>,
}

impl From<RecentPurchase> for RecentPurchaseResponse {
    fn from(p: RecentPurchase) -> Self {
        RecentPurchaseResponse {
            customer_name: p.customer_name,
            product_name: p.product_name,
            product_slug: p.product_slug,
            location: p.location,
            time_ago: p.time_ago,
            category: p.category,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    /// Defaults to 25.
    pub limit: Option<i64>,
}

/// GET /api/social-proof/recent-purchases?limit=
///
/// Lookup failures degrade to an empty list.
#[utoipa::path(
    get,
    path = "/api/social-proof/recent-purchases",
    params(LimitQuery),
    responses((status = 200, description = "Anonymised recent purchases", body = ApiResponse<Vec<RecentPurchaseResponse>>)),
    tag = "social-proof"
)]
pub async fn recent_purchases(
    state: web::Data<AppState>,
    query: web::Query<LimitQuery>,
) -> HttpResponse {
    let limit = query.into_inner().limit.unwrap_or(DEFAULT_LIMIT);
    let orders = state.orders.clone();
    let purchases = web::block(move || orders.recent_purchases(limit))
        .await
        .unwrap_or_else(|e| {
            log::error!("Recent purchases lookup was cancelled: {}", e);
            vec![]
        });
    let purchases: Vec<RecentPurchaseResponse> =
        purchases.into_iter().map(RecentPurchaseResponse::from).collect();
    HttpResponse::Ok().json(ApiResponse::ok(purchases))
}
