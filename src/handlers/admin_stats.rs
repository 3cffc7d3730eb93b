use actix_web::{web, HttpResponse};

use crate::errors::AppError;

use super::auth::AdminUser;
use super::categories::CategoryCountResponse;
use super::{run_blocking, AppState};

/// GET /api/admin/stats/category-product-counts
#[utoipa::path(
    get,
    path = "/api/admin/stats/category-product-counts",
    responses((status = 200, description = "Knife count per category", body = Vec<CategoryCountResponse>)),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn category_product_counts(
    _admin: AdminUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let categories = state.categories.clone();
    let counts = run_blocking(move || categories.product_counts()).await?;
    let counts: Vec<CategoryCountResponse> =
        counts.into_iter().map(CategoryCountResponse::from).collect();
    Ok(HttpResponse::Ok().json(counts))
}
