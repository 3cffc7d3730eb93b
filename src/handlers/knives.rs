use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::domain::knife::{Knife, KnifeDraft, KnifeFilter, SortDirection};
use crate::domain::pagination::{PageRequest, DEFAULT_PAGE_SIZE};
use crate::errors::AppError;

use super::auth::AdminUser;
use super::{non_negative_amount, parse_decimal, positive_amount, run_blocking, AppState, PageResponse};

// ── DTOs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KnifeResponse {
    pub id: Uuid,
    pub name: String,
    pub category_id: i32,
    pub category_name: Option<String>,
    pub description: String,
    #[schema(value_type = String, example = "1499.90")]
    pub price: BigDecimal,
    #[schema(value_type = String, example = "1299.90")]
    pub discount_price: BigDecimal,
    pub percentage_discount: bool,
    pub stock_quantity: i32,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub knife_type: String,
    pub blade_length: f64,
    pub color: Option<String>,
    pub blade_material: String,
    pub handle_material: String,
    pub knife_sizes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Knife> for KnifeResponse {
    fn from(k: Knife) -> Self {
        KnifeResponse {
            id: k.id,
            name: k.name,
            category_id: k.category_id,
            category_name: k.category_name,
            description: k.description,
            price: k.price,
            discount_price: k.discount_price,
            percentage_discount: k.percentage_discount,
            stock_quantity: k.stock_quantity,
            tags: k.tags,
            image_url: k.image_url,
            knife_type: k.knife_type,
            blade_length: k.blade_length,
            color: k.color,
            blade_material: k.blade_material,
            handle_material: k.handle_material,
            knife_sizes: k.knife_sizes,
            created_at: k.created_at,
            updated_at: k.updated_at,
        }
    }
}

/// Body for both create and full update. `imageBase64` is optional on update.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KnifeRequest {
    #[validate(length(min = 2, max = 100, message = "Product name must be between 2 and 100 characters"))]
    pub name: String,
    #[validate(range(min = 1, message = "Category ID must be positive"))]
    pub category_id: i32,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Description must not exceed 1000 characters"))]
    pub description: String,
    #[schema(value_type = String, example = "1499.90")]
    #[validate(custom(function = "positive_amount"))]
    pub price: BigDecimal,
    #[serde(default)]
    #[schema(value_type = String, example = "0")]
    #[validate(custom(function = "non_negative_amount"))]
    pub discount_price: BigDecimal,
    #[serde(default)]
    pub percentage_discount: bool,
    #[serde(default)]
    #[validate(range(min = 0, message = "Stock quantity cannot be negative"))]
    pub stock_quantity: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(length(min = 1, message = "Knife type is required"))]
    pub knife_type: String,
    #[validate(range(exclusive_min = 0.0, message = "Blade length must be positive"))]
    pub blade_length: f64,
    pub color: Option<String>,
    #[validate(length(min = 1, message = "Blade material is required"))]
    pub blade_material: String,
    #[validate(length(min = 1, message = "Handle material is required"))]
    pub handle_material: String,
    #[validate(length(min = 1, message = "At least one knife size is required"))]
    pub knife_sizes: Vec<String>,
    /// Raw base64 or a `data:image/...;base64,` URI.
    pub image_base64: Option<String>,
}

impl KnifeRequest {
    /// Trims the text fields so length rules apply to what gets stored.
    fn trimmed(mut self) -> Self {
        for field in [
            &mut self.name,
            &mut self.knife_type,
            &mut self.blade_material,
            &mut self.handle_material,
        ] {
            *field = field.trim().to_string();
        }
        self
    }

    fn into_parts(self) -> (KnifeDraft, Option<String>) {
        let image = self.image_base64.filter(|s| !s.trim().is_empty());
        let draft = KnifeDraft {
            name: self.name,
            category_id: self.category_id,
            category_name: None,
            description: self.description,
            price: self.price,
            discount_price: self.discount_price,
            percentage_discount: self.percentage_discount,
            stock_quantity: self.stock_quantity,
            tags: self.tags,
            image_url: None,
            knife_type: self.knife_type,
            blade_length: self.blade_length,
            color: self.color,
            blade_material: self.blade_material,
            handle_material: self.handle_material,
            knife_sizes: self.knife_sizes,
        };
        (draft, image)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct KnifeQuery {
    /// Case-insensitive part of the name.
    pub search_term: Option<String>,
    pub category_id: Option<i32>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub knife_type: Option<String>,
    pub blade_material: Option<String>,
    /// `asc` (default) or `desc`, by price.
    pub sort_direction: Option<String>,
    /// 1-based, default 1.
    pub page: Option<i64>,
    /// Default 20, at most 100.
    pub size: Option<i64>,
}

impl KnifeQuery {
    fn into_filter(self) -> Result<(KnifeFilter, PageRequest), AppError> {
        let filter = KnifeFilter {
            min_price: parse_decimal("minPrice", self.min_price.as_deref())?,
            max_price: parse_decimal("maxPrice", self.max_price.as_deref())?,
            sort: SortDirection::parse_price_sort(self.sort_direction.as_deref()),
            search_term: self.search_term,
            category_id: self.category_id,
            knife_type: self.knife_type,
            blade_material: self.blade_material,
        };
        let page = PageRequest::new(
            self.page.unwrap_or(1),
            self.size.unwrap_or(DEFAULT_PAGE_SIZE),
        );
        Ok((filter, page))
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CountQuery {
    pub category_id: i32,
}

async fn upload_image(state: &AppState, image: Option<String>) -> Result<Option<String>, AppError> {
    match image {
        Some(image) => Ok(Some(state.images.upload(&image).await?)),
        None => Ok(None),
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/knives
#[utoipa::path(
    get,
    path = "/api/knives",
    params(KnifeQuery),
    responses(
        (status = 200, description = "One page of knives", body = PageResponse<KnifeResponse>),
        (status = 400, description = "Malformed price filter"),
    ),
    tag = "knives"
)]
pub async fn search_knives(
    state: web::Data<AppState>,
    query: web::Query<KnifeQuery>,
) -> Result<HttpResponse, AppError> {
    let (filter, page) = query.into_inner().into_filter()?;
    let knives = state.knives.clone();
    let result = run_blocking(move || knives.search(&filter, page)).await?;
    Ok(HttpResponse::Ok().json(PageResponse::from_page(result, KnifeResponse::from)))
}

/// GET /api/knives/{id}
#[utoipa::path(
    get,
    path = "/api/knives/{id}",
    params(("id" = Uuid, Path, description = "Knife UUID")),
    responses(
        (status = 200, description = "Knife found", body = KnifeResponse),
        (status = 404, description = "Knife not found"),
    ),
    tag = "knives"
)]
pub async fn get_knife(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let knives = state.knives.clone();
    let knife = run_blocking(move || knives.get(id)).await?;
    Ok(HttpResponse::Ok().json(KnifeResponse::from(knife)))
}

/// GET /api/knives/name/{name}
#[utoipa::path(
    get,
    path = "/api/knives/name/{name}",
    params(("name" = String, Path, description = "Exact knife name")),
    responses(
        (status = 200, description = "Knife found", body = KnifeResponse),
        (status = 404, description = "Knife not found"),
    ),
    tag = "knives"
)]
pub async fn get_knife_by_name(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let name = path.into_inner();
    let knives = state.knives.clone();
    let knife = run_blocking(move || knives.get_by_name(&name)).await?;
    Ok(HttpResponse::Ok().json(KnifeResponse::from(knife)))
}

/// GET /api/knives/types
#[utoipa::path(
    get,
    path = "/api/knives/types",
    responses((status = 200, description = "Distinct knife types", body = Vec<String>)),
    tag = "knives"
)]
pub async fn knife_types(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let knives = state.knives.clone();
    let types = run_blocking(move || knives.knife_types()).await?;
    Ok(HttpResponse::Ok().json(types))
}

/// GET /api/knives/count?categoryId=
#[utoipa::path(
    get,
    path = "/api/knives/count",
    params(CountQuery),
    responses((status = 200, description = "Knives in the category", body = i64)),
    tag = "knives"
)]
pub async fn count_knives(
    state: web::Data<AppState>,
    query: web::Query<CountQuery>,
) -> Result<HttpResponse, AppError> {
    let category_id = query.into_inner().category_id;
    let knives = state.knives.clone();
    let count = run_blocking(move || knives.count_by_category(category_id)).await?;
    Ok(HttpResponse::Ok().json(count))
}

/// POST /api/knives
///
/// The image, when given, is uploaded once the knife has passed every check
/// and before it is stored.
#[utoipa::path(
    post,
    path = "/api/knives",
    request_body = KnifeRequest,
    responses(
        (status = 201, description = "Knife created", body = KnifeResponse),
        (status = 400, description = "Invalid knife or image"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not an admin"),
        (status = 409, description = "Name already in use"),
    ),
    security(("bearer_auth" = [])),
    tag = "knives"
)]
pub async fn create_knife(
    _admin: AdminUser,
    state: web::Data<AppState>,
    body: web::Json<KnifeRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner().trimmed();
    body.validate()?;
    let (draft, image) = body.into_parts();
    let knives = state.knives.clone();
    let draft = run_blocking(move || knives.prepare(None, draft)).await?;
    let image_url = upload_image(&state, image).await?;

    let knives = state.knives.clone();
    let knife = run_blocking(move || knives.add(draft, image_url)).await?;
    Ok(HttpResponse::Created().json(KnifeResponse::from(knife)))
}

/// PUT /api/knives/{id}
#[utoipa::path(
    put,
    path = "/api/knives/{id}",
    params(("id" = Uuid, Path, description = "Knife UUID")),
    request_body = KnifeRequest,
    responses(
        (status = 200, description = "Knife updated", body = KnifeResponse),
        (status = 400, description = "Invalid knife or image"),
        (status = 404, description = "Knife not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "knives"
)]
pub async fn update_knife(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<KnifeRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner().trimmed();
    body.validate()?;
    let (draft, image) = body.into_parts();
    let knives = state.knives.clone();
    let draft = run_blocking(move || knives.prepare(Some(id), draft)).await?;
    let image_url = upload_image(&state, image).await?;

    let knives = state.knives.clone();
    let knife = run_blocking(move || knives.update(id, draft, image_url)).await?;
    Ok(HttpResponse::Ok().json(KnifeResponse::from(knife)))
}

/// DELETE /api/knives/{id}
#[utoipa::path(
    delete,
    path = "/api/knives/{id}",
    params(("id" = Uuid, Path, description = "Knife UUID")),
    responses(
        (status = 204, description = "Knife deleted"),
        (status = 404, description = "Knife not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "knives"
)]
pub async fn delete_knife(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let knives = state.knives.clone();
    run_blocking(move || knives.delete(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
