use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::category::{Category, CategoryCount, CategoryDraft, CategoryPatch};
use crate::errors::AppError;

use super::auth::AdminUser;
use super::{run_blocking, AppState};

// ── DTOs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        CategoryResponse {
            id: c.id,
            name: c.name,
            description: c.description,
            icon: c.icon,
            display_order: c.display_order,
            is_active: c.is_active,
        }
    }
}

/// Body for create and update. On update only `name` is always replaced.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 100, message = "Category name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,
    pub icon: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl CategoryRequest {
    fn trimmed(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }
}

impl From<CategoryRequest> for CategoryDraft {
    fn from(r: CategoryRequest) -> Self {
        CategoryDraft {
            name: r.name,
            description: r.description,
            icon: r.icon,
            display_order: r.display_order,
            is_active: r.is_active,
        }
    }
}

impl From<CategoryRequest> for CategoryPatch {
    fn from(r: CategoryRequest) -> Self {
        CategoryPatch {
            name: r.name,
            description: r.description,
            icon: r.icon,
            display_order: r.display_order,
            is_active: r.is_active,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub category_ids: Vec<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCountResponse {
    pub category_id: i32,
    pub category_name: String,
    pub product_count: i64,
}

impl From<CategoryCount> for CategoryCountResponse {
    fn from(c: CategoryCount) -> Self {
        CategoryCountResponse {
            category_id: c.category_id,
            category_name: c.category_name,
            product_count: c.product_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoriesWithCounts {
    pub categories: Vec<CategoryCountResponse>,
    pub total_categories: usize,
}

fn responses(categories: Vec<Category>) -> Vec<CategoryResponse> {
    categories.into_iter().map(CategoryResponse::from).collect()
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/categories
#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, description = "All categories by display order", body = Vec<CategoryResponse>)),
    tag = "categories"
)]
pub async fn list_categories(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let categories = state.categories.clone();
    let all = run_blocking(move || categories.list_all()).await?;
    Ok(HttpResponse::Ok().json(responses(all)))
}

/// GET /api/categories/active
#[utoipa::path(
    get,
    path = "/api/categories/active",
    responses((status = 200, description = "Active categories by display order", body = Vec<CategoryResponse>)),
    tag = "categories"
)]
pub async fn list_active_categories(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let categories = state.categories.clone();
    let active = run_blocking(move || categories.list_active()).await?;
    Ok(HttpResponse::Ok().json(responses(active)))
}

/// GET /api/categories/with-counts
#[utoipa::path(
    get,
    path = "/api/categories/with-counts",
    responses((status = 200, description = "Categories with their knife counts", body = CategoriesWithCounts)),
    tag = "categories"
)]
pub async fn categories_with_counts(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let categories = state.categories.clone();
    let counts = run_blocking(move || categories.product_counts()).await?;
    Ok(HttpResponse::Ok().json(CategoriesWithCounts {
        total_categories: counts.len(),
        categories: counts.into_iter().map(CategoryCountResponse::from).collect(),
    }))
}

/// GET /api/categories/{id}
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category found", body = CategoryResponse),
        (status = 404, description = "Category not found"),
    ),
    tag = "categories"
)]
pub async fn get_category(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let categories = state.categories.clone();
    let category = run_blocking(move || categories.get(id)).await?;
    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}

/// POST /api/categories
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid category"),
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn create_category(
    _admin: AdminUser,
    state: web::Data<AppState>,
    body: web::Json<CategoryRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner().trimmed();
    body.validate()?;
    let categories = state.categories.clone();
    let category = run_blocking(move || categories.add(body.into())).await?;
    Ok(HttpResponse::Created().json(CategoryResponse::from(category)))
}

/// PUT /api/categories/{id}
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn update_category(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<i32>,
    body: web::Json<CategoryRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let body = body.into_inner().trimmed();
    body.validate()?;
    let categories = state.categories.clone();
    let category = run_blocking(move || categories.update(id, body.into())).await?;
    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}

/// PATCH /api/categories/{id}/toggle-active
#[utoipa::path(
    patch,
    path = "/api/categories/{id}/toggle-active",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Active flag flipped", body = CategoryResponse),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn toggle_category(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let categories = state.categories.clone();
    let category = run_blocking(move || categories.toggle_active(id)).await?;
    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}

/// PUT /api/categories/reorder
#[utoipa::path(
    put,
    path = "/api/categories/reorder",
    request_body = ReorderRequest,
    responses((status = 200, description = "Categories in their new order", body = Vec<CategoryResponse>)),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn reorder_categories(
    _admin: AdminUser,
    state: web::Data<AppState>,
    body: web::Json<ReorderRequest>,
) -> Result<HttpResponse, AppError> {
    let ids = body.into_inner().category_ids;
    let categories = state.categories.clone();
    let sorted = run_blocking(move || categories.reorder(&ids)).await?;
    Ok(HttpResponse::Ok().json(responses(sorted)))
}

/// DELETE /api/categories/{id}
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn delete_category(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let categories = state.categories.clone();
    run_blocking(move || categories.delete(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
