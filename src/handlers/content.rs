use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::domain::content::{ContentKey, ContentUpdate, CorporateContent};
use crate::errors::AppError;

use super::auth::AdminUser;
use super::{run_blocking, AppState};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentResponse {
    pub id: Uuid,
    /// One of SHIPPING_DELIVERY, RETURN_EXCHANGE, WARRANTY_CONDITIONS, FAQ,
    /// MAINTENANCE_GUIDE, ALL_PRODUCTS_INFO, ABOUT_US, CONTACT_INFO, TERMS,
    /// PRIVACY, COOKIES, SOCIAL_LINKS, SHIPPING_CONFIG.
    pub content_key: String,
    pub title: String,
    pub content: String,
    pub language: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CorporateContent> for ContentResponse {
    fn from(c: CorporateContent) -> Self {
        ContentResponse {
            id: c.id,
            content_key: c.key.to_string(),
            title: c.title,
            content: c.content,
            language: c.language,
            active: c.active,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

fn active_by_default() -> bool {
    true
}

fn content_key(raw: &str) -> Result<ContentKey, AppError> {
    Ok(raw.trim().to_uppercase().parse::<ContentKey>()?)
}

fn responses(entries: Vec<CorporateContent>) -> Vec<ContentResponse> {
    entries.into_iter().map(ContentResponse::from).collect()
}

/// GET /api/content/public/all
#[utoipa::path(
    get,
    path = "/api/content/public/all",
    responses((status = 200, description = "Active content entries", body = Vec<ContentResponse>)),
    tag = "content"
)]
pub async fn public_contents(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let content = state.content.clone();
    let entries = run_blocking(move || content.public_all()).await?;
    Ok(HttpResponse::Ok().json(responses(entries)))
}

/// GET /api/content/public/{key}
#[utoipa::path(
    get,
    path = "/api/content/public/{key}",
    params(("key" = String, Path, description = "Content key, e.g. ABOUT_US")),
    responses(
        (status = 200, description = "Active content entry", body = ContentResponse),
        (status = 400, description = "Unknown content key"),
        (status = 404, description = "Missing or inactive"),
    ),
    tag = "content"
)]
pub async fn public_content(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let key = content_key(&path.into_inner())?;
    let content = state.content.clone();
    let entry = run_blocking(move || content.public(key)).await?;
    Ok(HttpResponse::Ok().json(ContentResponse::from(entry)))
}

/// GET /api/content/admin/all
#[utoipa::path(
    get,
    path = "/api/content/admin/all",
    responses((status = 200, description = "Every content entry", body = Vec<ContentResponse>)),
    security(("bearer_auth" = [])),
    tag = "content"
)]
pub async fn admin_contents(
    _admin: AdminUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let content = state.content.clone();
    let entries = run_blocking(move || content.admin_all()).await?;
    Ok(HttpResponse::Ok().json(responses(entries)))
}

/// PUT /api/content/admin/{key}
///
/// Creates the entry on first save, replaces it afterwards.
#[utoipa::path(
    put,
    path = "/api/content/admin/{key}",
    params(("key" = String, Path, description = "Content key, e.g. ABOUT_US")),
    request_body = ContentRequest,
    responses(
        (status = 200, description = "Entry saved", body = ContentResponse),
        (status = 400, description = "Unknown key or invalid body"),
    ),
    security(("bearer_auth" = [])),
    tag = "content"
)]
pub async fn upsert_content(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ContentRequest>,
) -> Result<HttpResponse, AppError> {
    let key = content_key(&path.into_inner())?;
    let body = body.into_inner();
    body.validate()?;
    let update = ContentUpdate {
        title: body.title,
        content: body.content,
        active: body.active,
    };
    let content = state.content.clone();
    let saved = run_blocking(move || content.upsert(key, update)).await?;
    Ok(HttpResponse::Ok().json(ContentResponse::from(saved)))
}
