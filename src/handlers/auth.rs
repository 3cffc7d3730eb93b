use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::admin::Principal;
use crate::errors::AppError;

use super::{run_blocking, ApiResponse, AppState};

/// An authenticated caller holding the ADMIN role.
///
/// Missing or invalid tokens are rejected with 401, other roles with 403.
#[derive(Debug)]
pub struct AdminUser(pub Principal);

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authorize(req))
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn authorize(req: &HttpRequest) -> Result<AdminUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state is not registered".to_string()))?;
    let token = bearer_token(req)
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
    let principal = state.auth.authenticate(token)?;
    if !principal.is_admin() {
        log::warn!(
            "User {} with role {} denied access to {}",
            principal.username,
            principal.role,
            req.path()
        );
        return Err(AppError::Forbidden);
    }
    Ok(AdminUser(principal))
}

// ── DTOs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenValidity {
    pub valid: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid credentials or disabled account"),
    ),
    tag = "auth"
)]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    body.validate()?;

    let auth = state.auth.clone();
    let session = run_blocking(move || auth.login(&body.username, &body.password)).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::with_message(
        "Login successful",
        LoginResponse {
            token: session.token,
            username: session.username,
            role: session.role,
        },
    )))
}

/// POST /api/auth/validate
///
/// Always answers 200; the body says whether the bearer token is usable.
#[utoipa::path(
    post,
    path = "/api/auth/validate",
    responses(
        (status = 200, description = "Validation result", body = ApiResponse<TokenValidity>),
    ),
    tag = "auth"
)]
pub async fn validate(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let valid = bearer_token(&req)
        .map(|token| state.auth.validate(token))
        .unwrap_or(false);
    HttpResponse::Ok().json(ApiResponse::ok(TokenValidity { valid }))
}

/// GET /api/auth/health
#[utoipa::path(
    get,
    path = "/api/auth/health",
    responses(
        (status = 200, description = "Service is up", body = ApiResponse<HealthStatus>),
    ),
    tag = "auth"
)]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::with_message(
        "Auth service is running",
        HealthStatus {
            status: "ok".to_string(),
        },
    ))
}
