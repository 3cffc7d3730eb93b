pub mod admin_stats;
pub mod auth;
pub mod categories;
pub mod content;
pub mod knives;
pub mod orders;
pub mod social_proof;
pub mod stock;

use std::borrow::Cow;
use std::str::FromStr;
use std::sync::Arc;

use actix_web::error::JsonPayloadError;
use actix_web::web;
use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidationError;

use crate::application::auth_service::AuthService;
use crate::application::category_service::CategoryService;
use crate::application::content_service::ContentService;
use crate::application::knife_service::KnifeService;
use crate::application::order_service::OrderService;
use crate::domain::errors::DomainError;
use crate::domain::pagination::Page;
use crate::domain::ports::ImageStore;
use crate::errors::AppError;

/// Services shared by every worker.
#[derive(Clone)]
pub struct AppState {
    pub knives: Arc<KnifeService>,
    pub categories: Arc<CategoryService>,
    pub orders: Arc<OrderService>,
    pub content: Arc<ContentService>,
    pub auth: Arc<AuthService>,
    pub images: Arc<dyn ImageStore>,
}

/// Runs synchronous service code on the blocking thread pool.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    Ok(web::block(f)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??)
}

// ── Shared DTOs ──────────────────────────────────────────────────────────────

/// Envelope used by the auth and social-proof endpoints.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            data,
        }
    }
}

/// One page of results. `page` is 1-based.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    pub number_of_elements: usize,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> PageResponse<T> {
    pub fn from_page<U>(page: Page<U>, f: impl FnMut(U) -> T) -> Self {
        let total_pages = page.total_pages();
        let first = page.is_first();
        let last = page.is_last();
        let page = page.map(f);
        Self {
            number_of_elements: page.items.len(),
            empty: page.items.is_empty(),
            content: page.items,
            page: page.page,
            size: page.size,
            total_elements: page.total,
            total_pages,
            first,
            last,
        }
    }
}

// ── Query parsing helpers ────────────────────────────────────────────────────

pub(crate) fn parse_decimal(field: &str, raw: Option<&str>) -> Result<Option<BigDecimal>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => BigDecimal::from_str(s)
            .map(Some)
            .map_err(|_| AppError::InvalidArgument(format!("Invalid {}: {}", field, s))),
        None => Ok(None),
    }
}

/// Dates are `YYYY-MM-DD`.
pub(crate) fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                AppError::InvalidArgument(format!("Invalid {}: {} (expected YYYY-MM-DD)", field, s))
            }),
        None => Ok(None),
    }
}

pub(crate) fn positive_amount(value: &BigDecimal) -> Result<(), ValidationError> {
    if *value > BigDecimal::zero() {
        Ok(())
    } else {
        Err(ValidationError::new("range").with_message(Cow::from("must be greater than 0")))
    }
}

pub(crate) fn non_negative_amount(value: &BigDecimal) -> Result<(), ValidationError> {
    if *value >= BigDecimal::zero() {
        Ok(())
    } else {
        Err(ValidationError::new("range").with_message(Cow::from("must be zero or positive")))
    }
}

// ── Routing ──────────────────────────────────────────────────────────────────

/// Literal segments are registered before `{id}` so they are not captured by it.
/// Large enough for a base64-encoded image at the 5 MB upload cap.
pub const MAX_JSON_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Extractor failures answer with the same JSON error body as the handlers.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_JSON_BODY_BYTES)
        .error_handler(|err, req| {
            log::info!("Rejected JSON body for {}: {}", req.path(), err);
            let app_err = match err {
                JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
                    AppError::InvalidArgument(format!(
                        "Request body is larger than {} bytes",
                        MAX_JSON_BODY_BYTES
                    ))
                }
                JsonPayloadError::ContentType => {
                    AppError::InvalidArgument("Content type must be application/json".to_string())
                }
                other => AppError::InvalidArgument(format!("Malformed JSON body: {}", other)),
            };
            app_err.into()
        })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::InvalidArgument(format!("Invalid query parameters: {}", err)).into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        AppError::InvalidArgument(format!("Invalid path parameter: {}", err)).into()
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config());
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .route("/login", web::post().to(auth::login))
                    .route("/validate", web::post().to(auth::validate))
                    .route("/health", web::get().to(auth::health)),
            )
            .service(
                web::scope("/knives")
                    .route("", web::get().to(knives::search_knives))
                    .route("", web::post().to(knives::create_knife))
                    .route("/types", web::get().to(knives::knife_types))
                    .route("/count", web::get().to(knives::count_knives))
                    .route("/name/{name}", web::get().to(knives::get_knife_by_name))
                    .route("/{id}", web::get().to(knives::get_knife))
                    .route("/{id}", web::put().to(knives::update_knife))
                    .route("/{id}", web::delete().to(knives::delete_knife)),
            )
            .service(
                web::scope("/categories")
                    .route("", web::get().to(categories::list_categories))
                    .route("", web::post().to(categories::create_category))
                    .route("/active", web::get().to(categories::list_active_categories))
                    .route("/with-counts", web::get().to(categories::categories_with_counts))
                    .route("/reorder", web::put().to(categories::reorder_categories))
                    .route("/{id}", web::get().to(categories::get_category))
                    .route("/{id}", web::put().to(categories::update_category))
                    .route("/{id}", web::delete().to(categories::delete_category))
                    .route(
                        "/{id}/toggle-active",
                        web::patch().to(categories::toggle_category),
                    ),
            )
            .service(
                web::scope("/stock")
                    .route("/check-batch", web::post().to(stock::check_batch))
                    .route("/check/{knife_id}", web::get().to(stock::check_stock)),
            )
            .service(
                web::scope("/orders")
                    .route("", web::post().to(orders::create_order))
                    .route("", web::get().to(orders::list_orders))
                    .route("/status/all", web::get().to(orders::order_statuses))
                    .route("/status/{code}", web::get().to(orders::orders_by_status))
                    .route("/search", web::get().to(orders::search_orders))
                    .route("/statistics", web::get().to(orders::order_statistics))
                    .route(
                        "/migrate-order-numbers",
                        web::post().to(orders::migrate_order_numbers),
                    )
                    .route("/{id}", web::get().to(orders::get_order))
                    .route("/{id}", web::put().to(orders::update_order))
                    .route("/{id}", web::delete().to(orders::delete_order)),
            )
            .route(
                "/social-proof/recent-purchases",
                web::get().to(social_proof::recent_purchases),
            )
            .service(
                web::scope("/content")
                    .route("/public/all", web::get().to(content::public_contents))
                    .route("/public/{key}", web::get().to(content::public_content))
                    .route("/admin/all", web::get().to(content::admin_contents))
                    .route("/admin/{key}", web::put().to(content::upsert_content)),
            )
            .route(
                "/admin/stats/category-product-counts",
                web::get().to(admin_stats::category_product_counts),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pagination::PageRequest;
    use crate::testing::Fakes;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::Value;

    #[::core::prelude::v1::test]
    fn page_response_reports_navigation_flags() {
        let page = Page::new(vec![1, 2], PageRequest::new(2, 2), 5);
        let response = PageResponse::from_page(page, |n| n * 10);

        assert_eq!(response.content, vec![10, 20]);
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.number_of_elements, 2);
        assert!(!response.first);
        assert!(!response.last);
        assert!(!response.empty);
    }

    #[::core::prelude::v1::test]
    fn query_helpers_reject_malformed_values() {
        assert!(parse_decimal("minTotal", Some("abc")).is_err());
        assert_eq!(parse_decimal("minTotal", Some(" ")).expect("blank is ignored"), None);
        assert!(parse_date("startDate", Some("15/01/2025")).is_err());
        assert_eq!(
            parse_date("startDate", Some("2025-01-15")).expect("valid date"),
            NaiveDate::from_ymd_opt(2025, 1, 15)
        );
    }

    #[actix_web::test]
    async fn malformed_path_and_huge_page_answer_cleanly() {
        let fakes = Fakes::new();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fakes.state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/knives/not-a-uuid").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "INVALID_ARGUMENT");

        let req = test::TestRequest::get()
            .uri(&format!("/api/knives?page={}", i64::MAX))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["empty"], true);
    }
}
