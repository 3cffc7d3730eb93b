use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::application::order_service::MigrationReport;
use crate::domain::order::{
    Address, BasketItem, Buyer, Checkout, Order, OrderItem, OrderSearch, OrderStatistics,
    ProductStatistics,
};
use crate::domain::order_status::OrderStatus;
use crate::domain::pagination::{PageRequest, DEFAULT_PAGE_SIZE};
use crate::errors::AppError;

use super::auth::AdminUser;
use super::{parse_date, parse_decimal, run_blocking, AppState, PageResponse};

// ── Checkout request ─────────────────────────────────────────────────────────
//
// Mirrors the payment gateway's checkout payload. Fields the shop does not
// use (locale, currency, installments, ...) are accepted and ignored.

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuyerRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub gsm_number: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BasketItemRequest {
    /// Knife UUID.
    pub id: String,
    /// Defaults to 1.
    pub quantity: Option<i32>,
    pub selected_size: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub conversation_id: String,
    /// Decimal total as a string, e.g. "1499.90".
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub payment_id: String,
    pub buyer: Option<BuyerRequest>,
    pub shipping_address: Option<AddressRequest>,
    pub billing_address: Option<AddressRequest>,
    #[serde(default)]
    pub basket_items: Vec<BasketItemRequest>,
}

impl From<AddressRequest> for Address {
    fn from(a: AddressRequest) -> Self {
        Address {
            address: a.address,
            city: a.city,
        }
    }
}

impl From<CheckoutRequest> for Checkout {
    fn from(r: CheckoutRequest) -> Self {
        Checkout {
            conversation_id: r.conversation_id,
            price: r.price,
            payment_id: r.payment_id,
            buyer: r.buyer.map(|b| Buyer {
                name: b.name,
                surname: b.surname,
                email: b.email,
                gsm_number: b.gsm_number,
            }),
            shipping_address: r.shipping_address.map(Address::from),
            billing_address: r.billing_address.map(Address::from),
            basket_items: r
                .basket_items
                .into_iter()
                .map(|item| BasketItem {
                    knife_id: item.id,
                    quantity: item.quantity.unwrap_or(1),
                    selected_size: item.selected_size.filter(|s| !s.trim().is_empty()),
                    note: item.note,
                })
                .collect(),
        }
    }
}

// ── Order responses ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusResponse {
    pub order_status_code: i32,
    pub order_status_text: String,
}

impl From<OrderStatus> for OrderStatusResponse {
    fn from(s: OrderStatus) -> Self {
        OrderStatusResponse {
            order_status_code: s.code,
            order_status_text: s.text,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub knife_id: Uuid,
    pub name: String,
    pub category_id: i32,
    pub category_name: Option<String>,
    pub description: String,
    #[schema(value_type = String)]
    pub price: BigDecimal,
    #[schema(value_type = String)]
    pub discount_price: BigDecimal,
    pub quantity: i32,
    pub image_url: Option<String>,
    pub knife_type: String,
    pub blade_length: f64,
    pub blade_material: String,
    pub handle_material: String,
    pub color: Option<String>,
    pub selected_size: Option<String>,
    pub customer_note: Option<String>,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(i: OrderItem) -> Self {
        OrderItemResponse {
            id: i.id,
            knife_id: i.knife_id,
            name: i.name,
            category_id: i.category_id,
            category_name: i.category_name,
            description: i.description,
            price: i.price,
            discount_price: i.discount_price,
            quantity: i.quantity,
            image_url: i.image_url,
            knife_type: i.knife_type,
            blade_length: i.blade_length,
            blade_material: i.blade_material,
            handle_material: i.handle_material,
            color: i.color,
            selected_size: i.selected_size,
            customer_note: i.customer_note,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub order_date: NaiveDate,
    pub conversation_id: String,
    pub payment_id: String,
    pub order_status: OrderStatusResponse,
    pub shipping_address: String,
    pub shipping_city: String,
    pub billing_address: String,
    #[schema(value_type = String, example = "1499.90")]
    pub total_amount: BigDecimal,
    pub items: Vec<OrderItemResponse>,
    pub history: String,
    pub user_name: String,
    pub user_surname: String,
    pub email: String,
    pub phone_number: String,
    pub admin_note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            id: o.id,
            order_number: o.order_number,
            order_date: o.order_date,
            conversation_id: o.conversation_id,
            payment_id: o.payment_id,
            order_status: OrderStatusResponse {
                order_status_code: o.status_code,
                order_status_text: o.status_text,
            },
            shipping_address: o.shipping_address,
            shipping_city: o.shipping_city,
            billing_address: o.billing_address,
            total_amount: o.total_amount,
            items: o.items.into_iter().map(OrderItemResponse::from).collect(),
            history: o.history,
            user_name: o.user_name,
            user_surname: o.user_surname,
            email: o.email,
            phone_number: o.phone_number,
            admin_note: o.admin_note,
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }
}

fn responses(orders: Vec<Order>) -> Vec<OrderResponse> {
    orders.into_iter().map(OrderResponse::from).collect()
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductStatisticsResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub order_count: i64,
    #[schema(value_type = String)]
    pub revenue: BigDecimal,
    pub total_quantity: i64,
}

impl From<ProductStatistics> for ProductStatisticsResponse {
    fn from(p: ProductStatistics) -> Self {
        ProductStatisticsResponse {
            product_id: p.product_id,
            product_name: p.product_name,
            order_count: p.order_count,
            revenue: p.revenue,
            total_quantity: p.total_quantity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub completed_orders: i64,
    pub cancelled_orders: i64,
    #[schema(value_type = String)]
    pub total_revenue: BigDecimal,
    #[schema(value_type = String)]
    pub average_order_value: BigDecimal,
    #[schema(value_type = String)]
    pub pending_revenue: BigDecimal,
    pub orders_by_date: BTreeMap<String, i64>,
    #[schema(value_type = BTreeMap<String, String>)]
    pub revenue_by_date: BTreeMap<String, BigDecimal>,
    pub orders_by_status: BTreeMap<String, i64>,
    pub top_products: Vec<ProductStatisticsResponse>,
    pub growth_rate: f64,
    pub orders_last_period: i64,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub days_covered: i64,
}

impl From<OrderStatistics> for StatisticsResponse {
    fn from(s: OrderStatistics) -> Self {
        StatisticsResponse {
            total_orders: s.total_orders,
            pending_orders: s.pending_orders,
            completed_orders: s.completed_orders,
            cancelled_orders: s.cancelled_orders,
            total_revenue: s.total_revenue,
            average_order_value: s.average_order_value,
            pending_revenue: s.pending_revenue,
            orders_by_date: s.orders_by_date,
            revenue_by_date: s.revenue_by_date,
            orders_by_status: s.orders_by_status,
            top_products: s
                .top_products
                .into_iter()
                .map(ProductStatisticsResponse::from)
                .collect(),
            growth_rate: s.growth_rate,
            orders_last_period: s.orders_last_period,
            period_start: s.period_start,
            period_end: s.period_end,
            days_covered: s.days_covered,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResponse {
    pub success: bool,
    pub processed: usize,
    pub updated: usize,
    pub error_count: usize,
    pub errors: Vec<String>,
}

impl From<MigrationReport> for MigrationResponse {
    fn from(r: MigrationReport) -> Self {
        MigrationResponse {
            success: r.error_count == 0,
            processed: r.processed,
            updated: r.updated,
            error_count: r.error_count,
            errors: r.errors,
        }
    }
}

// ── Query parameters ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UpdateOrderQuery {
    pub order_status_code: i32,
    /// Replaces the history when present.
    pub history: Option<String>,
    /// Replaces the admin note when non-empty.
    pub admin_note: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderSearchQuery {
    /// Whitespace-separated terms; each must match name, surname, e-mail,
    /// phone, order number or the order id.
    pub search_term: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    /// `YYYY-MM-DD`, inclusive.
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`, inclusive.
    pub end_date: Option<String>,
    /// 1 sorts oldest first (default), anything else newest first.
    pub sort_direction: Option<i32>,
    pub status: Option<String>,
    pub payment_id: Option<String>,
    pub conversation_id: Option<String>,
    pub shipping_city: Option<String>,
    pub admin_note: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl OrderSearchQuery {
    fn into_criteria(self) -> Result<(OrderSearch, PageRequest), AppError> {
        let status_code = match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => match raw.parse::<i32>() {
                Ok(code) => Some(code),
                Err(_) => {
                    log::warn!("Ignoring non-numeric order status filter: {}", raw);
                    None
                }
            },
            None => None,
        };
        let criteria = OrderSearch {
            min_total: parse_decimal("minPrice", self.min_price.as_deref())?,
            max_total: parse_decimal("maxPrice", self.max_price.as_deref())?,
            start_date: parse_date("startDate", self.start_date.as_deref())?,
            end_date: parse_date("endDate", self.end_date.as_deref())?,
            ascending: self.sort_direction.unwrap_or(1) == 1,
            search_term: self.search_term,
            status_code,
            payment_id: self.payment_id,
            conversation_id: self.conversation_id,
            shipping_city: self.shipping_city,
            admin_note: self.admin_note,
        };
        let page = PageRequest::new(
            self.page.unwrap_or(1),
            self.size.unwrap_or(DEFAULT_PAGE_SIZE),
        );
        Ok((criteria, page))
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PeriodQuery {
    /// `YYYY-MM-DD`, inclusive.
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`, inclusive.
    pub end_date: Option<String>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/orders
///
/// Reserves stock for every basket item, then stores the order, its items
/// and an `OrderCreated` outbox event in one transaction.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Missing buyer, bad price, size or quantity"),
        (status = 404, description = "A basket item names an unknown knife"),
        (status = 409, description = "Insufficient stock"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let checkout = Checkout::from(body.into_inner());
    let orders = state.orders.clone();
    let order = run_blocking(move || orders.create(checkout)).await?;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /api/orders
#[utoipa::path(
    get,
    path = "/api/orders",
    responses((status = 200, description = "Every order, newest first", body = Vec<OrderResponse>)),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    _admin: AdminUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let orders = state.orders.clone();
    let all = run_blocking(move || orders.list_all()).await?;
    Ok(HttpResponse::Ok().json(responses(all)))
}

/// GET /api/orders/status/all
#[utoipa::path(
    get,
    path = "/api/orders/status/all",
    responses((status = 200, description = "The order status table", body = Vec<OrderStatusResponse>)),
    tag = "orders"
)]
pub async fn order_statuses(state: web::Data<AppState>) -> HttpResponse {
    let statuses: Vec<OrderStatusResponse> = state
        .orders
        .statuses()
        .into_iter()
        .map(OrderStatusResponse::from)
        .collect();
    HttpResponse::Ok().json(statuses)
}

/// GET /api/orders/status/{code}
#[utoipa::path(
    get,
    path = "/api/orders/status/{code}",
    params(("code" = i32, Path, description = "Order status code")),
    responses((status = 200, description = "Orders with the status, newest first", body = Vec<OrderResponse>)),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn orders_by_status(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let code = path.into_inner();
    let orders = state.orders.clone();
    let found = run_blocking(move || orders.by_status(code)).await?;
    Ok(HttpResponse::Ok().json(responses(found)))
}

/// GET /api/orders/search
#[utoipa::path(
    get,
    path = "/api/orders/search",
    params(OrderSearchQuery),
    responses(
        (status = 200, description = "One page of matching orders", body = PageResponse<OrderResponse>),
        (status = 400, description = "Malformed price or date filter"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn search_orders(
    _admin: AdminUser,
    state: web::Data<AppState>,
    query: web::Query<OrderSearchQuery>,
) -> Result<HttpResponse, AppError> {
    let (criteria, page) = query.into_inner().into_criteria()?;
    let orders = state.orders.clone();
    let result = run_blocking(move || orders.search(&criteria, page)).await?;
    Ok(HttpResponse::Ok().json(PageResponse::from_page(result, OrderResponse::from)))
}

/// GET /api/orders/statistics
#[utoipa::path(
    get,
    path = "/api/orders/statistics",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Order statistics for the period", body = StatisticsResponse),
        (status = 400, description = "Malformed dates or start after end"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn order_statistics(
    _admin: AdminUser,
    state: web::Data<AppState>,
    query: web::Query<PeriodQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let start = parse_date("startDate", query.start_date.as_deref())?;
    let end = parse_date("endDate", query.end_date.as_deref())?;
    let orders = state.orders.clone();
    let stats = run_blocking(move || orders.statistics(start, end)).await?;
    Ok(HttpResponse::Ok().json(StatisticsResponse::from(stats)))
}

/// POST /api/orders/migrate-order-numbers
#[utoipa::path(
    post,
    path = "/api/orders/migrate-order-numbers",
    responses((status = 200, description = "Migration report", body = MigrationResponse)),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn migrate_order_numbers(
    _admin: AdminUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let orders = state.orders.clone();
    let report = run_blocking(move || orders.migrate_order_numbers()).await?;
    Ok(HttpResponse::Ok().json(MigrationResponse::from(report)))
}

/// GET /api/orders/{id}
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_order(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let orders = state.orders.clone();
    let order = run_blocking(move || orders.get(id)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PUT /api/orders/{id}?orderStatusCode=&history=&adminNote=
#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID"), UpdateOrderQuery),
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Unknown status code"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn update_order(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<UpdateOrderQuery>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let query = query.into_inner();
    let orders = state.orders.clone();
    let order = run_blocking(move || {
        orders.update(id, query.order_status_code, query.history, query.admin_note)
    })
    .await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// DELETE /api/orders/{id}
#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn delete_order(
    _admin: AdminUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let orders = state.orders.clone();
    run_blocking(move || orders.delete(id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use serde_json::{json, Value};

    use crate::domain::knife::fixtures::knife;
    use crate::domain::order::fixtures::order;
    use crate::handlers::configure;
    use crate::testing::Fakes;

    fn checkout(knife_id: &str, quantity: i32) -> Value {
        json!({
            "locale": "tr",
            "conversationId": "conv-42",
            "price": "200.00",
            "paymentId": "pay-42",
            "currency": "TRY",
            "buyer": {
                "id": "BY-1",
                "name": "Zeynep",
                "surname": "Kaya",
                "email": "zeynep@example.com",
                "gsmNumber": "+905550000000",
            },
            "shippingAddress": { "address": "Bağdat Cd. 5", "city": "İstanbul" },
            "billingAddress": { "address": "Bağdat Cd. 5", "city": "İstanbul" },
            "basketItems": [
                { "id": knife_id, "quantity": quantity, "price": "100.00", "selectedSize": "M" }
            ],
        })
    }

    #[actix_web::test]
    async fn checkout_creates_order_and_takes_stock() {
        let fakes = Fakes::new();
        let k = fakes.add_knife(knife("Ranger", "100.00", 5));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fakes.state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/orders")
            .set_json(checkout(&k.id.to_string(), 2))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;

        assert_eq!(body["orderStatus"]["orderStatusCode"], 1);
        assert_eq!(body["orderStatus"]["orderStatusText"], "Alındı");
        assert_eq!(body["shippingCity"], "İstanbul");
        assert_eq!(body["items"][0]["selectedSize"], "M");
        assert_eq!(body["history"], "Sipariş oluşturuldu.");
        assert!(body["orderNumber"]
            .as_str()
            .is_some_and(|n| n.starts_with("ORD-") && n.len() == 12));
        assert_eq!(fakes.knives.stock_of(k.id), Some(3));
    }

    #[actix_web::test]
    async fn insufficient_stock_is_a_conflict() {
        let fakes = Fakes::new();
        let k = fakes.add_knife(knife("Ranger", "100.00", 1));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fakes.state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/orders")
            .set_json(checkout(&k.id.to_string(), 3))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(fakes.knives.stock_of(k.id), Some(1));
        assert_eq!(fakes.orders.count(), 0);
    }

    #[actix_web::test]
    async fn checkout_without_buyer_is_rejected() {
        let fakes = Fakes::new();
        let k = fakes.add_knife(knife("Ranger", "100.00", 1));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fakes.state()))
                .configure(configure),
        )
        .await;

        let mut body = checkout(&k.id.to_string(), 1);
        body["buyer"] = Value::Null;
        let req = test::TestRequest::post()
            .uri("/api/orders")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Buyer information is required.");
    }

    #[actix_web::test]
    async fn update_changes_status_and_keeps_blank_note() {
        let fakes = Fakes::new();
        let mut existing = order("2025-01-10", 1, "100");
        existing.admin_note = "call first".to_string();
        let id = existing.id;
        fakes.orders.put(existing);
        let token = fakes.admin_token();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fakes.state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::put()
            .uri(&format!(
                "/api/orders/{}?orderStatusCode=4&history=Kargoda&adminNote=",
                id
            ))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["orderStatus"]["orderStatusText"], "Kargoya verildi");
        assert_eq!(body["history"], "Kargoda");
        assert_eq!(body["adminNote"], "call first");

        let req = test::TestRequest::put()
            .uri(&format!("/api/orders/{}?orderStatusCode=99", id))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let events = fakes.orders.events.lock().expect("events lock");
        assert!(events
            .iter()
            .any(|(kind, aggregate)| kind == "OrderStatusChanged" && *aggregate == id));
    }

    #[actix_web::test]
    async fn search_filters_and_pages() {
        let fakes = Fakes::new();
        let mut a = order("2025-01-10", 1, "100");
        a.shipping_city = "Bursa".to_string();
        let b = order("2025-01-12", 5, "300");
        let c = order("2025-02-01", 1, "50");
        fakes.orders.put(a);
        fakes.orders.put(b);
        fakes.orders.put(c);
        let token = fakes.admin_token();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fakes.state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/orders/search?searchTerm=ahmet&startDate=2025-01-01&endDate=2025-01-31&sortDirection=0&size=1")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["totalElements"], 2);
        assert_eq!(body["content"][0]["orderDate"], "2025-01-12");

        let req = test::TestRequest::get()
            .uri("/api/orders/search?status=abc&shippingCity=BURS")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["totalElements"], 1);

        let req = test::TestRequest::get()
            .uri("/api/orders/search?minPrice=lots")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn statistics_and_statuses() {
        let fakes = Fakes::new();
        fakes.orders.put(order("2025-01-10", 1, "100"));
        fakes.orders.put(order("2025-01-11", 5, "300"));
        fakes.orders.put(order("2025-01-05", 1, "10"));
        let token = fakes.admin_token();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fakes.state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/orders/statistics?startDate=2025-01-08&endDate=2025-01-11")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let stats: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stats["totalOrders"], 2);
        assert_eq!(stats["pendingOrders"], 1);
        assert_eq!(stats["completedOrders"], 1);
        assert_eq!(stats["daysCovered"], 4);
        assert_eq!(stats["ordersLastPeriod"], 1);
        assert_eq!(stats["growthRate"], 100.0);

        let req = test::TestRequest::get()
            .uri("/api/orders/statistics?startDate=2025-02-01&endDate=2025-01-01")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri("/api/orders/status/all")
            .to_request();
        let statuses: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(statuses.as_array().map(Vec::len), Some(12));
        assert_eq!(
            statuses[5],
            json!({ "orderStatusCode": 6, "orderStatusText": "İptal Edildi" })
        );
    }

    #[actix_web::test]
    async fn migration_numbers_orders_and_delete_removes() {
        let fakes = Fakes::new();
        let first = order("2024-03-01", 5, "100");
        let id = first.id;
        fakes.orders.put(first);
        let token = fakes.admin_token();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fakes.state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/orders/migrate-order-numbers")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let report: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(report["updated"], 1);
        assert_eq!(report["success"], true);

        let req = test::TestRequest::get()
            .uri(&format!("/api/orders/{}", id))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let found: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(found["orderNumber"], "ORD-2024-000001");

        let req = test::TestRequest::delete()
            .uri(&format!("/api/orders/{}", id))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
        assert_eq!(fakes.orders.count(), 0);
    }
}
