use chrono::{NaiveDate, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use serde_json::json;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::knife::non_empty;
use crate::domain::order::{Order, OrderSearch, StatusUpdate};
use crate::domain::order_status::CANCELLED;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_items, order_outbox, orders};

use super::contains_pattern;
use super::models::{NewOutboxEventRow, OrderItemRow, OrderRow};

const LAST_RETURN_STATUS: i32 = 12;

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Attaches the items of every row with a single extra query.
fn with_items(conn: &mut PgConnection, rows: Vec<OrderRow>) -> Result<Vec<Order>, DomainError> {
    let items = OrderItemRow::belonging_to(&rows)
        .select(OrderItemRow::as_select())
        .order(order_items::created_at.asc())
        .load(conn)?;
    Ok(items
        .grouped_by(&rows)
        .into_iter()
        .zip(rows)
        .map(|(items, row)| row.into_order(items))
        .collect())
}

fn load_one(conn: &mut PgConnection, id: Uuid) -> Result<Option<Order>, DomainError> {
    let row = orders::table
        .find(id)
        .select(OrderRow::as_select())
        .first(conn)
        .optional()?;
    match row {
        Some(row) => Ok(with_items(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

/// Every criterion that is set narrows the result; free-text terms must all match.
fn search_filter(criteria: &OrderSearch) -> orders::BoxedQuery<'static, Pg> {
    let mut query = orders::table.into_boxed();

    for term in criteria.terms() {
        let pattern = contains_pattern(term);
        let text_match = orders::user_name
            .ilike(pattern.clone())
            .escape('\\')
            .or(orders::user_surname.ilike(pattern.clone()).escape('\\'))
            .or(orders::email.ilike(pattern.clone()).escape('\\'))
            .or(orders::phone_number.ilike(pattern.clone()).escape('\\'))
            .or(orders::order_number.ilike(pattern).escape('\\'));
        query = match Uuid::parse_str(term) {
            Ok(id) => query.filter(text_match.or(orders::id.eq(id))),
            Err(_) => query.filter(text_match),
        };
    }
    if let Some(min) = &criteria.min_total {
        query = query.filter(orders::total_amount.ge(min.clone()));
    }
    if let Some(max) = &criteria.max_total {
        query = query.filter(orders::total_amount.le(max.clone()));
    }
    if let Some(start) = criteria.start_date {
        query = query.filter(orders::order_date.ge(start));
    }
    if let Some(end) = criteria.end_date {
        query = query.filter(orders::order_date.le(end));
    }
    if let Some(code) = criteria.status_code {
        query = query.filter(orders::status_code.eq(code));
    }
    if let Some(payment_id) = non_empty(&criteria.payment_id) {
        query = query.filter(
            orders::payment_id
                .ilike(contains_pattern(payment_id))
                .escape('\\'),
        );
    }
    if let Some(conversation_id) = non_empty(&criteria.conversation_id) {
        query = query.filter(
            orders::conversation_id
                .ilike(contains_pattern(conversation_id))
                .escape('\\'),
        );
    }
    if let Some(city) = non_empty(&criteria.shipping_city) {
        query = query.filter(orders::shipping_city.ilike(contains_pattern(city)).escape('\\'));
    }
    if let Some(note) = non_empty(&criteria.admin_note) {
        query = query.filter(orders::admin_note.ilike(contains_pattern(note)).escape('\\'));
    }
    query
}

fn period_filter(start: Option<NaiveDate>, end: Option<NaiveDate>) -> orders::BoxedQuery<'static, Pg> {
    let mut query = orders::table.into_boxed();
    if let Some(start) = start {
        query = query.filter(orders::order_date.ge(start));
    }
    if let Some(end) = end {
        query = query.filter(orders::order_date.le(end));
    }
    query
}

impl OrderRepository for DieselOrderRepository {
    fn insert(&self, order: &Order) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Insert the order
            diesel::insert_into(orders::table)
                .values(&OrderRow::from_order(order))
                .execute(conn)?;

            // 2. Insert its items
            let items: Vec<OrderItemRow> = order
                .items
                .iter()
                .map(|i| OrderItemRow::from_item(order.id, order.created_at, i))
                .collect();
            diesel::insert_into(order_items::table)
                .values(&items)
                .execute(conn)?;

            // 3. Insert the outbox event in the same transaction
            let item_payloads: Vec<serde_json::Value> = order
                .items
                .iter()
                .map(|i| {
                    json!({
                        "knifeId": i.knife_id,
                        "name": i.name,
                        "quantity": i.quantity,
                        "unitPrice": i.unit_price().to_string(),
                        "selectedSize": i.selected_size,
                    })
                })
                .collect();
            let payload = json!({
                "orderId": order.id,
                "orderNumber": order.order_number,
                "paymentId": order.payment_id,
                "conversationId": order.conversation_id,
                "statusCode": order.status_code,
                "totalAmount": order.total_amount.to_string(),
                "email": order.email,
                "items": item_payloads,
            });
            diesel::insert_into(order_outbox::table)
                .values(&NewOutboxEventRow::for_order(order.id, "OrderCreated", payload))
                .execute(conn)?;

            Ok(())
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        load_one(&mut conn, id)
    }

    fn list_all(&self) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = orders::table
            .select(OrderRow::as_select())
            .order((orders::order_date.desc(), orders::created_at.desc()))
            .load(&mut conn)?;
        with_items(&mut conn, rows)
    }

    fn by_status(&self, status_code: i32) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = orders::table
            .filter(orders::status_code.eq(status_code))
            .select(OrderRow::as_select())
            .order((orders::order_date.desc(), orders::created_at.desc()))
            .load(&mut conn)?;
        with_items(&mut conn, rows)
    }

    fn search(&self, criteria: &OrderSearch, page: PageRequest) -> Result<Page<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let total: i64 = search_filter(criteria).count().get_result(&mut conn)?;

        let query = search_filter(criteria).select(OrderRow::as_select());
        let query = if criteria.ascending {
            query.order((orders::order_date.asc(), orders::id.asc()))
        } else {
            query.order((orders::order_date.desc(), orders::id.desc()))
        };
        let rows = query
            .limit(page.size)
            .offset(page.offset())
            .load(&mut conn)?;

        Ok(Page::new(with_items(&mut conn, rows)?, page, total))
    }

    fn in_period(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = period_filter(start, end)
            .select(OrderRow::as_select())
            .order((orders::order_date.asc(), orders::created_at.asc()))
            .load(&mut conn)?;
        with_items(&mut conn, rows)
    }

    fn count_in_period(&self, start: NaiveDate, end: NaiveDate) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;
        let count = period_filter(Some(start), Some(end))
            .count()
            .get_result(&mut conn)?;
        Ok(count)
    }

    fn count_for_date(&self, date: NaiveDate) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;
        let count = orders::table
            .filter(orders::order_date.eq(date))
            .count()
            .get_result(&mut conn)?;
        Ok(count)
    }

    fn update_status(&self, id: Uuid, update: &StatusUpdate) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let Some(mut order) = load_one(conn, id)? else {
                return Ok(None);
            };
            order.apply_status_update(update);

            diesel::update(orders::table.find(id))
                .set((
                    orders::status_code.eq(order.status_code),
                    orders::status_text.eq(&order.status_text),
                    orders::history.eq(&order.history),
                    orders::admin_note.eq(&order.admin_note),
                    orders::updated_at.eq(order.updated_at),
                ))
                .execute(conn)?;

            // Picked up by the mailer that notifies the buyer.
            if !order.email.is_empty() {
                let payload = json!({
                    "orderId": order.id,
                    "orderNumber": order.order_number,
                    "email": order.email,
                    "customerName": order.user_name,
                    "statusCode": order.status_code,
                    "statusText": order.status_text,
                    "subject": "Sipariş Durumunuz Güncellendi",
                    "message": format!("Siparişinizin yeni durumu: {}", order.status_text),
                });
                diesel::insert_into(order_outbox::table)
                    .values(&NewOutboxEventRow::for_order(order.id, "OrderStatusChanged", payload))
                    .execute(conn)?;
            }

            Ok(Some(order))
        })
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(orders::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn recent(&self, limit: i64) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = orders::table
            .filter(orders::status_code.not_between(CANCELLED, LAST_RETURN_STATUS))
            .select(OrderRow::as_select())
            .order((orders::order_date.desc(), orders::created_at.desc()))
            .limit(limit)
            .load(&mut conn)?;
        with_items(&mut conn, rows)
    }

    fn without_order_number(&self) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = orders::table
            .filter(orders::order_number.eq(""))
            .select(OrderRow::as_select())
            .order((orders::order_date.asc(), orders::created_at.asc()))
            .load(&mut conn)?;
        with_items(&mut conn, rows)
    }

    fn order_numbers(&self) -> Result<Vec<String>, DomainError> {
        let mut conn = self.pool.get()?;
        let numbers = orders::table
            .filter(orders::order_number.ne(""))
            .select(orders::order_number)
            .load::<String>(&mut conn)?;
        Ok(numbers)
    }

    fn set_order_number(&self, id: Uuid, order_number: &str) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(orders::table.find(id))
            .set((
                orders::order_number.eq(order_number),
                orders::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(DomainError::not_found("Order", id));
        }
        Ok(())
    }
}
