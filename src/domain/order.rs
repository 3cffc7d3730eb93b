use std::collections::{BTreeMap, HashMap, HashSet};

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::knife::{non_empty, Knife};
use super::order_status::{self, CANCELLED, COMPLETED, RECEIVED};

const ORDER_NUMBER_SALT: &str = "BLADE_COMMERCE_SALT_2025";
const TOP_PRODUCT_LIMIT: usize = 5;
pub const INITIAL_HISTORY: &str = "Sipariş oluşturuldu.";

/// Snapshot of a knife at the time it was ordered.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: Uuid,
    pub knife_id: Uuid,
    pub name: String,
    pub category_id: i32,
    pub category_name: Option<String>,
    pub description: String,
    pub price: BigDecimal,
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

impl OrderItem {
    pub fn snapshot(
        knife: &Knife,
        quantity: i32,
        selected_size: Option<String>,
        customer_note: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            knife_id: knife.id,
            name: knife.name.clone(),
            category_id: knife.category_id,
            category_name: knife.category_name.clone(),
            description: knife.description.clone(),
            price: knife.price.clone(),
            discount_price: knife.discount_price.clone(),
            quantity,
            image_url: knife.image_url.clone(),
            knife_type: knife.knife_type.clone(),
            blade_length: knife.blade_length,
            blade_material: knife.blade_material.clone(),
            handle_material: knife.handle_material.clone(),
            color: knife.color.clone(),
            selected_size,
            customer_note,
        }
    }

    /// Price actually charged per unit: the discount when it undercuts the
    /// regular price, otherwise the regular price.
    pub fn unit_price(&self) -> &BigDecimal {
        if self.discount_price > BigDecimal::zero() && self.discount_price < self.price {
            &self.discount_price
        } else {
            &self.price
        }
    }

    pub fn line_total(&self) -> BigDecimal {
        self.unit_price() * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub order_date: NaiveDate,
    pub conversation_id: String,
    pub payment_id: String,
    pub status_code: i32,
    pub status_text: String,
    pub shipping_address: String,
    pub shipping_city: String,
    pub billing_address: String,
    pub total_amount: BigDecimal,
    pub history: String,
    pub user_name: String,
    pub user_surname: String,
    pub email: String,
    pub phone_number: String,
    pub admin_note: String,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub status_code: i32,
    pub status_text: String,
    pub history: Option<String>,
    pub admin_note: Option<String>,
}

impl Order {
    pub fn apply_status_update(&mut self, update: &StatusUpdate) {
        self.status_code = update.status_code;
        self.status_text = update.status_text.clone();
        if let Some(history) = &update.history {
            self.history = history.clone();
        }
        if let Some(note) = update.admin_note.as_deref().filter(|n| !n.is_empty()) {
            self.admin_note = note.to_string();
        }
        self.updated_at = Utc::now();
    }
}

// ── Checkout input ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Buyer {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub gsm_number: String,
}

#[derive(Debug, Clone, Default)]
pub struct Address {
    pub address: String,
    pub city: String,
}

#[derive(Debug, Clone)]
pub struct BasketItem {
    pub knife_id: String,
    pub quantity: i32,
    pub selected_size: Option<String>,
    pub note: Option<String>,
}

/// Checkout payload as received from the payment gateway flow.
#[derive(Debug, Clone, Default)]
pub struct Checkout {
    pub conversation_id: String,
    pub price: String,
    pub payment_id: String,
    pub buyer: Option<Buyer>,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    pub basket_items: Vec<BasketItem>,
}

// ── Order numbers ────────────────────────────────────────────────────────────

/// `ORD-` followed by the first four SHA-256 bytes (upper-case hex) of the
/// timestamp, the order date and the next daily sequence number.
pub fn generate_order_number(timestamp_millis: i64, date: NaiveDate, daily_count: i64) -> String {
    let input = format!(
        "{}:{}:{}:{}",
        timestamp_millis,
        date.format("%Y-%m-%d"),
        daily_count + 1,
        ORDER_NUMBER_SALT
    );
    let digest = Sha256::digest(input.as_bytes());
    format!("ORD-{}", hex::encode_upper(&digest[..4]))
}

/// Sequential number assigned to orders that predate hashed order numbers.
pub fn backfill_order_number(order_date: NaiveDate, index: usize, taken: &HashSet<String>) -> String {
    let year = order_date.year();
    let base = format!("ORD-{}-{:06}", year, index + 1);
    if !taken.contains(&base) {
        return base;
    }
    let mut counter = 1;
    loop {
        let candidate = format!("{}-{}", base, counter);
        if !taken.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

// ── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct OrderSearch {
    pub search_term: Option<String>,
    pub min_total: Option<BigDecimal>,
    pub max_total: Option<BigDecimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status_code: Option<i32>,
    pub payment_id: Option<String>,
    pub conversation_id: Option<String>,
    pub shipping_city: Option<String>,
    pub admin_note: Option<String>,
    pub ascending: bool,
}

impl OrderSearch {
    pub fn terms(&self) -> Vec<&str> {
        self.search_term
            .as_deref()
            .map(|t| t.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// In-memory equivalent of the repository query.
    pub fn matches(&self, order: &Order) -> bool {
        let contains = |haystack: &str, needle: &str| {
            haystack.to_lowercase().contains(&needle.trim().to_lowercase())
        };

        for term in self.terms() {
            let id_match = Uuid::parse_str(term).map(|id| id == order.id).unwrap_or(false);
            let text_match = [
                &order.user_name,
                &order.user_surname,
                &order.email,
                &order.phone_number,
                &order.order_number,
            ]
            .iter()
            .any(|field| contains(field, term));
            if !(id_match || text_match) {
                return false;
            }
        }
        if self.min_total.as_ref().is_some_and(|min| &order.total_amount < min) {
            return false;
        }
        if self.max_total.as_ref().is_some_and(|max| &order.total_amount > max) {
            return false;
        }
        if self.start_date.is_some_and(|start| order.order_date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| order.order_date > end) {
            return false;
        }
        if self.status_code.is_some_and(|code| order.status_code != code) {
            return false;
        }
        let text_filters = [
            (&self.payment_id, &order.payment_id),
            (&self.conversation_id, &order.conversation_id),
            (&self.shipping_city, &order.shipping_city),
            (&self.admin_note, &order.admin_note),
        ];
        for (filter, field) in text_filters {
            if let Some(needle) = non_empty(filter).filter(|s| !s.trim().is_empty()) {
                if !contains(field, needle) {
                    return false;
                }
            }
        }
        true
    }
}

// ── Statistics ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ProductStatistics {
    pub product_id: Uuid,
    pub product_name: String,
    pub order_count: i64,
    pub revenue: BigDecimal,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, Default)]
pub struct OrderStatistics {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub completed_orders: i64,
    pub cancelled_orders: i64,
    pub total_revenue: BigDecimal,
    pub average_order_value: BigDecimal,
    pub pending_revenue: BigDecimal,
    pub orders_by_date: BTreeMap<String, i64>,
    pub revenue_by_date: BTreeMap<String, BigDecimal>,
    pub orders_by_status: BTreeMap<String, i64>,
    pub top_products: Vec<ProductStatistics>,
    pub growth_rate: f64,
    pub orders_last_period: i64,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub days_covered: i64,
}

/// Inclusive day count of a closed period.
pub fn days_covered(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// The period of equal length immediately before `[start, end]`.
pub fn previous_period(start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
    let days = days_covered(start, end);
    let prev_end = start - chrono::Duration::days(1);
    let prev_start = start - chrono::Duration::days(days);
    (prev_start, prev_end)
}

impl OrderStatistics {
    pub fn compute(
        orders: &[Order],
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        orders_last_period: Option<i64>,
    ) -> Self {
        let mut stats = OrderStatistics {
            period_start: start,
            period_end: end,
            total_orders: orders.len() as i64,
            ..Default::default()
        };

        let mut products: HashMap<Uuid, ProductStatistics> = HashMap::new();
        for order in orders {
            let date_key = order.order_date.format("%Y-%m-%d").to_string();
            *stats.orders_by_date.entry(date_key.clone()).or_insert(0) += 1;
            let day_revenue = stats
                .revenue_by_date
                .entry(date_key)
                .or_insert_with(BigDecimal::zero);
            *day_revenue += &order.total_amount;

            let status_key = order_status::text_for(order.status_code).to_string();
            *stats.orders_by_status.entry(status_key).or_insert(0) += 1;

            stats.total_revenue += &order.total_amount;
            match order.status_code {
                RECEIVED => {
                    stats.pending_orders += 1;
                    stats.pending_revenue += &order.total_amount;
                }
                COMPLETED => stats.completed_orders += 1,
                CANCELLED => stats.cancelled_orders += 1,
                _ => {}
            }

            for item in &order.items {
                let entry = products.entry(item.knife_id).or_insert_with(|| ProductStatistics {
                    product_id: item.knife_id,
                    product_name: item.name.clone(),
                    order_count: 0,
                    revenue: BigDecimal::zero(),
                    total_quantity: 0,
                });
                entry.order_count += 1;
                entry.total_quantity += i64::from(item.quantity);
                entry.revenue += item.line_total();
            }
        }

        if stats.total_orders > 0 {
            stats.average_order_value =
                (stats.total_revenue.clone() / BigDecimal::from(stats.total_orders)).round(2);
        }

        let mut top: Vec<ProductStatistics> = products.into_values().collect();
        top.sort_by(|a, b| {
            b.revenue
                .cmp(&a.revenue)
                .then_with(|| a.product_name.cmp(&b.product_name))
        });
        top.truncate(TOP_PRODUCT_LIMIT);
        stats.top_products = top;

        if let (Some(start), Some(end)) = (start, end) {
            stats.days_covered = days_covered(start, end);
        }

        if let Some(previous) = orders_last_period {
            stats.orders_last_period = previous;
            stats.growth_rate = growth_rate(stats.total_orders, previous);
        }

        stats
    }
}

/// Percentage change against the previous period, rounded to two decimals.
fn growth_rate(current: i64, previous: i64) -> f64 {
    let rate = if previous > 0 {
        (current - previous) as f64 / previous as f64 * 100.0
    } else if current > 0 {
        100.0
    } else {
        0.0
    };
    (rate * 100.0).round() / 100.0
}
