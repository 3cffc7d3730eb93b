use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Utc};
use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    backfill_order_number, generate_order_number, previous_period, BasketItem, Checkout, Order,
    OrderItem, OrderSearch, OrderStatistics, StatusUpdate, INITIAL_HISTORY,
};
use crate::domain::order_status::{self, OrderStatus, RECEIVED};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::ports::OrderRepository;

use super::knife_service::KnifeService;
use crate::domain::social_proof::{self, RecentPurchase};

const MAX_REPORTED_ERRORS: usize = 10;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MigrationReport {
    pub processed: usize,
    pub updated: usize,
    pub error_count: usize,
    pub errors: Vec<String>,
}

pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    knives: Arc<KnifeService>,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderRepository>, knives: Arc<KnifeService>) -> Self {
        Self { orders, knives }
    }

    /// Places an order from a completed checkout.
    ///
    /// Stock is taken item by item with a conditional decrement. If anything
    /// fails afterwards, every decrement already made is given back before the
    /// error is returned.
    pub fn create(&self, checkout: Checkout) -> Result<Order, DomainError> {
        let Some(buyer) = checkout.buyer.clone() else {
            log::warn!(
                "Buyer information is missing in checkout {}",
                checkout.conversation_id
            );
            return Err(DomainError::InvalidInput(
                "Buyer information is required.".to_string(),
            ));
        };
        let total_amount = BigDecimal::from_str(checkout.price.trim()).map_err(|_| {
            DomainError::InvalidInput(format!("Invalid price format: {}", checkout.price))
        })?;
        if checkout.basket_items.is_empty() {
            return Err(DomainError::InvalidInput(
                "Basket must contain at least one item".to_string(),
            ));
        }

        let mut decremented: Vec<(Uuid, i32)> = Vec::new();
        let result = self.reserve_items(&checkout.basket_items, &mut decremented);
        let items = match result {
            Ok(items) => items,
            Err(e) => {
                self.compensate(&decremented);
                return Err(e);
            }
        };

        let now = Utc::now();
        let today = now.date_naive();
        let daily_count = match self.orders.count_for_date(today) {
            Ok(count) => count,
            Err(e) => {
                self.compensate(&decremented);
                return Err(e);
            }
        };

        let shipping = checkout.shipping_address.unwrap_or_default();
        let billing = checkout.billing_address.unwrap_or_default();
        let order = Order {
            id: Uuid::new_v4(),
            order_number: generate_order_number(now.timestamp_millis(), today, daily_count),
            order_date: today,
            conversation_id: checkout.conversation_id,
            payment_id: checkout.payment_id,
            status_code: RECEIVED,
            status_text: order_status::text_for(RECEIVED).to_string(),
            shipping_address: shipping.address,
            shipping_city: shipping.city,
            billing_address: billing.address,
            total_amount,
            history: INITIAL_HISTORY.to_string(),
            user_name: buyer.name,
            user_surname: buyer.surname,
            email: buyer.email,
            phone_number: buyer.gsm_number,
            admin_note: String::new(),
            items,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.orders.insert(&order) {
            log::error!("Failed to store order {}: {}", order.order_number, e);
            self.compensate(&decremented);
            return Err(e);
        }

        log::info!(
            "Order {} created with {} item(s), total {}",
            order.order_number,
            order.items.len(),
            order.total_amount
        );
        Ok(order)
    }

    fn reserve_items(
        &self,
        basket: &[BasketItem],
        decremented: &mut Vec<(Uuid, i32)>,
    ) -> Result<Vec<OrderItem>, DomainError> {
        let mut items = Vec::with_capacity(basket.len());
        for line in basket {
            let knife_id = Uuid::parse_str(line.knife_id.trim()).map_err(|_| {
                DomainError::NotFound(format!("Knife not found with id: {}", line.knife_id))
            })?;
            if line.quantity < 1 {
                return Err(DomainError::InvalidInput(format!(
                    "Quantity must be at least 1 for knife {}",
                    knife_id
                )));
            }
            let knife = self.knives.get(knife_id)?;
            if let Some(size) = line.selected_size.as_deref() {
                if !knife.knife_sizes.is_empty() && !knife.knife_sizes.iter().any(|s| s == size) {
                    log::info!(
                        "Invalid size {} selected for {}, available: {:?}",
                        size,
                        knife.name,
                        knife.knife_sizes
                    );
                    return Err(DomainError::InvalidInput(format!(
                        "Invalid knife size selected for knife: {}",
                        knife.name
                    )));
                }
            }

            let updated = self.knives.decrement_stock_atomic(knife_id, line.quantity)?;
            decremented.push((knife_id, line.quantity));
            log::info!(
                "Reserved {} x {}, {} left",
                line.quantity,
                updated.name,
                updated.stock_quantity
            );

            items.push(OrderItem::snapshot(
                &updated,
                line.quantity,
                line.selected_size.clone(),
                line.note.clone(),
            ));
        }
        Ok(items)
    }

    /// Best effort: failures are logged and never propagated.
    fn compensate(&self, decremented: &[(Uuid, i32)]) {
        for (knife_id, quantity) in decremented {
            match self.knives.increment_stock(*knife_id, *quantity) {
                Ok(()) => log::warn!("Restored {} unit(s) of stock for {}", quantity, knife_id),
                Err(e) => log::error!(
                    "Failed to restore {} unit(s) of stock for {}: {}",
                    quantity,
                    knife_id,
                    e
                ),
            }
        }
    }

    pub fn update(
        &self,
        id: Uuid,
        status_code: i32,
        history: Option<String>,
        admin_note: Option<String>,
    ) -> Result<Order, DomainError> {
        let status = order_status::by_code(status_code).ok_or_else(|| {
            DomainError::InvalidInput(format!("Unknown order status code: {}", status_code))
        })?;
        let update = StatusUpdate {
            status_code: status.code,
            status_text: status.text,
            history,
            admin_note,
        };
        let order = self
            .orders
            .update_status(id, &update)?
            .ok_or_else(|| DomainError::not_found("Order", id))?;
        log::info!("Order {} moved to status {}", id, order.status_text);
        Ok(order)
    }

    pub fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.orders.delete(id)? {
            return Err(DomainError::not_found("Order", id));
        }
        log::info!("Order {} deleted", id);
        Ok(())
    }

    pub fn list_all(&self) -> Result<Vec<Order>, DomainError> {
        self.orders.list_all()
    }

    pub fn get(&self, id: Uuid) -> Result<Order, DomainError> {
        self.orders
            .find_by_id(id)?
            .ok_or_else(|| DomainError::not_found("Order", id))
    }

    pub fn by_status(&self, status_code: i32) -> Result<Vec<Order>, DomainError> {
        self.orders.by_status(status_code)
    }

    pub fn statuses(&self) -> Vec<OrderStatus> {
        order_status::all()
    }

    pub fn search(&self, criteria: &OrderSearch, page: PageRequest) -> Result<Page<Order>, DomainError> {
        self.orders.search(criteria, page)
    }

    pub fn count_for_date(&self, date: NaiveDate) -> Result<i64, DomainError> {
        self.orders.count_for_date(date)
    }

    pub fn statistics(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<OrderStatistics, DomainError> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(DomainError::InvalidInput(
                    "startDate must not be after endDate".to_string(),
                ));
            }
        }
        let orders = self.orders.in_period(start, end)?;
        let previous = match (start, end) {
            (Some(s), Some(e)) => {
                let (prev_start, prev_end) = previous_period(s, e);
                Some(self.orders.count_in_period(prev_start, prev_end)?)
            }
            _ => None,
        };
        Ok(OrderStatistics::compute(&orders, start, end, previous))
    }

    /// Gives every order that predates hashed numbers a sequential one.
    pub fn migrate_order_numbers(&self) -> Result<MigrationReport, DomainError> {
        log::info!("Starting order number migration");
        let pending = self.orders.without_order_number()?;
        let mut taken: HashSet<String> = self.orders.order_numbers()?.into_iter().collect();
        log::info!(
            "Found {} orders without a number, {} numbers in use",
            pending.len(),
            taken.len()
        );

        let mut report = MigrationReport::default();
        let mut errors = Vec::new();
        for (index, order) in pending.iter().enumerate() {
            report.processed += 1;
            let number = backfill_order_number(order.order_date, index, &taken);
            match self.orders.set_order_number(order.id, &number) {
                Ok(()) => {
                    log::debug!("Order {} numbered {}", order.id, number);
                    taken.insert(number);
                    report.updated += 1;
                }
                Err(e) => {
                    let message = format!("Failed to update order {}: {}", order.id, e);
                    log::error!("{}", message);
                    errors.push(message);
                }
            }
        }

        report.error_count = errors.len();
        errors.truncate(MAX_REPORTED_ERRORS);
        report.errors = errors;
        log::info!(
            "Order number migration done. Processed: {}, Updated: {}, Errors: {}",
            report.processed,
            report.updated,
            report.error_count
        );
        Ok(report)
    }

    /// Anonymised, shuffled purchases for the storefront. Never fails.
    pub fn recent_purchases(&self, limit: i64) -> Vec<RecentPurchase> {
        let limit = limit.max(0);
        let orders = match self.orders.recent(limit) {
            Ok(orders) => orders,
            Err(e) => {
                log::error!("Error fetching recent purchases: {}", e);
                return vec![];
            }
        };
        let now = Utc::now();
        let mut purchases: Vec<RecentPurchase> = orders
            .iter()
            .flat_map(|order| social_proof::purchases_for(order, now))
            .take(limit as usize)
            .collect();
        purchases.shuffle(&mut rand::thread_rng());
        log::info!("Returning {} recent purchases", purchases.len());
        purchases
    }
}
