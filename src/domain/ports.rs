use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::admin::{Admin, NewAdmin};
use super::category::{Category, CategoryCount};
use super::content::{ContentKey, CorporateContent};
use super::errors::DomainError;
use super::knife::{Knife, KnifeDraft, KnifeFilter};
use super::order::{Order, OrderSearch, StatusUpdate};
use super::pagination::{Page, PageRequest};

pub trait KnifeRepository: Send + Sync + 'static {
    fn search(&self, filter: &KnifeFilter, page: PageRequest) -> Result<Page<Knife>, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Knife>, DomainError>;
    fn find_by_name(&self, name: &str) -> Result<Option<Knife>, DomainError>;
    fn insert(&self, draft: KnifeDraft) -> Result<Knife, DomainError>;
    fn update(&self, id: Uuid, draft: KnifeDraft) -> Result<Option<Knife>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    fn knife_types(&self) -> Result<Vec<String>, DomainError>;
    fn count_by_category(&self, category_id: i32) -> Result<i64, DomainError>;
    /// `stock -= quantity` only when enough is left. `None` when nothing matched.
    fn decrement_stock(&self, id: Uuid, quantity: i32) -> Result<Option<Knife>, DomainError>;
    fn increment_stock(&self, id: Uuid, quantity: i32) -> Result<(), DomainError>;
}

pub trait CategoryRepository: Send + Sync + 'static {
    fn list(&self) -> Result<Vec<Category>, DomainError>;
    fn find_by_id(&self, id: i32) -> Result<Option<Category>, DomainError>;
    fn insert(&self, category: Category) -> Result<Category, DomainError>;
    fn save(&self, category: Category) -> Result<Category, DomainError>;
    fn delete(&self, id: i32) -> Result<bool, DomainError>;
    /// Sets `display_order` for each `(id, order)` pair in one transaction.
    fn set_display_orders(&self, orders: &[(i32, i32)]) -> Result<(), DomainError>;
    fn product_counts(&self) -> Result<Vec<CategoryCount>, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Stores the order, its items and an `OrderCreated` outbox event atomically.
    fn insert(&self, order: &Order) -> Result<(), DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn list_all(&self) -> Result<Vec<Order>, DomainError>;
    fn by_status(&self, status_code: i32) -> Result<Vec<Order>, DomainError>;
    fn search(&self, criteria: &OrderSearch, page: PageRequest) -> Result<Page<Order>, DomainError>;
    /// Orders in the inclusive date range; unbounded ends are open.
    fn in_period(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Order>, DomainError>;
    fn count_in_period(&self, start: NaiveDate, end: NaiveDate) -> Result<i64, DomainError>;
    fn count_for_date(&self, date: NaiveDate) -> Result<i64, DomainError>;
    /// Applies the update and, when the buyer has an e-mail, writes an
    /// `OrderStatusChanged` outbox event in the same transaction.
    fn update_status(&self, id: Uuid, update: &StatusUpdate) -> Result<Option<Order>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    /// Newest orders whose status is not cancelled or returned.
    fn recent(&self, limit: i64) -> Result<Vec<Order>, DomainError>;
    /// Orders without an order number, oldest first.
    fn without_order_number(&self) -> Result<Vec<Order>, DomainError>;
    fn order_numbers(&self) -> Result<Vec<String>, DomainError>;
    fn set_order_number(&self, id: Uuid, order_number: &str) -> Result<(), DomainError>;
}

pub trait ContentRepository: Send + Sync + 'static {
    fn find(&self, key: ContentKey) -> Result<Option<CorporateContent>, DomainError>;
    fn list(&self, active_only: bool) -> Result<Vec<CorporateContent>, DomainError>;
    /// Inserts or replaces the entry for `content.key`.
    fn upsert(&self, content: CorporateContent) -> Result<CorporateContent, DomainError>;
}

pub trait AdminRepository: Send + Sync + 'static {
    fn find_by_username(&self, username: &str) -> Result<Option<Admin>, DomainError>;
    fn exists(&self, username: &str) -> Result<bool, DomainError>;
    fn insert(&self, admin: NewAdmin) -> Result<Admin, DomainError>;
    fn touch_last_login(&self, id: Uuid) -> Result<(), DomainError>;
}

/// Remote image hosting. Uploads run on the async runtime, not in `web::block`.
#[async_trait]
pub trait ImageStore: Send + Sync + 'static {
    /// Uploads a base64 payload (optionally a `data:` URI) and returns its URL.
    async fn upload(&self, base64_image: &str) -> Result<String, DomainError>;
}
