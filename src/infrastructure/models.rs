use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::admin::Admin;
use crate::domain::category::Category;
use crate::domain::content::{ContentKey, CorporateContent};
use crate::domain::errors::DomainError;
use crate::domain::knife::{Knife, KnifeDraft};
use crate::domain::order::{Order, OrderItem};
use crate::schema::{admins, categories, corporate_content, knives, order_items, order_outbox, orders};

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable, AsChangeset)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct CategoryRow {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
}

impl From<CategoryRow> for Category {
    fn from(r: CategoryRow) -> Self {
        Category {
            id: r.id,
            name: r.name,
            description: r.description,
            icon: r.icon,
            display_order: r.display_order,
            is_active: r.is_active,
        }
    }
}

impl From<Category> for CategoryRow {
    fn from(c: Category) -> Self {
        CategoryRow {
            id: c.id,
            name: c.name,
            description: c.description,
            icon: c.icon,
            display_order: c.display_order,
            is_active: c.is_active,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = knives)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct KnifeRow {
    pub id: Uuid,
    pub name: String,
    pub category_id: i32,
    pub category_name: Option<String>,
    pub description: String,
    pub price: BigDecimal,
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

impl From<KnifeRow> for Knife {
    fn from(r: KnifeRow) -> Self {
        Knife {
            id: r.id,
            name: r.name,
            category_id: r.category_id,
            category_name: r.category_name,
            description: r.description,
            price: r.price,
            discount_price: r.discount_price,
            percentage_discount: r.percentage_discount,
            stock_quantity: r.stock_quantity,
            tags: r.tags,
            image_url: r.image_url,
            knife_type: r.knife_type,
            blade_length: r.blade_length,
            color: r.color,
            blade_material: r.blade_material,
            handle_material: r.handle_material,
            knife_sizes: r.knife_sizes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Column values written on insert and on full replacement.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = knives)]
#[diesel(treat_none_as_null = true)]
pub struct KnifeChangeset {
    pub name: String,
    pub category_id: i32,
    pub category_name: Option<String>,
    pub description: String,
    pub price: BigDecimal,
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
    pub updated_at: DateTime<Utc>,
}

impl From<KnifeDraft> for KnifeChangeset {
    fn from(d: KnifeDraft) -> Self {
        KnifeChangeset {
            name: d.name,
            category_id: d.category_id,
            category_name: d.category_name,
            description: d.description,
            price: d.price,
            discount_price: d.discount_price,
            percentage_discount: d.percentage_discount,
            stock_quantity: d.stock_quantity,
            tags: d.tags,
            image_url: d.image_url,
            knife_type: d.knife_type,
            blade_length: d.blade_length,
            color: d.color,
            blade_material: d.blade_material,
            handle_material: d.handle_material,
            knife_sizes: d.knife_sizes,
            updated_at: Utc::now(),
        }
    }
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations, Insertable)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
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
    pub created_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn from_order(o: &Order) -> Self {
        OrderRow {
            id: o.id,
            order_number: o.order_number.clone(),
            order_date: o.order_date,
            conversation_id: o.conversation_id.clone(),
            payment_id: o.payment_id.clone(),
            status_code: o.status_code,
            status_text: o.status_text.clone(),
            shipping_address: o.shipping_address.clone(),
            shipping_city: o.shipping_city.clone(),
            billing_address: o.billing_address.clone(),
            total_amount: o.total_amount.clone(),
            history: o.history.clone(),
            user_name: o.user_name.clone(),
            user_surname: o.user_surname.clone(),
            email: o.email.clone(),
            phone_number: o.phone_number.clone(),
            admin_note: o.admin_note.clone(),
            created_at: o.created_at,
            updated_at: o.updated_at,
        }
    }

    pub fn into_order(self, items: Vec<OrderItemRow>) -> Order {
        Order {
            id: self.id,
            order_number: self.order_number,
            order_date: self.order_date,
            conversation_id: self.conversation_id,
            payment_id: self.payment_id,
            status_code: self.status_code,
            status_text: self.status_text,
            shipping_address: self.shipping_address,
            shipping_city: self.shipping_city,
            billing_address: self.billing_address,
            total_amount: self.total_amount,
            history: self.history,
            user_name: self.user_name,
            user_surname: self.user_surname,
            email: self.email,
            phone_number: self.phone_number,
            admin_note: self.admin_note,
            items: items.into_iter().map(OrderItem::from).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl OrderItemRow {
    pub fn from_item(order_id: Uuid, created_at: DateTime<Utc>, i: &OrderItem) -> Self {
        OrderItemRow {
            id: i.id,
            order_id,
            knife_id: i.knife_id,
            name: i.name.clone(),
            category_id: i.category_id,
            category_name: i.category_name.clone(),
            description: i.description.clone(),
            price: i.price.clone(),
            discount_price: i.discount_price.clone(),
            quantity: i.quantity,
            image_url: i.image_url.clone(),
            knife_type: i.knife_type.clone(),
            blade_length: i.blade_length,
            blade_material: i.blade_material.clone(),
            handle_material: i.handle_material.clone(),
            color: i.color.clone(),
            selected_size: i.selected_size.clone(),
            customer_note: i.customer_note.clone(),
            created_at,
        }
    }
}

impl From<OrderItemRow> for OrderItem {
    fn from(r: OrderItemRow) -> Self {
        OrderItem {
            id: r.id,
            knife_id: r.knife_id,
            name: r.name,
            category_id: r.category_id,
            category_name: r.category_name,
            description: r.description,
            price: r.price,
            discount_price: r.discount_price,
            quantity: r.quantity,
            image_url: r.image_url,
            knife_type: r.knife_type,
            blade_length: r.blade_length,
            blade_material: r.blade_material,
            handle_material: r.handle_material,
            color: r.color,
            selected_size: r.selected_size,
            customer_note: r.customer_note,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = order_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_outbox)]
pub struct NewOutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
}

impl NewOutboxEventRow {
    pub fn for_order(order_id: Uuid, event_type: &str, payload: Value) -> Self {
        NewOutboxEventRow {
            id: Uuid::new_v4(),
            aggregate_type: "Order".to_string(),
            aggregate_id: order_id.to_string(),
            event_type: event_type.to_string(),
            payload,
        }
    }
}

// ── Content & admins ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = corporate_content)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ContentRow {
    pub id: Uuid,
    pub content_key: String,
    pub title: String,
    pub content: String,
    pub language: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ContentRow> for CorporateContent {
    type Error = DomainError;

    fn try_from(r: ContentRow) -> Result<Self, Self::Error> {
        Ok(CorporateContent {
            id: r.id,
            key: r.content_key.parse::<ContentKey>()?,
            title: r.title,
            content: r.content,
            language: r.language,
            active: r.active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

impl From<&CorporateContent> for ContentRow {
    fn from(c: &CorporateContent) -> Self {
        ContentRow {
            id: c.id,
            content_key: c.key.as_str().to_string(),
            title: c.title.clone(),
            content: c.content.clone(),
            language: c.language.clone(),
            active: c.active,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = admins)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AdminRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub role: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<AdminRow> for Admin {
    fn from(r: AdminRow) -> Self {
        Admin {
            id: r.id,
            username: r.username,
            password_hash: r.password_hash,
            email: r.email,
            role: r.role,
            enabled: r.enabled,
            created_at: r.created_at,
            last_login_at: r.last_login_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = admins)]
pub struct NewAdminRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub role: String,
}
