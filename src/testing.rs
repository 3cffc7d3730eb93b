//! In-memory port implementations shared by service and handler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::application::auth_service::{AuthService, AuthSettings};
use crate::application::category_service::CategoryService;
use crate::application::content_service::ContentService;
use crate::application::knife_service::KnifeService;
use crate::application::order_service::OrderService;
use crate::domain::admin::{Admin, NewAdmin};
use crate::domain::category::{sort_by_display_order, Category, CategoryCount};
use crate::domain::content::{ContentKey, CorporateContent};
use crate::domain::errors::DomainError;
use crate::domain::knife::{Knife, KnifeDraft, KnifeFilter, SortDirection};
use crate::domain::order::{Order, OrderSearch, StatusUpdate};
use crate::domain::order_status::OrderStatus;
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::ports::{
    AdminRepository, CategoryRepository, ContentRepository, ImageStore, KnifeRepository,
    OrderRepository,
};
use crate::handlers::AppState;

fn paginate<T: Clone>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let total = items.len() as i64;
    let slice = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.size as usize)
        .collect();
    Page::new(slice, page, total)
}

// ── Knives ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryKnives {
    knives: Mutex<Vec<Knife>>,
}

impl InMemoryKnives {
    pub fn stock_of(&self, id: Uuid) -> Option<i32> {
        self.knives
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.id == id)
            .map(|k| k.stock_quantity)
    }
}

fn knife_from_draft(id: Uuid, draft: KnifeDraft) -> Knife {
    let now = Utc::now();
    Knife {
        id,
        name: draft.name,
        category_id: draft.category_id,
        category_name: draft.category_name,
        description: draft.description,
        price: draft.price,
        discount_price: draft.discount_price,
        percentage_discount: draft.percentage_discount,
        stock_quantity: draft.stock_quantity,
        tags: draft.tags,
        image_url: draft.image_url,
        knife_type: draft.knife_type,
        blade_length: draft.blade_length,
        color: draft.color,
        blade_material: draft.blade_material,
        handle_material: draft.handle_material,
        knife_sizes: draft.knife_sizes,
        created_at: now,
        updated_at: now,
    }
}

impl KnifeRepository for InMemoryKnives {
    fn search(&self, filter: &KnifeFilter, page: PageRequest) -> Result<Page<Knife>, DomainError> {
        let mut hits: Vec<Knife> = self
            .knives
            .lock()
            .unwrap()
            .iter()
            .filter(|k| filter.matches(k))
            .cloned()
            .collect();
        hits.sort_by(|a, b| match filter.sort {
            SortDirection::Asc => a.price.cmp(&b.price),
            SortDirection::Desc => b.price.cmp(&a.price),
        });
        Ok(paginate(hits, page))
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Knife>, DomainError> {
        Ok(self.knives.lock().unwrap().iter().find(|k| k.id == id).cloned())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Knife>, DomainError> {
        Ok(self
            .knives
            .lock()
            .unwrap()
            .iter()
            .find(|k| k.name == name)
            .cloned())
    }

    fn insert(&self, draft: KnifeDraft) -> Result<Knife, DomainError> {
        let mut knives = self.knives.lock().unwrap();
        if knives.iter().any(|k| k.name == draft.name) {
            return Err(DomainError::Conflict(format!(
                "A knife named '{}' already exists",
                draft.name
            )));
        }
        let knife = knife_from_draft(Uuid::new_v4(), draft);
        knives.push(knife.clone());
        Ok(knife)
    }

    fn update(&self, id: Uuid, draft: KnifeDraft) -> Result<Option<Knife>, DomainError> {
        let mut knives = self.knives.lock().unwrap();
        let Some(slot) = knives.iter_mut().find(|k| k.id == id) else {
            return Ok(None);
        };
        let created_at = slot.created_at;
        *slot = knife_from_draft(id, draft);
        slot.created_at = created_at;
        Ok(Some(slot.clone()))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut knives = self.knives.lock().unwrap();
        let before = knives.len();
        knives.retain(|k| k.id != id);
        Ok(knives.len() != before)
    }

    fn knife_types(&self) -> Result<Vec<String>, DomainError> {
        let mut types: Vec<String> = self
            .knives
            .lock()
            .unwrap()
            .iter()
            .map(|k| k.knife_type.clone())
            .filter(|t| !t.is_empty())
            .collect();
        types.sort();
        types.dedup();
        Ok(types)
    }

    fn count_by_category(&self, category_id: i32) -> Result<i64, DomainError> {
        Ok(self
            .knives
            .lock()
            .unwrap()
            .iter()
            .filter(|k| k.category_id == category_id)
            .count() as i64)
    }

    fn decrement_stock(&self, id: Uuid, quantity: i32) -> Result<Option<Knife>, DomainError> {
        let mut knives = self.knives.lock().unwrap();
        match knives
            .iter_mut()
            .find(|k| k.id == id && k.stock_quantity >= quantity)
        {
            Some(knife) => {
                knife.stock_quantity -= quantity;
                Ok(Some(knife.clone()))
            }
            None => Ok(None),
        }
    }

    fn increment_stock(&self, id: Uuid, quantity: i32) -> Result<(), DomainError> {
        if let Some(knife) = self.knives.lock().unwrap().iter_mut().find(|k| k.id == id) {
            knife.stock_quantity += quantity;
        }
        Ok(())
    }
}

// ── Categories ───────────────────────────────────────────────────────────────

pub struct InMemoryCategories {
    categories: Mutex<Vec<Category>>,
    knives: Arc<InMemoryKnives>,
}

impl InMemoryCategories {
    pub fn new(knives: Arc<InMemoryKnives>) -> Self {
        Self {
            categories: Mutex::new(vec![]),
            knives,
        }
    }
}

impl CategoryRepository for InMemoryCategories {
    fn list(&self) -> Result<Vec<Category>, DomainError> {
        let mut all = self.categories.lock().unwrap().clone();
        sort_by_display_order(&mut all);
        Ok(all)
    }

    fn find_by_id(&self, id: i32) -> Result<Option<Category>, DomainError> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    fn insert(&self, category: Category) -> Result<Category, DomainError> {
        self.categories.lock().unwrap().push(category.clone());
        Ok(category)
    }

    fn save(&self, category: Category) -> Result<Category, DomainError> {
        let mut categories = self.categories.lock().unwrap();
        match categories.iter_mut().find(|c| c.id == category.id) {
            Some(slot) => *slot = category.clone(),
            None => return Err(DomainError::not_found("Category", category.id)),
        }
        Ok(category)
    }

    fn delete(&self, id: i32) -> Result<bool, DomainError> {
        let mut categories = self.categories.lock().unwrap();
        let before = categories.len();
        categories.retain(|c| c.id != id);
        Ok(categories.len() != before)
    }

    fn set_display_orders(&self, orders: &[(i32, i32)]) -> Result<(), DomainError> {
        let mut categories = self.categories.lock().unwrap();
        for (id, order) in orders {
            if let Some(c) = categories.iter_mut().find(|c| c.id == *id) {
                c.display_order = *order;
            }
        }
        Ok(())
    }

    fn product_counts(&self) -> Result<Vec<CategoryCount>, DomainError> {
        self.list()?
            .into_iter()
            .map(|c| {
                Ok(CategoryCount {
                    category_id: c.id,
                    category_name: c.name,
                    product_count: self.knives.count_by_category(c.id)?,
                })
            })
            .collect()
    }
}

// ── Orders ───────────────────────────────────────────────────────────────────

/// Outbox events recorded as `(event_type, aggregate_id)`.
pub type RecordedEvents = Mutex<Vec<(String, Uuid)>>;

#[derive(Default)]
pub struct InMemoryOrders {
    orders: Mutex<HashMap<Uuid, Order>>,
    pub events: RecordedEvents,
    pub fail_inserts: AtomicBool,
}

impl InMemoryOrders {
    pub fn put(&self, order: Order) {
        self.orders.lock().unwrap().insert(order.id, order);
    }

    pub fn count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    fn sorted(&self, ascending: bool) -> Vec<Order> {
        let mut all: Vec<Order> = self.orders.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| {
            let ord = a.order_date.cmp(&b.order_date).then(a.id.cmp(&b.id));
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        });
        all
    }
}

impl OrderRepository for InMemoryOrders {
    fn insert(&self, order: &Order) -> Result<(), DomainError> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(DomainError::Internal("insert failed".to_string()));
        }
        self.put(order.clone());
        self.events
            .lock()
            .unwrap()
            .push(("OrderCreated".to_string(), order.id));
        Ok(())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.orders.lock().unwrap().get(&id).cloned())
    }

    fn list_all(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.sorted(false))
    }

    fn by_status(&self, status_code: i32) -> Result<Vec<Order>, DomainError> {
        Ok(self
            .sorted(false)
            .into_iter()
            .filter(|o| o.status_code == status_code)
            .collect())
    }

    fn search(&self, criteria: &OrderSearch, page: PageRequest) -> Result<Page<Order>, DomainError> {
        let hits = self
            .sorted(criteria.ascending)
            .into_iter()
            .filter(|o| criteria.matches(o))
            .collect();
        Ok(paginate(hits, page))
    }

    fn in_period(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Order>, DomainError> {
        Ok(self
            .sorted(true)
            .into_iter()
            .filter(|o| start.map_or(true, |s| o.order_date >= s))
            .filter(|o| end.map_or(true, |e| o.order_date <= e))
            .collect())
    }

    fn count_in_period(&self, start: NaiveDate, end: NaiveDate) -> Result<i64, DomainError> {
        Ok(self.in_period(Some(start), Some(end))?.len() as i64)
    }

    fn count_for_date(&self, date: NaiveDate) -> Result<i64, DomainError> {
        self.count_in_period(date, date)
    }

    fn update_status(&self, id: Uuid, update: &StatusUpdate) -> Result<Option<Order>, DomainError> {
        let mut orders = self.orders.lock().unwrap();
        let Some(order) = orders.get_mut(&id) else {
            return Ok(None);
        };
        order.apply_status_update(update);
        if !order.email.is_empty() {
            self.events
                .lock()
                .unwrap()
                .push(("OrderStatusChanged".to_string(), id));
        }
        Ok(Some(order.clone()))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.orders.lock().unwrap().remove(&id).is_some())
    }

    fn recent(&self, limit: i64) -> Result<Vec<Order>, DomainError> {
        Ok(self
            .sorted(false)
            .into_iter()
            .filter(|o| !OrderStatus::is_cancelled_or_returned(o.status_code))
            .take(limit.max(0) as usize)
            .collect())
    }

    fn without_order_number(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self
            .sorted(true)
            .into_iter()
            .filter(|o| o.order_number.is_empty())
            .collect())
    }

    fn order_numbers(&self) -> Result<Vec<String>, DomainError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .map(|o| o.order_number.clone())
            .filter(|n| !n.is_empty())
            .collect())
    }

    fn set_order_number(&self, id: Uuid, order_number: &str) -> Result<(), DomainError> {
        match self.orders.lock().unwrap().get_mut(&id) {
            Some(order) => {
                order.order_number = order_number.to_string();
                Ok(())
            }
            None => Err(DomainError::not_found("Order", id)),
        }
    }
}

// ── Content ──────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryContent {
    entries: Mutex<HashMap<ContentKey, CorporateContent>>,
}

impl ContentRepository for InMemoryContent {
    fn find(&self, key: ContentKey) -> Result<Option<CorporateContent>, DomainError> {
        Ok(self.entries.lock().unwrap().get(&key).cloned())
    }

    fn list(&self, active_only: bool) -> Result<Vec<CorporateContent>, DomainError> {
        let mut all: Vec<CorporateContent> = self
            .entries
            .lock()
            .unwrap()
            .values()
            .filter(|c| !active_only || c.active)
            .cloned()
            .collect();
        all.sort_by_key(|c| c.key.as_str());
        Ok(all)
    }

    fn upsert(&self, content: CorporateContent) -> Result<CorporateContent, DomainError> {
        self.entries
            .lock()
            .unwrap()
            .insert(content.key, content.clone());
        Ok(content)
    }
}

// ── Admins ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryAdmins {
    admins: Mutex<Vec<Admin>>,
}

impl AdminRepository for InMemoryAdmins {
    fn find_by_username(&self, username: &str) -> Result<Option<Admin>, DomainError> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.username == username)
            .cloned())
    }

    fn exists(&self, username: &str) -> Result<bool, DomainError> {
        Ok(self.find_by_username(username)?.is_some())
    }

    fn insert(&self, admin: NewAdmin) -> Result<Admin, DomainError> {
        let admin = Admin {
            id: Uuid::new_v4(),
            username: admin.username,
            password_hash: admin.password_hash,
            email: admin.email,
            role: admin.role,
            enabled: true,
            created_at: Utc::now(),
            last_login_at: None,
        };
        self.admins.lock().unwrap().push(admin.clone());
        Ok(admin)
    }

    fn touch_last_login(&self, id: Uuid) -> Result<(), DomainError> {
        if let Some(admin) = self.admins.lock().unwrap().iter_mut().find(|a| a.id == id) {
            admin.last_login_at = Some(Utc::now());
        }
        Ok(())
    }
}

impl InMemoryAdmins {
    pub fn disable(&self, username: &str) {
        if let Some(admin) = self
            .admins
            .lock()
            .unwrap()
            .iter_mut()
            .find(|a| a.username == username)
        {
            admin.enabled = false;
        }
    }
}

// ── Images ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeImageStore {
    pub uploads: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageStore for FakeImageStore {
    async fn upload(&self, base64_image: &str) -> Result<String, DomainError> {
        if base64_image.is_empty() {
            return Err(DomainError::InvalidInput("Image data is empty".to_string()));
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(base64_image.to_string());
        Ok(format!("https://cdn.test/image-{}.jpg", uploads.len()))
    }
}

// ── Wiring ───────────────────────────────────────────────────────────────────

pub const TEST_SECRET: &str = "test-secret-with-enough-entropy";

pub fn auth_settings() -> AuthSettings {
    AuthSettings {
        jwt_secret: TEST_SECRET.to_string(),
        expiration_hours: 1,
        // lowest cost bcrypt accepts
        bcrypt_cost: 4,
    }
}

/// Every in-memory port, kept reachable so tests can seed and inspect them.
pub struct Fakes {
    pub knives: Arc<InMemoryKnives>,
    pub categories: Arc<InMemoryCategories>,
    pub orders: Arc<InMemoryOrders>,
    pub content: Arc<InMemoryContent>,
    pub admins: Arc<InMemoryAdmins>,
    pub images: Arc<FakeImageStore>,
}

impl Fakes {
    pub fn new() -> Self {
        let knives = Arc::new(InMemoryKnives::default());
        Self {
            categories: Arc::new(InMemoryCategories::new(knives.clone())),
            knives,
            orders: Arc::new(InMemoryOrders::default()),
            content: Arc::new(InMemoryContent::default()),
            admins: Arc::new(InMemoryAdmins::default()),
            images: Arc::new(FakeImageStore::default()),
        }
    }

    pub fn add_knife(&self, knife: Knife) -> Knife {
        self.knives.knives.lock().unwrap().push(knife.clone());
        knife
    }

    pub fn add_category(&self, id: i32, name: &str) -> Category {
        self.categories
            .insert(Category {
                id,
                name: name.to_string(),
                description: None,
                icon: None,
                display_order: id,
                is_active: true,
            })
            .expect("insert category")
    }

    pub fn knife_service(&self) -> KnifeService {
        KnifeService::new(self.knives.clone(), self.categories.clone())
    }

    pub fn category_service(&self) -> CategoryService {
        CategoryService::new(self.categories.clone())
    }

    pub fn order_service(&self) -> OrderService {
        OrderService::new(self.orders.clone(), Arc::new(self.knife_service()))
    }

    pub fn content_service(&self) -> ContentService {
        ContentService::new(self.content.clone())
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.admins.clone(), auth_settings())
    }

    pub fn state(&self) -> AppState {
        AppState {
            knives: Arc::new(self.knife_service()),
            categories: Arc::new(self.category_service()),
            orders: Arc::new(self.order_service()),
            content: Arc::new(self.content_service()),
            auth: Arc::new(self.auth_service()),
            images: self.images.clone(),
        }
    }

    /// Seeds an admin and returns a bearer token for it.
    pub fn admin_token(&self) -> String {
        let auth = self.auth_service();
        auth.ensure_admin("admin", "Admin123!", "admin@kesik.com")
            .expect("seed admin");
        auth.login("admin", "Admin123!").expect("login").token
    }
}

pub fn money(s: &str) -> BigDecimal {
    s.parse().unwrap_or_else(|_| BigDecimal::zero())
}
