use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::knife::{Knife, KnifeDraft, KnifeFilter, StockCheck};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::ports::{CategoryRepository, KnifeRepository};

#[derive(Debug, Clone, PartialEq)]
pub struct StockBatch {
    pub all_available: bool,
    pub items: Vec<StockCheck>,
    pub total_items: usize,
}

pub struct KnifeService {
    knives: Arc<dyn KnifeRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl KnifeService {
    pub fn new(knives: Arc<dyn KnifeRepository>, categories: Arc<dyn CategoryRepository>) -> Self {
        Self { knives, categories }
    }

    pub fn search(&self, filter: &KnifeFilter, page: PageRequest) -> Result<Page<Knife>, DomainError> {
        self.knives.search(filter, page)
    }

    pub fn get(&self, id: Uuid) -> Result<Knife, DomainError> {
        self.knives
            .find_by_id(id)?
            .ok_or_else(|| DomainError::not_found("Knife", id))
    }

    pub fn get_by_name(&self, name: &str) -> Result<Knife, DomainError> {
        self.knives
            .find_by_name(name)?
            .ok_or_else(|| DomainError::not_found("Knife", name))
    }

    /// Normalises a draft and resolves its category without storing anything.
    /// For an update (`existing` set) the knife must exist and its current
    /// image is carried over. Runs before any image upload.
    pub fn prepare(&self, existing: Option<Uuid>, draft: KnifeDraft) -> Result<KnifeDraft, DomainError> {
        let current_image = match existing {
            Some(id) => self.get(id)?.image_url,
            None => None,
        };
        let mut draft = draft.normalized()?;
        draft.category_name = self.category_name(draft.category_id)?;
        draft.image_url = current_image;
        Ok(draft)
    }

    /// Stores a new knife. `image_url` is the already-uploaded image, if any.
    pub fn add(&self, draft: KnifeDraft, image_url: Option<String>) -> Result<Knife, DomainError> {
        let mut draft = self.prepare(None, draft)?;
        draft.image_url = image_url;
        let knife = self.knives.insert(draft)?;
        log::info!("Knife {} added ({})", knife.id, knife.name);
        Ok(knife)
    }

    /// Replaces a knife. The stored image is kept unless a new one was uploaded.
    pub fn update(
        &self,
        id: Uuid,
        draft: KnifeDraft,
        image_url: Option<String>,
    ) -> Result<Knife, DomainError> {
        let mut draft = self.prepare(Some(id), draft)?;
        if image_url.is_some() {
            draft.image_url = image_url;
        }
        let knife = self
            .knives
            .update(id, draft)?
            .ok_or_else(|| DomainError::not_found("Knife", id))?;
        log::info!("Knife {} updated", id);
        Ok(knife)
    }

    pub fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.knives.delete(id)? {
            return Err(DomainError::not_found("Knife", id));
        }
        log::info!("Knife {} deleted", id);
        Ok(())
    }

    pub fn knife_types(&self) -> Result<Vec<String>, DomainError> {
        self.knives.knife_types()
    }

    pub fn count_by_category(&self, category_id: i32) -> Result<i64, DomainError> {
        self.knives.count_by_category(category_id)
    }

    /// Subtracts `quantity` with a single conditional update so concurrent
    /// orders can never drive stock below zero.
    pub fn decrement_stock_atomic(&self, id: Uuid, quantity: i32) -> Result<Knife, DomainError> {
        if quantity <= 0 {
            return Err(DomainError::InvalidInput(
                "Decrement amount must be positive".to_string(),
            ));
        }
        if let Some(knife) = self.knives.decrement_stock(id, quantity)? {
            log::info!(
                "Stock for {} decremented by {}, {} left",
                knife.name,
                quantity,
                knife.stock_quantity
            );
            return Ok(knife);
        }
        match self.knives.find_by_id(id)? {
            None => Err(DomainError::not_found("Product", id)),
            Some(knife) => {
                log::info!(
                    "Insufficient stock for {}. Requested: {}, Available: {}",
                    knife.name,
                    quantity,
                    knife.stock_quantity
                );
                Err(DomainError::InsufficientStock {
                    name: knife.name,
                    requested: quantity,
                    available: knife.stock_quantity,
                })
            }
        }
    }

    pub fn increment_stock(&self, id: Uuid, quantity: i32) -> Result<(), DomainError> {
        if quantity <= 0 {
            log::warn!("Ignoring non-positive stock increment of {} for {}", quantity, id);
            return Ok(());
        }
        self.knives.increment_stock(id, quantity)
    }

    pub fn check_stock(&self, knife_id: Uuid, quantity: i32) -> Result<StockCheck, DomainError> {
        let knife = self.knives.find_by_id(knife_id)?;
        Ok(StockCheck::evaluate(knife_id, knife.as_ref(), quantity))
    }

    pub fn check_stock_batch(&self, items: &[(Uuid, i32)]) -> Result<StockBatch, DomainError> {
        let checks = items
            .iter()
            .map(|(id, quantity)| self.check_stock(*id, *quantity))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StockBatch {
            all_available: checks.iter().all(|c| c.available),
            total_items: checks.len(),
            items: checks,
        })
    }

    fn category_name(&self, category_id: i32) -> Result<Option<String>, DomainError> {
        Ok(self.categories.find_by_id(category_id)?.map(|c| c.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::Category;
    use crate::domain::knife::fixtures::{draft, knife};
    use crate::testing::{money, Fakes};

    #[test]
    fn add_normalizes_discount_and_resolves_category_name() {
        let fakes = Fakes::new();
        fakes
            .categories
            .insert(Category {
                id: 1,
                name: "Folding".to_string(),
                description: None,
                icon: None,
                display_order: 1,
                is_active: true,
            })
            .expect("service call");
        let service = fakes.knife_service();

        let mut d = draft("Ranger", "120.00", 4);
        d.discount_price = money("130.00");
        let knife = service
            .add(d, Some("https://cdn.test/a.jpg".to_string()))
            .expect("service call");

        assert_eq!(knife.discount_price, money("120.00"));
        assert_eq!(knife.category_name.as_deref(), Some("Folding"));
        assert_eq!(knife.image_url.as_deref(), Some("https://cdn.test/a.jpg"));
    }

    #[test]
    fn add_with_unknown_category_leaves_name_empty() {
        let fakes = Fakes::new();
        let mut d = draft("Ranger", "120.00", 4);
        d.category_id = 42;
        let knife = fakes.knife_service().add(d, None).expect("service call");
        assert!(knife.category_name.is_none());
    }

    #[test]
    fn update_keeps_image_when_none_uploaded() {
        let fakes = Fakes::new();
        let service = fakes.knife_service();
        let created = service
            .add(draft("Ranger", "120.00", 4), Some("https://cdn.test/a.jpg".to_string()))
            .expect("service call");

        let updated = service
            .update(created.id, draft("Ranger II", "150.00", 2), None)
            .expect("service call");

        assert_eq!(updated.name, "Ranger II");
        assert_eq!(updated.image_url.as_deref(), Some("https://cdn.test/a.jpg"));
    }

    #[test]
    fn update_of_missing_knife_is_not_found() {
        let fakes = Fakes::new();
        let result = fakes
            .knife_service()
            .update(Uuid::new_v4(), draft("Ghost", "10", 1), None);
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[test]
    fn prepare_rejects_before_anything_is_stored() {
        let fakes = Fakes::new();
        let service = fakes.knife_service();

        let mut bad = draft("Ranger", "120.00", 4);
        bad.price = money("0");
        assert!(matches!(service.prepare(None, bad), Err(DomainError::InvalidInput(_))));
        assert!(matches!(
            service.prepare(Some(Uuid::new_v4()), draft("Ghost", "10", 1)),
            Err(DomainError::NotFound(_))
        ));
        assert_eq!(service.count_by_category(1).expect("service call"), 0);
    }

    #[test]
    fn delete_of_missing_knife_is_not_found() {
        let fakes = Fakes::new();
        assert!(matches!(
            fakes.knife_service().delete(Uuid::new_v4()),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn decrement_reduces_stock_when_enough_is_left() {
        let fakes = Fakes::new();
        let k = fakes.add_knife(knife("Bowie", "90", 5));
        let updated = fakes.knife_service().decrement_stock_atomic(k.id, 3).expect("service call");
        assert_eq!(updated.stock_quantity, 2);
        assert_eq!(fakes.knives.stock_of(k.id), Some(2));
    }

    #[test]
    fn decrement_beyond_stock_reports_available_quantity() {
        let fakes = Fakes::new();
        let k = fakes.add_knife(knife("Bowie", "90", 2));
        let err = fakes
            .knife_service()
            .decrement_stock_atomic(k.id, 3)
            .unwrap_err();
        match err {
            DomainError::InsufficientStock {
                name,
                requested,
                available,
            } => {
                assert_eq!(name, "Bowie");
                assert_eq!(requested, 3);
                assert_eq!(available, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(fakes.knives.stock_of(k.id), Some(2));
    }

    #[test]
    fn decrement_of_missing_knife_is_not_found() {
        let fakes = Fakes::new();
        assert!(matches!(
            fakes.knife_service().decrement_stock_atomic(Uuid::new_v4(), 1),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn decrement_requires_positive_amount() {
        let fakes = Fakes::new();
        let k = fakes.add_knife(knife("Bowie", "90", 2));
        assert!(matches!(
            fakes.knife_service().decrement_stock_atomic(k.id, 0),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn non_positive_increment_is_a_no_op() {
        let fakes = Fakes::new();
        let k = fakes.add_knife(knife("Bowie", "90", 2));
        fakes.knife_service().increment_stock(k.id, -4).expect("service call");
        assert_eq!(fakes.knives.stock_of(k.id), Some(2));
    }

    #[test]
    fn batch_check_reports_every_item() {
        let fakes = Fakes::new();
        let plenty = fakes.add_knife(knife("Bowie", "90", 10));
        let empty = fakes.add_knife(knife("Kukri", "90", 0));

        let batch = fakes
            .knife_service()
            .check_stock_batch(&[(plenty.id, 2), (empty.id, 1)])
            .expect("service call");

        assert!(!batch.all_available);
        assert_eq!(batch.total_items, 2);
        assert!(batch.items[0].available);
        assert_eq!(batch.items[1].reason.as_deref(), Some("Out of stock"));
    }
}
