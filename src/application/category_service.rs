use std::sync::Arc;

use crate::domain::category::{Category, CategoryCount, CategoryDraft, CategoryPatch};
use crate::domain::errors::DomainError;
use crate::domain::ports::CategoryRepository;

pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    pub fn list_all(&self) -> Result<Vec<Category>, DomainError> {
        self.categories.list()
    }

    pub fn list_active(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self
            .categories
            .list()?
            .into_iter()
            .filter(|c| c.is_active)
            .collect())
    }

    pub fn get(&self, id: i32) -> Result<Category, DomainError> {
        self.categories
            .find_by_id(id)?
            .ok_or_else(|| DomainError::not_found("Category", id))
    }

    /// New categories take the next free id and, unless told otherwise,
    /// go to the end of the display order.
    pub fn add(&self, draft: CategoryDraft) -> Result<Category, DomainError> {
        let existing = self.categories.list()?;
        let max_id = existing.iter().map(|c| c.id).max().unwrap_or(0);
        let max_order = existing.iter().map(|c| c.display_order).max().unwrap_or(0);

        let category = self.categories.insert(Category {
            id: max_id + 1,
            name: draft.name,
            description: draft.description,
            icon: draft.icon,
            display_order: draft.display_order.unwrap_or(max_order + 1),
            is_active: draft.is_active.unwrap_or(true),
        })?;
        log::info!("Category {} added ({})", category.id, category.name);
        Ok(category)
    }

    pub fn update(&self, id: i32, patch: CategoryPatch) -> Result<Category, DomainError> {
        let mut category = self.get(id)?;
        category.apply(patch);
        self.categories.save(category)
    }

    pub fn delete(&self, id: i32) -> Result<(), DomainError> {
        if !self.categories.delete(id)? {
            return Err(DomainError::not_found("Category", id));
        }
        log::info!("Category {} deleted", id);
        Ok(())
    }

    pub fn toggle_active(&self, id: i32) -> Result<Category, DomainError> {
        let mut category = self.get(id)?;
        category.is_active = !category.is_active;
        self.categories.save(category)
    }

    /// Display order becomes the 1-based position in `ids`; unknown ids are skipped.
    pub fn reorder(&self, ids: &[i32]) -> Result<Vec<Category>, DomainError> {
        let known = self.categories.list()?;
        let orders: Vec<(i32, i32)> = ids
            .iter()
            .enumerate()
            .filter(|(_, id)| known.iter().any(|c| c.id == **id))
            .map(|(position, id)| (*id, position as i32 + 1))
            .collect();
        self.categories.set_display_orders(&orders)?;
        self.categories.list()
    }

    pub fn product_counts(&self) -> Result<Vec<CategoryCount>, DomainError> {
        self.categories.product_counts()
    }
}
