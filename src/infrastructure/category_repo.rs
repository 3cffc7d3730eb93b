use std::collections::HashMap;

use diesel::dsl::count_star;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::category::{Category, CategoryCount};
use crate::domain::errors::DomainError;
use crate::domain::ports::CategoryRepository;
use crate::schema::{categories, knives};

use super::models::CategoryRow;

pub struct DieselCategoryRepository {
    pool: DbPool,
}

impl DieselCategoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CategoryRepository for DieselCategoryRepository {
    fn list(&self) -> Result<Vec<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = categories::table
            .select(CategoryRow::as_select())
            .order((categories::display_order.asc(), categories::id.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    fn find_by_id(&self, id: i32) -> Result<Option<Category>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = categories::table
            .find(id)
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Category::from))
    }

    fn insert(&self, category: Category) -> Result<Category, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(categories::table)
            .values(CategoryRow::from(category))
            .returning(CategoryRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn save(&self, category: Category) -> Result<Category, DomainError> {
        let mut conn = self.pool.get()?;
        let id = category.id;
        let changes = CategoryRow::from(category);
        let row = diesel::update(categories::table.find(id))
            .set(&changes)
            .returning(CategoryRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .ok_or_else(|| DomainError::not_found("Category", id))?;
        Ok(row.into())
    }

    fn delete(&self, id: i32) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(categories::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn set_display_orders(&self, orders: &[(i32, i32)]) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            for (id, order) in orders {
                diesel::update(categories::table.find(*id))
                    .set(categories::display_order.eq(*order))
                    .execute(conn)?;
            }
            Ok(())
        })
    }

    fn product_counts(&self) -> Result<Vec<CategoryCount>, DomainError> {
        let categories = self.list()?;
        let mut conn = self.pool.get()?;
        let counts: HashMap<i32, i64> = knives::table
            .group_by(knives::category_id)
            .select((knives::category_id, count_star()))
            .load::<(i32, i64)>(&mut conn)?
            .into_iter()
            .collect();

        Ok(categories
            .into_iter()
            .map(|c| CategoryCount {
                product_count: counts.get(&c.id).copied().unwrap_or(0),
                category_id: c.id,
                category_name: c.name,
            })
            .collect())
    }
}
