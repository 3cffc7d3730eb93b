use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::knife::{non_empty, Knife, KnifeDraft, KnifeFilter, SortDirection};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::ports::KnifeRepository;
use crate::schema::knives;

use super::contains_pattern;
use super::models::{KnifeChangeset, KnifeRow};

pub struct DieselKnifeRepository {
    pool: DbPool,
}

impl DieselKnifeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn filtered(filter: &KnifeFilter) -> knives::BoxedQuery<'static, Pg> {
    let mut query = knives::table.into_boxed();
    if let Some(term) = non_empty(&filter.search_term) {
        query = query.filter(knives::name.ilike(contains_pattern(term)).escape('\\'));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(knives::category_id.eq(category_id));
    }
    if let Some(min) = &filter.min_price {
        query = query.filter(knives::price.ge(min.clone()));
    }
    if let Some(max) = &filter.max_price {
        query = query.filter(knives::price.le(max.clone()));
    }
    if let Some(knife_type) = non_empty(&filter.knife_type) {
        query = query.filter(knives::knife_type.eq(knife_type.to_string()));
    }
    if let Some(material) = non_empty(&filter.blade_material) {
        query = query.filter(knives::blade_material.eq(material.to_string()));
    }
    query
}

fn duplicate_name(e: DieselError, name: &str) -> DomainError {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            DomainError::Conflict(format!("A knife named '{}' already exists", name))
        }
        other => other.into(),
    }
}

impl KnifeRepository for DieselKnifeRepository {
    fn search(&self, filter: &KnifeFilter, page: PageRequest) -> Result<Page<Knife>, DomainError> {
        let mut conn = self.pool.get()?;

        let total: i64 = filtered(filter).count().get_result(&mut conn)?;

        let query = filtered(filter).select(KnifeRow::as_select());
        let query = match filter.sort {
            SortDirection::Asc => query.order((knives::price.asc(), knives::id.asc())),
            SortDirection::Desc => query.order((knives::price.desc(), knives::id.asc())),
        };
        let rows = query
            .limit(page.size)
            .offset(page.offset())
            .load(&mut conn)?;

        Ok(Page::new(
            rows.into_iter().map(Knife::from).collect(),
            page,
            total,
        ))
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Knife>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = knives::table
            .find(id)
            .select(KnifeRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Knife::from))
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Knife>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = knives::table
            .filter(knives::name.eq(name))
            .select(KnifeRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Knife::from))
    }

    fn insert(&self, draft: KnifeDraft) -> Result<Knife, DomainError> {
        let mut conn = self.pool.get()?;
        let name = draft.name.clone();
        let values = KnifeChangeset::from(draft);
        let row = diesel::insert_into(knives::table)
            .values((knives::id.eq(Uuid::new_v4()), &values))
            .returning(KnifeRow::as_returning())
            .get_result(&mut conn)
            .map_err(|e| duplicate_name(e, &name))?;
        Ok(row.into())
    }

    fn update(&self, id: Uuid, draft: KnifeDraft) -> Result<Option<Knife>, DomainError> {
        let mut conn = self.pool.get()?;
        let name = draft.name.clone();
        let values = KnifeChangeset::from(draft);
        let row = diesel::update(knives::table.find(id))
            .set(&values)
            .returning(KnifeRow::as_returning())
            .get_result(&mut conn)
            .optional()
            .map_err(|e| duplicate_name(e, &name))?;
        Ok(row.map(Knife::from))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(knives::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn knife_types(&self) -> Result<Vec<String>, DomainError> {
        let mut conn = self.pool.get()?;
        let types = knives::table
            .select(knives::knife_type)
            .filter(knives::knife_type.ne(""))
            .distinct()
            .order(knives::knife_type.asc())
            .load::<String>(&mut conn)?;
        Ok(types)
    }

    fn count_by_category(&self, category_id: i32) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;
        let count = knives::table
            .filter(knives::category_id.eq(category_id))
            .count()
            .get_result(&mut conn)?;
        Ok(count)
    }

    fn decrement_stock(&self, id: Uuid, quantity: i32) -> Result<Option<Knife>, DomainError> {
        let mut conn = self.pool.get()?;
        // Check and subtract in one statement; concurrent orders serialise on the row lock.
        let row = diesel::update(
            knives::table
                .filter(knives::id.eq(id))
                .filter(knives::stock_quantity.ge(quantity)),
        )
        .set((
            knives::stock_quantity.eq(knives::stock_quantity - quantity),
            knives::updated_at.eq(Utc::now()),
        ))
        .returning(KnifeRow::as_returning())
        .get_result(&mut conn)
        .optional()?;
        Ok(row.map(Knife::from))
    }

    fn increment_stock(&self, id: Uuid, quantity: i32) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::update(knives::table.find(id))
            .set((
                knives::stock_quantity.eq(knives::stock_quantity + quantity),
                knives::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use bigdecimal::BigDecimal;

    use super::DieselKnifeRepository;
    use crate::domain::errors::DomainError;
    use crate::domain::knife::fixtures::draft;
    use crate::domain::knife::{KnifeFilter, SortDirection};
    use crate::domain::pagination::PageRequest;
    use crate::domain::ports::KnifeRepository;
    use crate::infrastructure::test_db::setup_db;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    #[tokio::test]
    async fn insert_and_find_roundtrip() {
        let (_container, pool) = setup_db().await;
        let repo = DieselKnifeRepository::new(pool);

        let created = repo.insert(draft("Ranger", "149.90", 3)).expect("insert failed");
        let by_id = repo
            .find_by_id(created.id)
            .expect("find failed")
            .expect("knife should exist");
        let by_name = repo
            .find_by_name("Ranger")
            .expect("find failed")
            .expect("knife should exist");

        assert_eq!(by_id.id, created.id);
        assert_eq!(by_name.price, dec("149.90"));
        assert_eq!(by_name.knife_sizes, vec!["M".to_string(), "L".to_string()]);
    }

    #[tokio::test]
    async fn duplicate_name_is_a_conflict() {
        let (_container, pool) = setup_db().await;
        let repo = DieselKnifeRepository::new(pool);
        repo.insert(draft("Ranger", "10", 1)).expect("insert failed");

        let err = repo.insert(draft("Ranger", "20", 1)).expect_err("should conflict");
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn search_filters_sorts_and_paginates() {
        let (_container, pool) = setup_db().await;
        let repo = DieselKnifeRepository::new(pool);
        for (name, price) in [("Hunter A", "30"), ("Hunter B", "10"), ("Chef", "20"), ("Hunter C", "50")] {
            repo.insert(draft(name, price, 1)).expect("insert failed");
        }

        let filter = KnifeFilter {
            search_term: Some("hunter".to_string()),
            max_price: Some(dec("40")),
            sort: SortDirection::Desc,
            ..Default::default()
        };
        let page = repo
            .search(&filter, PageRequest::new(1, 1))
            .expect("search failed");

        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Hunter A");
    }

    #[tokio::test]
    async fn search_term_wildcards_match_literally() {
        let (_container, pool) = setup_db().await;
        let repo = DieselKnifeRepository::new(pool);
        for name in ["Santoku 50% Off", "Santoku 500", "Gyuto_X", "GyutoAX"] {
            repo.insert(draft(name, "10", 1)).expect("insert failed");
        }

        for (term, expected) in [("50%", "Santoku 50% Off"), ("o_x", "Gyuto_X")] {
            let filter = KnifeFilter {
                search_term: Some(term.to_string()),
                ..Default::default()
            };
            let page = repo
                .search(&filter, PageRequest::default())
                .expect("search failed");
            let names: Vec<_> = page.items.iter().map(|k| k.name.as_str()).collect();
            assert_eq!(names, vec![expected]);
        }
    }

    #[tokio::test]
    async fn conditional_decrement_never_goes_negative() {
        let (_container, pool) = setup_db().await;
        let repo = Arc::new(DieselKnifeRepository::new(pool));
        let knife = repo.insert(draft("Bowie", "90", 5)).expect("insert failed");
        let id = knife.id;

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let repo = repo.clone();
                std::thread::spawn(move || repo.decrement_stock(id, 1).expect("update failed"))
            })
            .collect();
        let succeeded = handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .filter(Option::is_some)
            .count();

        assert_eq!(succeeded, 5);
        let after = repo
            .find_by_id(id)
            .expect("find failed")
            .expect("knife should exist");
        assert_eq!(after.stock_quantity, 0);

        repo.increment_stock(id, 2).expect("increment failed");
        let restored = repo
            .find_by_id(id)
            .expect("find failed")
            .expect("knife should exist");
        assert_eq!(restored.stock_quantity, 2);
    }

    #[tokio::test]
    async fn knife_types_are_distinct_and_sorted() {
        let (_container, pool) = setup_db().await;
        let repo = DieselKnifeRepository::new(pool);
        let mut a = draft("A", "10", 1);
        a.knife_type = "Hunting".to_string();
        let mut b = draft("B", "10", 1);
        b.knife_type = "Chef".to_string();
        let mut c = draft("C", "10", 1);
        c.knife_type = "Hunting".to_string();
        for d in [a, b, c] {
            repo.insert(d).expect("insert failed");
        }

        assert_eq!(
            repo.knife_types().expect("types failed"),
            vec!["Chef".to_string(), "Hunting".to_string()]
        );
        assert_eq!(repo.count_by_category(1).expect("count failed"), 3);
    }
}
