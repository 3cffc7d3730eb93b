use diesel::prelude::*;
use diesel::upsert::excluded;

use crate::db::DbPool;
use crate::domain::content::{ContentKey, CorporateContent};
use crate::domain::errors::DomainError;
use crate::domain::ports::ContentRepository;
use crate::schema::corporate_content;

use super::models::ContentRow;

pub struct DieselContentRepository {
    pool: DbPool,
}

impl DieselContentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ContentRepository for DieselContentRepository {
    fn find(&self, key: ContentKey) -> Result<Option<CorporateContent>, DomainError> {
        let mut conn = self.pool.get()?;
        corporate_content::table
            .filter(corporate_content::content_key.eq(key.as_str()))
            .select(ContentRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(CorporateContent::try_from)
            .transpose()
    }

    fn list(&self, active_only: bool) -> Result<Vec<CorporateContent>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut query = corporate_content::table
            .select(ContentRow::as_select())
            .into_boxed();
        if active_only {
            query = query.filter(corporate_content::active.eq(true));
        }
        query
            .order(corporate_content::content_key.asc())
            .load(&mut conn)?
            .into_iter()
            .map(CorporateContent::try_from)
            .collect()
    }

    fn upsert(&self, content: CorporateContent) -> Result<CorporateContent, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(corporate_content::table)
            .values(&ContentRow::from(&content))
            .on_conflict(corporate_content::content_key)
            .do_update()
            .set((
                corporate_content::title.eq(excluded(corporate_content::title)),
                corporate_content::content.eq(excluded(corporate_content::content)),
                corporate_content::active.eq(excluded(corporate_content::active)),
                corporate_content::updated_at.eq(excluded(corporate_content::updated_at)),
            ))
            .returning(ContentRow::as_returning())
            .get_result(&mut conn)?;
        CorporateContent::try_from(row)
    }
}
