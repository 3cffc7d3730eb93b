use chrono::Utc;
use diesel::dsl::exists;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::admin::{Admin, NewAdmin};
use crate::domain::errors::DomainError;
use crate::domain::ports::AdminRepository;
use crate::schema::admins;

use super::models::{AdminRow, NewAdminRow};

pub struct DieselAdminRepository {
    pool: DbPool,
}

impl DieselAdminRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl AdminRepository for DieselAdminRepository {
    fn find_by_username(&self, username: &str) -> Result<Option<Admin>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = admins::table
            .filter(admins::username.eq(username))
            .select(AdminRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Admin::from))
    }

    fn exists(&self, username: &str) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let found = diesel::select(exists(admins::table.filter(admins::username.eq(username))))
            .get_result(&mut conn)?;
        Ok(found)
    }

    fn insert(&self, admin: NewAdmin) -> Result<Admin, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(admins::table)
            .values(&NewAdminRow {
                id: Uuid::new_v4(),
                username: admin.username,
                password_hash: admin.password_hash,
                email: admin.email,
                role: admin.role,
            })
            .returning(AdminRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn touch_last_login(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::update(admins::table.find(id))
            .set(admins::last_login_at.eq(Some(Utc::now())))
            .execute(&mut conn)?;
        Ok(())
    }
}
