pub mod admin_repo;
pub mod category_repo;
pub mod cloudinary;
pub mod content_repo;
pub mod knife_repo;
pub mod models;
pub mod order_repo;

#[cfg(test)]
pub(crate) mod test_db;

use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::domain::errors::DomainError;

pub(crate) const DUPLICATE_RECORD: &str = "A record with the same unique value already exists";

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                log::warn!(
                    "Unique constraint {} violated: {}",
                    info.constraint_name().unwrap_or("<unknown>"),
                    info.message()
                );
                DomainError::Conflict(DUPLICATE_RECORD.to_string())
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

/// `%term%` for ILIKE filters, with `\\`, `%` and `_` taken literally.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.trim().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
