use std::sync::Arc;

use crate::domain::content::{ContentKey, ContentUpdate, CorporateContent};
use crate::domain::errors::DomainError;
use crate::domain::ports::ContentRepository;

pub struct ContentService {
    content: Arc<dyn ContentRepository>,
}

impl ContentService {
    pub fn new(content: Arc<dyn ContentRepository>) -> Self {
        Self { content }
    }

    pub fn public(&self, key: ContentKey) -> Result<CorporateContent, DomainError> {
        self.content
            .find(key)?
            .filter(|c| c.active)
            .ok_or_else(|| DomainError::NotFound(format!("Content not found or inactive: {}", key)))
    }

    pub fn public_all(&self) -> Result<Vec<CorporateContent>, DomainError> {
        self.content.list(true)
    }

    pub fn admin_all(&self) -> Result<Vec<CorporateContent>, DomainError> {
        self.content.list(false)
    }

    pub fn upsert(&self, key: ContentKey, update: ContentUpdate) -> Result<CorporateContent, DomainError> {
        let content = match self.content.find(key)? {
            Some(mut existing) => {
                existing.apply(update);
                existing
            }
            None => CorporateContent::new(key, update),
        };
        let saved = self.content.upsert(content)?;
        log::info!("Corporate content {} saved", key);
        Ok(saved)
    }
}
