use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

pub const DEFAULT_LANGUAGE: &str = "TR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKey {
    ShippingDelivery,
    ReturnExchange,
    WarrantyConditions,
    Faq,
    MaintenanceGuide,
    AllProductsInfo,
    AboutUs,
    ContactInfo,
    Terms,
    Privacy,
    Cookies,
    SocialLinks,
    ShippingConfig,
}

impl ContentKey {
    pub const ALL: [ContentKey; 13] = [
        ContentKey::ShippingDelivery,
        ContentKey::ReturnExchange,
        ContentKey::WarrantyConditions,
        ContentKey::Faq,
        ContentKey::MaintenanceGuide,
        ContentKey::AllProductsInfo,
        ContentKey::AboutUs,
        ContentKey::ContactInfo,
        ContentKey::Terms,
        ContentKey::Privacy,
        ContentKey::Cookies,
        ContentKey::SocialLinks,
        ContentKey::ShippingConfig,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKey::ShippingDelivery => "SHIPPING_DELIVERY",
            ContentKey::ReturnExchange => "RETURN_EXCHANGE",
            ContentKey::WarrantyConditions => "WARRANTY_CONDITIONS",
            ContentKey::Faq => "FAQ",
            ContentKey::MaintenanceGuide => "MAINTENANCE_GUIDE",
            ContentKey::AllProductsInfo => "ALL_PRODUCTS_INFO",
            ContentKey::AboutUs => "ABOUT_US",
            ContentKey::ContactInfo => "CONTACT_INFO",
            ContentKey::Terms => "TERMS",
            ContentKey::Privacy => "PRIVACY",
            ContentKey::Cookies => "COOKIES",
            ContentKey::SocialLinks => "SOCIAL_LINKS",
            ContentKey::ShippingConfig => "SHIPPING_CONFIG",
        }
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DomainError::InvalidInput(format!("Unknown content key: {}", s)))
    }
}

#[derive(Debug, Clone)]
pub struct CorporateContent {
    pub id: Uuid,
    pub key: ContentKey,
    pub title: String,
    pub content: String,
    pub language: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ContentUpdate {
    pub title: String,
    pub content: String,
    pub active: bool,
}

impl CorporateContent {
    /// A fresh entry for a key that has never been edited.
    pub fn new(key: ContentKey, update: ContentUpdate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            key,
            title: update.title,
            content: update.content,
            language: DEFAULT_LANGUAGE.to_string(),
            active: update.active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: ContentUpdate) {
        self.title = update.title;
        self.content = update.content;
        self.active = update.active;
        self.updated_at = Utc::now();
    }
}
