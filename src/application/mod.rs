pub mod auth_service;
pub mod category_service;
pub mod content_service;
pub mod knife_service;
pub mod order_service;
