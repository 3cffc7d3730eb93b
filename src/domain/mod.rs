pub mod admin;
pub mod category;
pub mod content;
pub mod errors;
pub mod knife;
pub mod order;
pub mod order_status;
pub mod pagination;
pub mod ports;
pub mod social_proof;
