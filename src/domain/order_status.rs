//! Order status codes and their Turkish display text.

pub const RECEIVED: i32 = 1;
pub const COMPLETED: i32 = 5;
pub const CANCELLED: i32 = 6;

const UNKNOWN_STATUS_TEXT: &str = "Bilinmeyen Durum";

const STATUS_TABLE: [(i32, &str); 12] = [
    (1, "Alındı"),
    (2, "İşleniyor"),
    (3, "Kargoya verilmeyi bekliyor"),
    (4, "Kargoya verildi"),
    (5, "Tamamlandı"),
    (6, "İptal Edildi"),
    (7, "İade Edildi"),
    (8, "İade Talebi Bekliyor"),
    (9, "İade Talebi Onaylandı"),
    (10, "İade Talebi Reddedildi"),
    (11, "İade Talebi Tamamlandı"),
    (12, "İade Talebi İptal Edildi"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStatus {
    pub code: i32,
    pub text: String,
}

impl OrderStatus {
    /// Cancelled and every return-related status.
    pub fn is_cancelled_or_returned(code: i32) -> bool {
        (CANCELLED..=12).contains(&code)
    }
}

pub fn text_for(code: i32) -> &'static str {
    STATUS_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, text)| *text)
        .unwrap_or(UNKNOWN_STATUS_TEXT)
}

pub fn by_code(code: i32) -> Option<OrderStatus> {
    STATUS_TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(code, text)| OrderStatus {
            code: *code,
            text: text.to_string(),
        })
}

pub fn all() -> Vec<OrderStatus> {
    STATUS_TABLE
        .iter()
        .map(|(code, text)| OrderStatus {
            code: *code,
            text: text.to_string(),
        })
        .collect()
}
