use chrono::{DateTime, Utc};

use super::order::Order;

pub const DEFAULT_LIMIT: i64 = 25;
const DEFAULT_LOCATION: &str = "Türkiye";
const ANONYMOUS_CUSTOMER: &str = "Müşteri";

#[derive(Debug, Clone, PartialEq)]
pub struct RecentPurchase {
    pub customer_name: String,
    pub product_name: String,
    pub product_slug: String,
    pub location: String,
    pub time_ago: String,
    pub category: Option<String>,
}

/// "Ahmet Yılmaz" becomes "Ahmet Y.".
pub fn anonymize(first_name: &str, last_name: &str) -> String {
    let first = first_name.trim();
    if first.is_empty() {
        return ANONYMOUS_CUSTOMER.to_string();
    }
    match last_name.trim().chars().next() {
        Some(initial) => format!("{} {}.", first, initial),
        None => first.to_string(),
    }
}

/// Fuzzy Turkish description of how long ago `then` was.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - then;
    let minutes = elapsed.num_minutes().max(0);
    if minutes < 60 {
        return format!("{} dakika önce", minutes);
    }
    let hours = elapsed.num_hours();
    if hours < 24 {
        return format!("{} saat önce", hours);
    }
    match elapsed.num_days() {
        1 => "dün".to_string(),
        d if d < 7 => format!("{} gün önce", d),
        d if d < 30 => "bu ay".to_string(),
        _ => "geçen ay".to_string(),
    }
}

/// URL-friendly product slug with Turkish letters folded to ASCII.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        let folded = match c {
            'ğ' | 'Ğ' => 'g',
            'ü' | 'Ü' => 'u',
            'ş' | 'Ş' => 's',
            'ı' | 'I' | 'İ' => 'i',
            'ö' | 'Ö' => 'o',
            'ç' | 'Ç' => 'c',
            other => other.to_ascii_lowercase(),
        };
        if folded.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(folded);
        } else {
            pending_dash = true;
        }
    }
    out
}

/// One entry per ordered item.
pub fn purchases_for(order: &Order, now: DateTime<Utc>) -> Vec<RecentPurchase> {
    let customer_name = anonymize(&order.user_name, &order.user_surname);
    let location = if order.shipping_city.trim().is_empty() {
        DEFAULT_LOCATION.to_string()
    } else {
        order.shipping_city.trim().to_string()
    };
    let time_ago = time_ago(order.created_at, now);

    order
        .items
        .iter()
        .map(|item| RecentPurchase {
            customer_name: customer_name.clone(),
            product_name: item.name.clone(),
            product_slug: slug(&item.name),
            location: location.clone(),
            time_ago: time_ago.clone(),
            category: item.category_name.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::knife::fixtures::knife;
    use crate::domain::order::fixtures::order;
    use crate::domain::order::OrderItem;
    use chrono::Duration;

    #[test]
    fn anonymize_keeps_first_name_and_surname_initial() {
        assert_eq!(anonymize("Ahmet", "Yılmaz"), "Ahmet Y.");
        assert_eq!(anonymize(" Ayşe ", ""), "Ayşe");
        assert_eq!(anonymize("", "Demir"), "Müşteri");
        assert_eq!(anonymize("Can", "Özdemir"), "Can Ö.");
    }

    #[test]
    fn time_ago_buckets() {
        let now = Utc::now();
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5 dakika önce");
        assert_eq!(time_ago(now - Duration::hours(3), now), "3 saat önce");
        assert_eq!(time_ago(now - Duration::hours(30), now), "dün");
        assert_eq!(time_ago(now - Duration::days(4), now), "4 gün önce");
        assert_eq!(time_ago(now - Duration::days(12), now), "bu ay");
        assert_eq!(time_ago(now - Duration::days(45), now), "geçen ay");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        let now = Utc::now();
        assert_eq!(time_ago(now + Duration::minutes(2), now), "0 dakika önce");
    }

    #[test]
    fn slug_folds_turkish_letters() {
        assert_eq!(slug("Şef Bıçağı Çelik"), "sef-bicagi-celik");
        assert_eq!(slug("  Damascus -- Hunter 20cm! "), "damascus-hunter-20cm");
        assert_eq!(slug(""), "");
    }

    #[test]
    fn purchases_use_shipping_city_or_default_location() {
        let mut o = order("2025-01-01", 4, "100");
        let mut k = knife("Avcı Bıçağı", "100", 3);
        k.category_name = Some("Hunting".to_string());
        o.items.push(OrderItem::snapshot(&k, 1, None, None));
        o.items.push(OrderItem::snapshot(&k, 2, None, None));

        let purchases = purchases_for(&o, Utc::now());
        assert_eq!(purchases.len(), 2);
        assert_eq!(purchases[0].location, "Ankara");
        assert_eq!(purchases[0].product_slug, "avci-bicagi");
        assert_eq!(purchases[0].category.as_deref(), Some("Hunting"));
        assert_eq!(purchases[0].customer_name, "Ahmet Y.");

        o.shipping_city = String::new();
        assert_eq!(purchases_for(&o, Utc::now())[0].location, "Türkiye");
    }
}
