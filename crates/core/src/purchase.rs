//! Store purchases imported by scanning a receipt QR code.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, PurchaseId};

/// A store receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: PurchaseId,
    pub store_name: String,
    pub purchase_date: DateTime<Utc>,
    pub receipt_number: String,
    pub payment_method: String,
    /// Receipt total as printed. Not recomputed from the lines.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub items: Vec<PurchaseItem>,
}

/// One line of a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub product_id: ProductId,
    pub item_name: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_cost: Decimal,
    #[serde(default)]
    pub expiration_date: Option<DateTime<Utc>>,
    pub category: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn receipt() -> Purchase {
        let date = Utc.with_ymd_and_hms(2026, 3, 14, 17, 5, 0).unwrap();
        Purchase {
            id: PurchaseId::generate(),
            store_name: "Corner Market".to_owned(),
            purchase_date: date,
            receipt_number: "R-10442".to_owned(),
            payment_method: "card".to_owned(),
            total_amount: Decimal::new(1247, 2),
            created_at: date,
            items: vec![
                PurchaseItem {
                    product_id: ProductId::generate(),
                    item_name: "Milk".to_owned(),
                    quantity: 2.0,
                    unit: "l".to_owned(),
                    unit_cost: Decimal::new(119, 2),
                    expiration_date: Some(Utc.with_ymd_and_hms(2026, 3, 21, 0, 0, 0).unwrap()),
                    category: "dairy".to_owned(),
                },
                PurchaseItem {
                    product_id: ProductId::generate(),
                    item_name: "Milk".to_owned(),
                    quantity: 1.0,
                    unit: "l".to_owned(),
                    unit_cost: Decimal::new(119, 2),
                    expiration_date: None,
                    category: "dairy".to_owned(),
                },
            ],
        }
    }

    #[test]
    fn test_money_serializes_as_number() {
        let json = serde_json::to_value(receipt()).unwrap();
        assert_eq!(json["totalAmount"], serde_json::json!(12.47));
        assert_eq!(json["items"][0]["unitCost"], serde_json::json!(1.19));
        assert_eq!(json["storeName"], "Corner Market");
    }

    #[test]
    fn test_deserialize_without_expiration() {
        let json = serde_json::json!({
            "productId": "6f9619ff-8b86-d011-b42d-00c04fc964ff",
            "itemName": "Rice",
            "quantity": 1,
            "unit": "kg",
            "unitCost": 2.99,
            "category": "grains"
        });
        let item: PurchaseItem = serde_json::from_value(json).unwrap();
        assert!(item.expiration_date.is_none());
        assert_eq!(item.unit_cost, Decimal::new(299, 2));
    }
}
