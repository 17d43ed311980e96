//! Pantry notifications, derived on request from the current pantry.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::pantry::PantryItem;
use crate::profile::NotificationSettings;

/// Items at or below this quantity trigger a low-stock recommendation.
pub const LOW_STOCK_QUANTITY: f64 = 1.0;

/// Notification kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Expiry,
    Recommendation,
}

/// A notification shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

/// Build notifications for every item in `pantry`.
///
/// Expiry notices fire when an item expires exactly one or two calendar days
/// (UTC) after `now`, and only when expiry alerts are enabled. Low-stock
/// recommendations fire regardless of settings.
#[must_use]
pub fn notifications_for(
    pantry: &[PantryItem],
    settings: NotificationSettings,
    now: DateTime<Utc>,
) -> Vec<Notification> {
    let today = now.date_naive();
    let mut notifications = Vec::new();

    for item in pantry {
        if settings.expiry_alerts
            && let Some(expiry) = item.expiry_date
        {
            let message = match (expiry.date_naive() - today).num_days() {
                1 => Some(format!("Your {} is expiring tomorrow!", item.name)),
                2 => Some(format!("Your {} is expiring in 2 days.", item.name)),
                _ => None,
            };
            if let Some(message) = message {
                notifications.push(Notification {
                    id: format!("{}-expiry", item.id),
                    kind: NotificationKind::Expiry,
                    message,
                    timestamp: now,
                    read: false,
                });
            }
        }

        if item.quantity <= LOW_STOCK_QUANTITY {
            notifications.push(Notification {
                id: format!("{}-lowstock", item.id),
                kind: NotificationKind::Recommendation,
                message: format!(
                    "You seem to be low on {}. Add to shopping list?",
                    item.name
                ),
                timestamp: now,
                read: false,
            });
        }
    }

    notifications
}
