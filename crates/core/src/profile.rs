//! User profile preferences.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Notification preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    /// Send expiry notices for items about to go off.
    #[serde(default = "enabled")]
    pub expiry_alerts: bool,
    /// Send the weekly pantry reminder.
    #[serde(default = "enabled")]
    pub weekly_reminders: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            expiry_alerts: true,
            weekly_reminders: true,
        }
    }
}

const fn enabled() -> bool {
    true
}

/// A user's profile preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    /// Name shown in the UI.
    pub display_name: String,
    /// Free-form region, used for store suggestions.
    pub region: String,
    /// Dietary preferences (`vegetarian`, `gluten-free`, ...).
    pub dietary_preferences: Vec<String>,
    /// Notification preferences.
    pub notification_settings: NotificationSettings,
    /// Low-stock threshold per category.
    pub category_thresholds: BTreeMap<String, f64>,
    /// Whether the user agreed to data processing.
    pub privacy_consent: bool,
}

impl UserProfile {
    /// Low-stock threshold for `category`, compared case-insensitively.
    #[must_use]
    pub fn threshold_for(&self, category: &str) -> Option<f64> {
        self.category_thresholds
            .get(category)
            .or_else(|| {
                self.category_thresholds
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(category))
                    .map(|(_, value)| value)
            })
            .copied()
    }
}

/// Partial notification settings in a profile update.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettingsUpdate {
    /// New expiry alert flag.
    pub expiry_alerts: Option<bool>,
    /// New weekly reminder flag.
    pub weekly_reminders: Option<bool>,
}

/// A partial profile update. Only supplied fields change.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub region: Option<String>,
    pub dietary_preferences: Option<Vec<String>>,
    pub notification_settings: Option<NotificationSettingsUpdate>,
    pub category_thresholds: Option<BTreeMap<String, f64>>,
    pub privacy_consent: Option<bool>,
}

impl ProfileUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.region.is_none()
            && self.dietary_preferences.is_none()
            && self.notification_settings.is_none()
            && self.category_thresholds.is_none()
            && self.privacy_consent.is_none()
    }

    /// Apply the update to `profile`.
    pub fn apply(self, profile: &mut UserProfile) {
        if let Some(display_name) = self.display_name {
            profile.display_name = display_name;
        }
        if let Some(region) = self.region {
            profile.region = region;
        }
        if let Some(preferences) = self.dietary_preferences {
            profile.dietary_preferences = preferences;
        }
        if let Some(settings) = self.notification_settings {
            if let Some(expiry_alerts) = settings.expiry_alerts {
                profile.notification_settings.expiry_alerts = expiry_alerts;
            }
            if let Some(weekly_reminders) = settings.weekly_reminders {
                profile.notification_settings.weekly_reminders = weekly_reminders;
            }
        }
        if let Some(thresholds) = self.category_thresholds {
            // Only finite, non-negative thresholds are stored.
            profile.category_thresholds = thresholds
                .into_iter()
                .filter(|(_, value)| value.is_finite() && *value >= 0.0)
                .collect();
        }
        if let Some(consent) = self.privacy_consent {
            profile.privacy_consent = consent;
        }
    }
}
