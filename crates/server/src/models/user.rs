//! User domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pantry_manager_core::{Email, PantryItem, UserId, UserProfile};

/// A user with their profile and pantry (domain type).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Name from the sign-in provider.
    pub name: String,
    /// Normalized email address.
    pub email: Email,
    /// Avatar URL from the sign-in provider.
    pub photo_url: Option<String>,
    /// External sign-in provider UID.
    pub auth_uid: Option<String>,
    /// Profile preferences.
    pub profile: UserProfile,
    /// Pantry items, in insertion order.
    pub pantry: Vec<PantryItem>,
    /// When the user first signed in.
    pub created_at: DateTime<Utc>,
    /// When the user record last changed.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Profile with the display name falling back to the provider name.
    #[must_use]
    pub fn effective_profile(&self) -> UserProfile {
        let mut profile = self.profile.clone();
        if profile.display_name.trim().is_empty() {
            profile.display_name.clone_from(&self.name);
        }
        profile
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: UserId::generate(),
            name: "Jamie Doe".to_string(),
            email: Email::parse("jamie@example.com").unwrap(),
            photo_url: None,
            auth_uid: Some("uid-1".to_string()),
            profile: UserProfile::default(),
            pantry: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_effective_profile_falls_back_to_name() {
        assert_eq!(user().effective_profile().display_name, "Jamie Doe");

        let mut named = user();
        named.profile.display_name = "JD".to_string();
        assert_eq!(named.effective_profile().display_name, "JD");
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(user()).unwrap();
        assert_eq!(json["authUid"], "uid-1");
        assert_eq!(json["email"], "jamie@example.com");
        assert!(json["pantry"].as_array().unwrap().is_empty());
    }
}
