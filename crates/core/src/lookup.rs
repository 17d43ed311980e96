//! User lookup fallback chain.
//!
//! Clients identify a user with whichever identifier they have at hand: the
//! database ID, the external sign-in provider's UID, or the email address.
//! [`LookupChain`] turns that raw identifier into the ordered list of lookups
//! to try: ID, then auth UID, then email. Steps whose key cannot be formed
//! from the identifier are skipped, so `"jamie@example.com"` never becomes a
//! primary-key lookup.

use core::fmt;

use crate::types::{Email, UserId};

/// Errors produced while building a lookup chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The identifier is empty or blank.
    #[error("user identifier is required")]
    EmptyIdentifier,
}

/// Which field a lookup step queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupStep {
    /// Primary key.
    Id,
    /// External auth provider UID.
    AuthUid,
    /// Email address.
    Email,
}

impl fmt::Display for LookupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Id => "id",
            Self::AuthUid => "auth_uid",
            Self::Email => "email",
        })
    }
}

/// A single lookup to attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    /// Look up by primary key.
    Id(UserId),
    /// Look up by external auth UID.
    AuthUid(String),
    /// Look up by email.
    Email(Email),
}

impl LookupKey {
    /// The step this key belongs to.
    #[must_use]
    pub const fn step(&self) -> LookupStep {
        match self {
            Self::Id(_) => LookupStep::Id,
            Self::AuthUid(_) => LookupStep::AuthUid,
            Self::Email(_) => LookupStep::Email,
        }
    }
}

/// Ordered lookups derived from one raw identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupChain {
    identifier: String,
    keys: Vec<LookupKey>,
}

impl LookupChain {
    /// Build the chain for `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::EmptyIdentifier`] if the identifier is blank.
    pub fn new(identifier: &str) -> Result<Self, LookupError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(LookupError::EmptyIdentifier);
        }

        let mut keys = Vec::with_capacity(3);
        if let Some(id) = UserId::parse(identifier) {
            keys.push(LookupKey::Id(id));
        }
        keys.push(LookupKey::AuthUid(identifier.to_owned()));
        if let Ok(email) = Email::parse(identifier) {
            keys.push(LookupKey::Email(email));
        }

        Ok(Self {
            identifier: identifier.to_owned(),
            keys,
        })
    }

    /// The trimmed identifier the chain was built from.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The lookups to attempt, in order.
    #[must_use]
    pub fn keys(&self) -> &[LookupKey] {
        &self.keys
    }

    /// Run `find` over the chain and return the first hit with its step.
    ///
    /// Later steps are not attempted once one succeeds.
    pub fn resolve<T, F>(&self, mut find: F) -> Option<(LookupStep, T)>
    where
        F: FnMut(&LookupKey) -> Option<T>,
    {
        self.keys
            .iter()
            .find_map(|key| find(key).map(|found| (key.step(), found)))
    }
}
