//! Typed entity identifiers
//!
//! Every entity kind carries its own newtype so references cannot be mixed
//! up at compile time. Formats are fixed and deterministic:
//! `PER-0001`, `PROJ-PAY`, `EPIC-PAY-01`, `PAY-1401`, `SPRINT-1`,
//! `MAIL-TH-001`, `MSG-001`, `CMT-0001`.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A short human-readable project key, e.g. `PAY`
///
/// Uppercase ASCII letters, 2-6 characters. Ticket IDs are prefixed with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectKey(String);

impl ProjectKey {
    /// Parse and validate a project key
    ///
    /// # Errors
    /// Returns [`KeyError`] if the key is not 2-6 uppercase ASCII letters.
    pub fn new(key: impl Into<String>) -> Result<Self, KeyError> {
        let key = key.into();
        if key.len() < 2 || key.len() > 6 {
            return Err(KeyError::BadLength(key.len()));
        }
        if !key.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(KeyError::BadCharacter(key));
        }
        Ok(Self(key))
    }

    /// Key as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProjectKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProjectKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Errors from parsing a [`ProjectKey`]
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// Key must be 2-6 characters
    #[error("project key must be 2-6 characters, got {0}")]
    BadLength(usize),

    /// Key must be uppercase ASCII letters
    #[error("project key must be uppercase ASCII letters: {0:?}")]
    BadCharacter(String),
}

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub(crate) String);

        impl $name {
            /// Identifier as string slice
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Wrap a pre-formatted identifier without registry involvement
            ///
            /// Intended for deserialization paths and tests; generation code
            /// must go through [`crate::IdRegistry`].
            #[inline]
            #[must_use]
            pub fn from_raw(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Person identifier, `PER-0001`
    PersonId
);
entity_id!(
    /// Project identifier, `PROJ-PAY`
    ProjectId
);
entity_id!(
    /// Epic identifier, `EPIC-PAY-01`
    EpicId
);
entity_id!(
    /// Ticket identifier, `PAY-1401`
    TicketId
);
entity_id!(
    /// Sprint identifier, `SPRINT-1`
    SprintId
);
entity_id!(
    /// Mail thread identifier, `MAIL-TH-001`
    ThreadId
);
entity_id!(
    /// Mail message identifier, `MSG-001`
    MessageId
);
entity_id!(
    /// Ticket comment identifier, `CMT-0001`
    CommentId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_key_valid() {
        let key = ProjectKey::new("PAY").unwrap();
        assert_eq!(key.as_str(), "PAY");
        assert_eq!(key.to_string(), "PAY");
    }

    #[test]
    fn project_key_rejects_lowercase() {
        assert!(matches!(ProjectKey::new("pay"), Err(KeyError::BadCharacter(_))));
    }

    #[test]
    fn project_key_rejects_length() {
        assert!(matches!(ProjectKey::new("P"), Err(KeyError::BadLength(1))));
        assert!(matches!(ProjectKey::new("PAYMENTS"), Err(KeyError::BadLength(8))));
    }

    #[test]
    fn entity_id_display_and_serde() {
        let id = TicketId::from_raw("PAY-1401");
        assert_eq!(id.to_string(), "PAY-1401");

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"PAY-1401\"");

        let back: TicketId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn entity_id_ordering() {
        let a = TicketId::from_raw("PAY-1401");
        let b = TicketId::from_raw("PAY-1402");
        assert!(a < b);
    }
}
