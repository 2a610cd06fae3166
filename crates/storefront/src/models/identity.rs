//! The signed-in user as seen by this service.

use serde::{Deserialize, Serialize};

use stg_catalog_core::UserId;

/// The signed-in user: an opaque identifier plus whatever display data
/// the identity provider passed along.
///
/// Authentication itself is delegated to the external identity provider;
/// this service only carries the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    /// Display name for order messages: the profile name, else the
    /// email, else a generic fallback.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("Cliente")
    }

    /// Contact email for order messages; empty when the provider sent
    /// none.
    #[must_use]
    pub fn contact_email(&self) -> &str {
        self.email.as_deref().unwrap_or("")
    }
}
