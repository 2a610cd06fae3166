//! Status enums for persisted entities.

use serde::{Deserialize, Serialize};

/// Order notification status.
///
/// Orders are persisted before their summary is dispatched to the
/// messaging channel, so an order can exist without its message ever
/// having been delivered. The status records which side of that window
/// an order is on; a reconciliation pass can use it to resend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Persisted, message not yet confirmed delivered.
    #[default]
    PendingNotification,
    /// Message delivered to the messaging channel.
    Notified,
}

impl OrderStatus {
    /// The wire representation stored in the data store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingNotification => "pending_notification",
            Self::Notified => "notified",
        }
    }
}
