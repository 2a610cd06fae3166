//! Local cache for client-facing state.
//!
//! A thin persistence layer used to avoid redundant remote reads: theme
//! preference and recent search terms live in a volatile store, the user
//! preferences object and the per-user cart snapshot in a durable store
//! with expiry. All values are JSON strings under fixed keys.
//!
//! Failure semantics: reads of missing or corrupt entries behave as a
//! miss; writes are best-effort and log instead of propagating. A cache
//! miss is never an error - callers fall back to the data store.

pub mod store;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use stg_catalog_core::UserId;

use crate::gateway::types::CartItem;
use store::{DurableStore, KeyValueStore, VolatileStore};

/// Cache keys.
mod keys {
    pub const THEME: &str = "stg-theme";
    pub const USER_PREFERENCES: &str = "stg-user-prefs";
    pub const CART_CACHE: &str = "stg-cart-cache";
    pub const SEARCH_HISTORY: &str = "stg-search-history";
}

/// User preferences live for 30 days.
const USER_PREFS_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Cart snapshots live for 7 days.
const CART_SNAPSHOT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// A snapshot older than this triggers a remote read.
const SNAPSHOT_FRESHNESS_MINUTES: i64 = 5;

/// Search history keeps at most this many terms.
const SEARCH_HISTORY_LIMIT: usize = 10;

/// The typed caches, sharing one volatile and one durable substrate.
#[derive(Clone)]
pub struct LocalCaches {
    theme: ThemeCache,
    preferences: UserPrefsCache,
    search_history: SearchHistory,
    cart_snapshots: CartSnapshotCache,
}

impl LocalCaches {
    #[must_use]
    pub fn new() -> Self {
        let volatile = Arc::new(VolatileStore::new());
        let durable = Arc::new(DurableStore::new());

        Self {
            theme: ThemeCache {
                store: Arc::clone(&volatile),
            },
            preferences: UserPrefsCache {
                store: Arc::clone(&durable),
            },
            search_history: SearchHistory { store: volatile },
            cart_snapshots: CartSnapshotCache { store: durable },
        }
    }

    #[must_use]
    pub fn theme(&self) -> &ThemeCache {
        &self.theme
    }

    #[must_use]
    pub fn preferences(&self) -> &UserPrefsCache {
        &self.preferences
    }

    #[must_use]
    pub fn search_history(&self) -> &SearchHistory {
        &self.search_history
    }

    #[must_use]
    pub fn cart_snapshots(&self) -> &CartSnapshotCache {
        &self.cart_snapshots
    }
}

impl Default for LocalCaches {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Theme
// =============================================================================

/// Theme preference cache (unscoped string, no expiry).
#[derive(Clone)]
pub struct ThemeCache {
    store: Arc<VolatileStore>,
}

impl ThemeCache {
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.store.get(keys::THEME)
    }

    pub fn set(&self, theme: &str) {
        self.store.set(keys::THEME, theme.to_string(), None);
    }

    pub fn remove(&self) {
        self.store.remove(keys::THEME);
    }
}

// =============================================================================
// User preferences
// =============================================================================

/// User preferences cache (JSON object, 30-day expiry).
#[derive(Clone)]
pub struct UserPrefsCache {
    store: Arc<DurableStore>,
}

impl UserPrefsCache {
    #[must_use]
    pub fn get(&self) -> Option<serde_json::Value> {
        let raw = self.store.get(keys::USER_PREFERENCES)?;
        serde_json::from_str(&raw).ok()
    }

    pub fn set(&self, preferences: &serde_json::Value) {
        match serde_json::to_string(preferences) {
            Ok(json) => self
                .store
                .set(keys::USER_PREFERENCES, json, Some(USER_PREFS_TTL)),
            Err(e) => tracing::warn!(error = %e, "failed to write user preferences"),
        }
    }

    pub fn remove(&self) {
        self.store.remove(keys::USER_PREFERENCES);
    }
}

// =============================================================================
// Search history
// =============================================================================

/// Recent search terms: bounded, most-recent-first, no duplicates.
#[derive(Clone)]
pub struct SearchHistory {
    store: Arc<VolatileStore>,
}

impl SearchHistory {
    /// Recent terms, most recent first.
    #[must_use]
    pub fn recent(&self) -> Vec<String> {
        self.store
            .get(keys::SEARCH_HISTORY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Record a term. An existing term moves to the front instead of
    /// appearing twice; the oldest entry past the cap is evicted.
    pub fn record(&self, term: &str) {
        let mut history = self.recent();
        history.retain(|existing| existing != term);
        history.insert(0, term.to_string());
        history.truncate(SEARCH_HISTORY_LIMIT);

        match serde_json::to_string(&history) {
            Ok(json) => self.store.set(keys::SEARCH_HISTORY, json, None),
            Err(e) => tracing::warn!(error = %e, "failed to write search history"),
        }
    }

    pub fn clear(&self) {
        self.store.remove(keys::SEARCH_HISTORY);
    }
}

// =============================================================================
// Cart snapshot
// =============================================================================

/// A point-in-time copy of a user's cart line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    pub timestamp: DateTime<Utc>,
}

impl CartSnapshot {
    /// Whether the snapshot is recent enough to stand in for a remote
    /// read.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        Utc::now() - self.timestamp < TimeDelta::minutes(SNAPSHOT_FRESHNESS_MINUTES)
    }
}

/// Per-user cart snapshot cache (7-day expiry, 5-minute freshness
/// window).
#[derive(Clone)]
pub struct CartSnapshotCache {
    store: Arc<DurableStore>,
}

impl CartSnapshotCache {
    fn key(user_id: UserId) -> String {
        format!("{}:{user_id}", keys::CART_CACHE)
    }

    #[must_use]
    pub fn get(&self, user_id: UserId) -> Option<CartSnapshot> {
        let raw = self.store.get(&Self::key(user_id))?;
        serde_json::from_str(&raw).ok()
    }

    /// Store a snapshot stamped with the current time. A serialization
    /// failure is a soft failure: the cart still works from memory.
    pub fn set(&self, user_id: UserId, items: &[CartItem]) {
        let snapshot = CartSnapshot {
            items: items.to_vec(),
            timestamp: Utc::now(),
        };
        match serde_json::to_string(&snapshot) {
            Ok(json) => self
                .store
                .set(&Self::key(user_id), json, Some(CART_SNAPSHOT_TTL)),
            Err(e) => tracing::warn!(error = %e, "failed to write cart snapshot"),
        }
    }

    pub fn remove(&self, user_id: UserId) {
        self.store.remove(&Self::key(user_id));
    }
}
