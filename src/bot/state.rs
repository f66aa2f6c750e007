//! Per-user ephemeral analysis mode
//!
//! A trade button press stores the mode; the next photo from the same user
//! consumes it. Nothing here outlives the process.

use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;

use crate::prompt::Intent;

/// Depth of the chart analysis requested for the next photo
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnalysisMode {
    /// Short BUY/SELL signal
    #[default]
    Quick,
    /// Multi-section report
    Detailed,
}

impl AnalysisMode {
    /// Prompt intent used for a photo analysed in this mode
    #[must_use]
    pub const fn intent(self) -> Intent {
        match self {
            Self::Quick => Intent::QuickTrade,
            Self::Detailed => Intent::DetailedTrade,
        }
    }
}

/// Storage for pending analysis modes, keyed by Telegram user id
#[async_trait]
pub trait ModeStore: Send + Sync {
    /// Pending mode of the user, if a trade button was pressed
    async fn get(&self, user_id: i64) -> Option<AnalysisMode>;

    /// Replace the user's pending mode
    async fn set(&self, user_id: i64, mode: AnalysisMode);

    /// Forget the user's pending mode
    async fn clear(&self, user_id: i64);
}

/// `ModeStore` backed by a moka cache
///
/// Entries expire after `ttl` of inactivity, so users who press a button and
/// never send a photo do not accumulate.
#[derive(Clone)]
pub struct InMemoryModeStore {
    cache: Cache<i64, AnalysisMode>,
}

impl InMemoryModeStore {
    /// Creates a store with the given idle TTL and capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use signal_assistant_bot::bot::state::InMemoryModeStore;
    ///
    /// let store = InMemoryModeStore::new(3600, 10_000);
    /// ```
    #[must_use]
    pub fn new(ttl_secs: u64, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_idle(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }
}

#[async_trait]
impl ModeStore for InMemoryModeStore {
    async fn get(&self, user_id: i64) -> Option<AnalysisMode> {
        self.cache.get(&user_id).await
    }

    async fn set(&self, user_id: i64, mode: AnalysisMode) {
        self.cache.insert(user_id, mode).await;
    }

    async fn clear(&self, user_id: i64) {
        self.cache.invalidate(&user_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_set_clear() {
        let store = InMemoryModeStore::new(60, 100);
        assert_eq!(store.get(1).await, None);

        store.set(1, AnalysisMode::Detailed).await;
        assert_eq!(store.get(1).await, Some(AnalysisMode::Detailed));

        store.clear(1).await;
        assert_eq!(store.get(1).await, None);
    }

    #[tokio::test]
    async fn test_set_replaces_previous_mode() {
        let store = InMemoryModeStore::new(60, 100);
        store.set(7, AnalysisMode::Detailed).await;
        store.set(7, AnalysisMode::Quick).await;
        assert_eq!(store.get(7).await, Some(AnalysisMode::Quick));
    }

    #[tokio::test]
    async fn test_users_are_independent() {
        let store = InMemoryModeStore::new(60, 100);
        store.set(1, AnalysisMode::Detailed).await;
        store.set(2, AnalysisMode::Quick).await;
        store.clear(2).await;

        assert_eq!(store.get(1).await, Some(AnalysisMode::Detailed));
        assert_eq!(store.get(2).await, None);
    }

    #[test]
    fn test_mode_selects_trade_intent() {
        assert_eq!(AnalysisMode::default(), AnalysisMode::Quick);
        assert_eq!(AnalysisMode::Quick.intent(), Intent::QuickTrade);
        assert_eq!(AnalysisMode::Detailed.intent(), Intent::DetailedTrade);
    }
}
