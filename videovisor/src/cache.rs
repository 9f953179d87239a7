//! Process-wide cache of the last aggregated feed.
//!
//! There is a single slot shared by every visitor, not one per account: the
//! dashboard is meant for one user at a time. A newer result replaces the slot
//! wholesale, so readers never observe a half-written entry. Concurrent
//! refreshes are not coordinated and the last one to finish wins.

use crate::feed::FeedVideo;
use jiff::{SignedDuration, Timestamp};
use std::sync::Arc;
use tokio::sync::RwLock;

/// How long an aggregation result is served before the next request recomputes it.
pub const CACHE_LIFETIME: SignedDuration = SignedDuration::from_mins(15);

/// One aggregation result and when it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub videos: Arc<[FeedVideo]>,
    pub fetched_at: Timestamp,
}

impl Snapshot {
    /// Whether the snapshot may still be served at `now`.
    pub fn is_fresh(&self, now: Timestamp) -> bool {
        now.duration_since(self.fetched_at) < CACHE_LIFETIME
    }
}

#[derive(Debug, Default)]
pub struct ResultCache {
    slot: RwLock<Option<Snapshot>>,
}

impl ResultCache {
    /// The cached snapshot, if there is one and it is still fresh at `now`.
    pub async fn get(&self, now: Timestamp) -> Option<Snapshot> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|snapshot| snapshot.is_fresh(now))
            .cloned()
    }

    /// Replaces whatever is cached.
    pub async fn put(&self, snapshot: Snapshot) {
        *self.slot.write().await = Some(snapshot);
    }

    pub async fn invalidate(&self) {
        self.slot.write().await.take();
    }
}
