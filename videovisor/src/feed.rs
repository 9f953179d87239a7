//! Aggregation of recent uploads across the user's subscriptions.
//!
//! A run walks the API in strictly dependent stages:
//!
//! 1. page through the user's subscriptions,
//! 2. resolve each channel's uploads playlist, 50 channels per call,
//! 3. fetch the newest items of every uploads playlist, 50 playlists per batch,
//!    keeping those published within [`RECENCY_WINDOW`],
//! 4. fetch durations, 50 videos per call, keeping videos longer than
//!    [`MIN_DURATION`],
//! 5. order newest first.
//!
//! Any failure of a whole call aborts the run. A single failed playlist inside
//! a batch only loses that playlist's videos.

use crate::cache::{ResultCache, Snapshot};
use crate::youtube_api::{MAX_IDS_PER_CALL, PagedStream, PlaylistItem, YouTubeApi};
use eyre::Context;
use jiff::{SignedDuration, Timestamp};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio_stream::StreamExt;
use tracing::instrument;

/// How far back an upload may be and still show up.
pub const RECENCY_WINDOW: SignedDuration = SignedDuration::from_hours(30 * 24);

/// Videos must be strictly longer than this to show up.
pub const MIN_DURATION: SignedDuration = SignedDuration::from_secs(180);

/// How many of the newest items are read from each uploads playlist.
pub const ITEMS_PER_PLAYLIST: u32 = 5;

/// A video that made it into the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedVideo {
    pub id: String,
    pub title: String,
    /// `None` when the playlist item carried neither a medium nor a default thumbnail.
    pub thumbnail: Option<String>,
    pub published_at: Timestamp,
    pub channel_title: String,
    pub duration_secs: i64,
}

/// A recent upload that has not been checked for length yet.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    id: String,
    title: String,
    thumbnail: Option<String>,
    published_at: Timestamp,
    channel_title: String,
}

impl Candidate {
    fn from_item(item: &PlaylistItem) -> Option<Self> {
        let snippet = &item.snippet;
        Some(Self {
            id: item.video_id()?.to_string(),
            title: snippet.title.clone(),
            thumbnail: snippet.thumbnails.grid_url().map(str::to_string),
            published_at: snippet.published_at,
            channel_title: snippet.channel_title.clone(),
        })
    }

    fn into_video(self, duration: SignedDuration) -> FeedVideo {
        FeedVideo {
            id: self.id,
            title: self.title,
            thumbnail: self.thumbnail,
            published_at: self.published_at,
            channel_title: self.channel_title,
            duration_secs: duration.as_secs(),
        }
    }
}

/// Whether an upload published at `published_at` is recent enough as of `cutoff`.
pub fn is_recent(published_at: Timestamp, cutoff: Timestamp) -> bool {
    published_at > cutoff
}

/// Whether a video of the given length counts as a full video rather than a clip.
///
/// Unknown lengths never qualify.
pub fn is_long_enough(duration: Option<SignedDuration>) -> bool {
    duration.is_some_and(|d| d > MIN_DURATION)
}

/// Produces the feed as of `now`.
#[instrument(skip(api))]
pub async fn aggregate<A: YouTubeApi>(api: &A, now: Timestamp) -> eyre::Result<Vec<FeedVideo>> {
    let channel_ids = subscribed_channels(api)
        .await
        .context("list subscriptions")?;
    if channel_ids.is_empty() {
        tracing::info!("no subscriptions, feed is empty");
        return Ok(Vec::new());
    }

    let uploads = upload_playlists(api, &channel_ids)
        .await
        .context("resolve upload playlists")?;

    let cutoff = now
        .checked_sub(RECENCY_WINDOW)
        .context("compute recency cutoff")?;
    let candidates = recent_uploads(api, &uploads, cutoff)
        .await
        .context("list recent uploads")?;

    let mut videos = keep_long_videos(api, candidates)
        .await
        .context("fetch video durations")?;

    // stable: equal timestamps keep discovery order
    videos.sort_by(|a, b| b.published_at.cmp(&a.published_at));

    tracing::info!(
        channels = channel_ids.len(),
        playlists = uploads.len(),
        videos = videos.len(),
        "aggregated feed"
    );
    Ok(videos)
}

/// Distinct subscribed channel ids, in the order YouTube listed them.
async fn subscribed_channels<A: YouTubeApi>(api: &A) -> eyre::Result<Vec<String>> {
    let subscriptions = PagedStream::new(|page_token| api.list_my_subscriptions(page_token));
    let mut subscriptions = std::pin::pin!(subscriptions);

    let mut seen = HashSet::new();
    let mut channel_ids = Vec::new();
    while let Some(subscription) = subscriptions.next().await {
        let subscription = subscription?;
        let channel_id = subscription.channel_id();
        if seen.insert(channel_id.to_string()) {
            channel_ids.push(channel_id.to_string());
        }
    }
    Ok(channel_ids)
}

/// Uploads playlist ids of the given channels, deduplicated, in channel order.
async fn upload_playlists<A: YouTubeApi>(
    api: &A,
    channel_ids: &[String],
) -> eyre::Result<Vec<String>> {
    let mut by_channel = HashMap::new();
    for chunk in channel_ids.chunks(MAX_IDS_PER_CALL) {
        for channel in api.list_channels(chunk).await? {
            match channel.uploads_playlist() {
                Some(uploads) => {
                    by_channel.insert(channel.id.clone(), uploads.to_string());
                }
                None => {
                    tracing::debug!(channel_id = %channel.id, "channel has no uploads playlist");
                }
            }
        }
    }

    let mut seen = HashSet::new();
    Ok(channel_ids
        .iter()
        .filter_map(|channel_id| by_channel.remove(channel_id))
        .filter(|playlist_id| seen.insert(playlist_id.clone()))
        .collect())
}

/// Recent items of every playlist, each video once, in discovery order.
async fn recent_uploads<A: YouTubeApi>(
    api: &A,
    playlist_ids: &[String],
    cutoff: Timestamp,
) -> eyre::Result<Vec<Candidate>> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for chunk in playlist_ids.chunks(MAX_IDS_PER_CALL) {
        for (playlist_id, items) in api
            .list_playlist_items_batch(chunk, ITEMS_PER_PLAYLIST)
            .await?
        {
            let items = match items {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(%playlist_id, error = ?e, "skipping playlist");
                    continue;
                }
            };
            for item in &items {
                if !is_recent(item.snippet.published_at, cutoff) {
                    continue;
                }
                let Some(candidate) = Candidate::from_item(item) else {
                    tracing::debug!(%playlist_id, item_id = %item.id, "playlist item without video id");
                    continue;
                };
                if seen.insert(candidate.id.clone()) {
                    candidates.push(candidate);
                }
            }
        }
    }
    Ok(candidates)
}

/// Drops candidates that are too short, have no known length, or no longer exist.
async fn keep_long_videos<A: YouTubeApi>(
    api: &A,
    candidates: Vec<Candidate>,
) -> eyre::Result<Vec<FeedVideo>> {
    let ids: Vec<String> = candidates.iter().map(|c| c.id.clone()).collect();

    let mut durations = HashMap::new();
    for chunk in ids.chunks(MAX_IDS_PER_CALL) {
        for video in api.list_videos(chunk).await? {
            let duration = match video.duration() {
                Ok(duration) => duration,
                Err(e) => {
                    tracing::debug!(video_id = %video.id, error = ?e, "unusable duration");
                    None
                }
            };
            durations.insert(video.id, duration);
        }
    }

    Ok(candidates
        .into_iter()
        .filter_map(|candidate| {
            let duration = durations.get(&candidate.id).copied().flatten();
            match duration {
                Some(d) if is_long_enough(duration) => Some(candidate.into_video(d)),
                _ => None,
            }
        })
        .collect())
}

/// The listing use case: the shared result cache in front of [`aggregate`].
#[derive(Debug, Default)]
pub struct Feed {
    cache: ResultCache,
}

/// What a listing returns.
#[derive(Debug, Clone)]
pub struct Listing {
    pub snapshot: Snapshot,
    /// Whether the snapshot came from the cache rather than a fresh run.
    pub cached: bool,
}

impl Feed {
    pub fn new(cache: ResultCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Returns the cached feed if it is fresh and `force_refresh` is off,
    /// otherwise runs [`aggregate`] and stores the result.
    ///
    /// A failed run leaves the cache as it was.
    pub async fn listing<A: YouTubeApi>(
        &self,
        api: &A,
        force_refresh: bool,
        now: Timestamp,
    ) -> eyre::Result<Listing> {
        if !force_refresh {
            if let Some(snapshot) = self.cache.get(now).await {
                tracing::debug!(fetched_at = %snapshot.fetched_at, "serving cached feed");
                return Ok(Listing {
                    snapshot,
                    cached: true,
                });
            }
        }

        let videos = aggregate(api, now).await?;
        let snapshot = Snapshot {
            videos: Arc::from(videos),
            fetched_at: now,
        };
        self.cache.put(snapshot.clone()).await;
        Ok(Listing {
            snapshot,
            cached: false,
        })
    }
}
