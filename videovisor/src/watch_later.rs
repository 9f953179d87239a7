//! Queueing a video into the user's personal "watch later" playlist.
//!
//! YouTube's own Watch Later list is not writable through the API, so the
//! dashboard keeps a private playlist of its own, found by title and created on
//! first use.

use crate::youtube_api::{PagedStream, PlaylistInsertRequest, YouTubeApi};
use eyre::Context;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_stream::StreamExt;
use tracing::instrument;

/// Title of the playlist videos are saved to. The leading digit sorts it first.
pub const PLAYLIST_TITLE: &str = "0 Watch";

pub const PLAYLIST_DESCRIPTION: &str = "Playlist videovisor local";

/// The outcome of a save as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub success: bool,
    pub message: String,
}

impl SaveOutcome {
    pub fn saved() -> Self {
        Self {
            success: true,
            message: "Saved".to_string(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Id of the user's playlist titled `title`, creating it if there is none.
#[instrument(skip(api))]
pub async fn ensure_playlist<A: YouTubeApi>(api: &A, title: &str) -> eyre::Result<String> {
    let playlists = PagedStream::new(|page_token| api.list_my_playlists(page_token));
    let mut playlists = std::pin::pin!(playlists);
    while let Some(playlist) = playlists.next().await {
        let playlist = playlist.context("list own playlists")?;
        if playlist.snippet.title == title {
            tracing::debug!(playlist_id = %playlist.id, "found existing playlist");
            return Ok(playlist.id);
        }
    }

    let created = api
        .insert_playlist(&PlaylistInsertRequest::private(title, PLAYLIST_DESCRIPTION))
        .await
        .context("create playlist")?;
    Ok(created.id)
}

#[instrument(skip(api))]
pub async fn add_item<A: YouTubeApi>(api: &A, playlist_id: &str, video_id: &str) -> eyre::Result<()> {
    api.insert_playlist_item(playlist_id, video_id)
        .await
        .with_context(|| format!("add {video_id} to playlist {playlist_id}"))?;
    Ok(())
}

/// Saves videos to the [`PLAYLIST_TITLE`] playlist.
///
/// Finding or creating the playlist is serialized within the process, so two
/// saves racing on a fresh account still end up with one playlist.
#[derive(Debug, Default)]
pub struct WatchLater {
    creation: Mutex<()>,
}

impl WatchLater {
    pub async fn save<A: YouTubeApi>(&self, api: &A, video_id: &str) -> eyre::Result<()> {
        let playlist_id = {
            let _creating = self.creation.lock().await;
            ensure_playlist(api, PLAYLIST_TITLE).await?
        };
        add_item(api, &playlist_id, video_id).await?;
        tracing::info!(%video_id, %playlist_id, "saved video for later");
        Ok(())
    }

    /// Like [`WatchLater::save`], but reported the way the dashboard shows it.
    pub async fn save_outcome<A: YouTubeApi>(&self, api: &A, video_id: &str) -> SaveOutcome {
        match self.save(api, video_id).await {
            Ok(()) => SaveOutcome::saved(),
            Err(e) => {
                tracing::warn!(%video_id, error = ?e, "failed to save video");
                SaveOutcome::failed(format!("{e:#}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube_api::fake::FakeYouTube;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[tokio::test]
    async fn creates_playlist_once() {
        let api = FakeYouTube::default().with_playlist("PLx", "Music");
        let first = ensure_playlist(&api, PLAYLIST_TITLE).await.unwrap();
        let second = ensure_playlist(&api, PLAYLIST_TITLE).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(api.calls().inserted_playlists, vec![PLAYLIST_TITLE.to_string()]);
    }

    #[tokio::test]
    async fn finds_playlist_past_first_page() {
        let mut api = FakeYouTube::default();
        for n in 0..60 {
            api = api.with_playlist(&format!("PL{n}"), &format!("List {n}"));
        }
        api = api.with_playlist("PLwatch", PLAYLIST_TITLE);

        let id = ensure_playlist(&api, PLAYLIST_TITLE).await.unwrap();
        assert_eq!(id, "PLwatch");
        let calls = api.calls();
        assert_eq!(calls.playlist_pages, 2);
        assert!(calls.inserted_playlists.is_empty());
    }

    #[tokio::test]
    async fn title_must_match_exactly() {
        let api = FakeYouTube::default().with_playlist("PLx", "0 watch");
        let id = ensure_playlist(&api, PLAYLIST_TITLE).await.unwrap();
        assert_ne!(id, "PLx");
    }

    #[tokio::test]
    async fn save_adds_to_playlist() {
        let api = FakeYouTube::default().with_playlist("PLwatch", PLAYLIST_TITLE);
        let outcome = WatchLater::default().save_outcome(&api, "abc").await;
        assert_eq!(outcome, SaveOutcome::saved());
        assert_eq!(
            api.calls().inserted_items,
            vec![("PLwatch".to_string(), "abc".to_string())]
        );
    }

    #[tokio::test]
    async fn failure_is_reported_not_raised() {
        let api = FakeYouTube {
            fail_item_insert: true,
            ..Default::default()
        };
        let outcome = WatchLater::default().save_outcome(&api, "gone").await;
        assert!(!outcome.success);
        assert!(outcome.message.contains("video not found"), "{}", outcome.message);
    }

    #[tokio::test]
    async fn concurrent_saves_share_one_playlist() {
        let api = Arc::new(FakeYouTube::default());
        let watch_later = Arc::new(WatchLater::default());
        let saves = (0..8).map(|n| {
            let api = Arc::clone(&api);
            let watch_later = Arc::clone(&watch_later);
            tokio::spawn(async move { watch_later.save(&*api, &format!("v{n}")).await })
        });
        for save in futures_util::future::join_all(saves).await {
            save.unwrap().unwrap();
        }
        let calls = api.calls();
        assert_eq!(calls.inserted_playlists.len(), 1);
        assert_eq!(calls.inserted_items.len(), 8);
    }
}
