//! In-memory [`YouTubeApi`] that records every call.

use crate::youtube_api::channels::{ChannelContentDetails, RelatedPlaylists};
use crate::youtube_api::playlists::{
    PlaylistInsertRequest, PlaylistItemContentDetails, PlaylistItemSnippet,
};
use crate::youtube_api::subscriptions::{SubscriptionResource, SubscriptionSnippet};
use crate::youtube_api::types::Thumbnail;
use crate::youtube_api::videos::VideoContentDetails;
use crate::youtube_api::{
    BatchEntry, Channel, ListResponse, MAX_IDS_PER_CALL, MAX_PAGE_SIZE, Playlist, PlaylistItem,
    Subscription, Thumbnails, Video, YouTubeApi,
};
use jiff::Timestamp;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub(crate) struct Calls {
    pub subscription_pages: usize,
    pub channel_chunks: Vec<Vec<String>>,
    pub item_batches: Vec<Vec<String>>,
    pub video_chunks: Vec<Vec<String>>,
    pub playlist_pages: usize,
    pub inserted_playlists: Vec<String>,
    pub inserted_items: Vec<(String, String)>,
}

#[derive(Debug, Default)]
pub(crate) struct FakeYouTube {
    /// Subscribed channel ids, served `MAX_PAGE_SIZE` at a time.
    pub subscriptions: Vec<String>,
    /// Channel id to uploads playlist id. Channels missing here come back
    /// without an uploads playlist.
    pub uploads: HashMap<String, String>,
    pub playlist_items: HashMap<String, Vec<PlaylistItem>>,
    pub failing_playlists: HashSet<String>,
    /// Video id to raw ISO 8601 duration. Videos missing here are "deleted".
    pub durations: HashMap<String, Option<String>>,
    pub fail_subscriptions: bool,
    pub fail_videos: bool,
    pub fail_item_insert: bool,
    pub playlists: Mutex<Vec<Playlist>>,
    pub calls: Mutex<Calls>,
}

impl FakeYouTube {
    /// Subscribes to `channel_id` whose uploads playlist holds `items`.
    pub fn with_channel(mut self, channel_id: &str, items: Vec<PlaylistItem>) -> Self {
        let playlist_id = format!("UU-{channel_id}");
        self.subscriptions.push(channel_id.to_string());
        self.uploads.insert(channel_id.to_string(), playlist_id.clone());
        self.playlist_items.insert(playlist_id, items);
        self
    }

    pub fn with_duration(mut self, video_id: &str, duration: Option<&str>) -> Self {
        self.durations
            .insert(video_id.to_string(), duration.map(str::to_string));
        self
    }

    pub fn with_playlist(self, id: &str, title: &str) -> Self {
        self.playlists
            .lock()
            .unwrap()
            .push(playlist(id, title));
        self
    }

    pub fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
        self.calls.lock().unwrap()
    }
}

pub(crate) fn playlist(id: &str, title: &str) -> Playlist {
    Playlist {
        id: id.to_string(),
        snippet: crate::youtube_api::playlists::PlaylistSnippet {
            title: title.to_string(),
            description: None,
        },
    }
}

pub(crate) fn item(video_id: &str, published_at: Timestamp) -> PlaylistItem {
    PlaylistItem {
        id: format!("item-{video_id}"),
        snippet: PlaylistItemSnippet {
            published_at,
            title: format!("Video {video_id}"),
            thumbnails: Thumbnails {
                medium: Some(Thumbnail {
                    url: format!("https://i.ytimg.com/vi/{video_id}/mqdefault.jpg"),
                    width: Some(320),
                    height: Some(180),
                }),
                ..Default::default()
            },
            channel_title: "Channel".to_string(),
            resource_id: None,
        },
        content_details: Some(PlaylistItemContentDetails {
            video_id: Some(video_id.to_string()),
        }),
    }
}

fn page<T>(all: Vec<T>, page_token: Option<String>) -> ListResponse<T> {
    let offset: usize = page_token.map_or(0, |t| t.parse().expect("fake page token"));
    let end = (offset + MAX_PAGE_SIZE as usize).min(all.len());
    let next = (end < all.len()).then(|| end.to_string());
    ListResponse::page(all.into_iter().skip(offset).take(end - offset), next)
}

impl YouTubeApi for FakeYouTube {
    async fn list_my_subscriptions(
        &self,
        page_token: Option<String>,
    ) -> eyre::Result<ListResponse<Subscription>> {
        self.calls().subscription_pages += 1;
        if self.fail_subscriptions {
            eyre::bail!("YouTube API GET subscriptions failed with status 403 Forbidden: quota");
        }
        let all = self
            .subscriptions
            .iter()
            .map(|channel_id| Subscription {
                id: format!("sub-{channel_id}"),
                snippet: SubscriptionSnippet {
                    title: channel_id.clone(),
                    resource_id: SubscriptionResource {
                        channel_id: channel_id.clone(),
                    },
                },
            })
            .collect();
        Ok(page(all, page_token))
    }

    async fn list_channels(&self, ids: &[String]) -> eyre::Result<Vec<Channel>> {
        assert!(ids.len() <= MAX_IDS_PER_CALL);
        self.calls().channel_chunks.push(ids.to_vec());
        Ok(ids
            .iter()
            .map(|id| Channel {
                id: id.clone(),
                content_details: Some(ChannelContentDetails {
                    related_playlists: Some(RelatedPlaylists {
                        uploads: self.uploads.get(id).cloned(),
                        likes: None,
                    }),
                }),
            })
            .collect())
    }

    async fn list_playlist_items_batch(
        &self,
        playlist_ids: &[String],
        max_results: u32,
    ) -> eyre::Result<Vec<BatchEntry<Vec<PlaylistItem>>>> {
        assert!(playlist_ids.len() <= MAX_IDS_PER_CALL);
        self.calls().item_batches.push(playlist_ids.to_vec());
        Ok(playlist_ids
            .iter()
            .map(|id| {
                let result = if self.failing_playlists.contains(id) {
                    Err(eyre::eyre!("playlist {id} not found"))
                } else {
                    Ok(self
                        .playlist_items
                        .get(id)
                        .map(|items| items.iter().take(max_results as usize).cloned().collect())
                        .unwrap_or_default())
                };
                (id.clone(), result)
            })
            .collect())
    }

    async fn list_videos(&self, ids: &[String]) -> eyre::Result<Vec<Video>> {
        assert!(ids.len() <= MAX_IDS_PER_CALL);
        self.calls().video_chunks.push(ids.to_vec());
        if self.fail_videos {
            eyre::bail!("YouTube API GET videos failed with status 500: backend error");
        }
        Ok(ids
            .iter()
            .filter_map(|id| {
                let duration = self.durations.get(id)?;
                Some(Video {
                    id: id.clone(),
                    content_details: Some(VideoContentDetails {
                        duration: duration.clone(),
                    }),
                })
            })
            .collect())
    }

    async fn list_my_playlists(
        &self,
        page_token: Option<String>,
    ) -> eyre::Result<ListResponse<Playlist>> {
        self.calls().playlist_pages += 1;
        let all = self.playlists.lock().unwrap().clone();
        Ok(page(all, page_token))
    }

    async fn insert_playlist(&self, request: &PlaylistInsertRequest) -> eyre::Result<Playlist> {
        let mut playlists = self.playlists.lock().unwrap();
        let created = playlist(&format!("PL{}", playlists.len()), &request.snippet.title);
        playlists.push(created.clone());
        self.calls()
            .inserted_playlists
            .push(request.snippet.title.clone());
        Ok(created)
    }

    async fn insert_playlist_item(&self, playlist_id: &str, video_id: &str) -> eyre::Result<String> {
        if self.fail_item_insert {
            eyre::bail!("YouTube API POST playlistItems failed with status 404 Not Found: video not found");
        }
        self.calls()
            .inserted_items
            .push((playlist_id.to_string(), video_id.to_string()));
        Ok(format!("item-{video_id}"))
    }
}
