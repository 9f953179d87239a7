//! YouTube Playlists and PlaylistItems API types.

use crate::youtube_api::types::Thumbnails;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A `playlist` resource.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlists#resource>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub snippet: PlaylistSnippet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistSnippet {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Who can see a playlist.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlists#status.privacyStatus>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrivacyStatus {
    Private,
    Public,
    Unlisted,
}

/// Request body for `playlists.insert`.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlists/insert>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistInsertRequest {
    pub snippet: PlaylistSnippet,
    pub status: PlaylistStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistStatus {
    pub privacy_status: PrivacyStatus,
}

impl PlaylistInsertRequest {
    pub fn private(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            snippet: PlaylistSnippet {
                title: title.into(),
                description: Some(description.into()),
            },
            status: PlaylistStatus {
                privacy_status: PrivacyStatus::Private,
            },
        }
    }
}

/// A `playlistItem` resource, as returned with `part=snippet,contentDetails`.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#resource>
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    #[serde(default)]
    pub id: String,
    pub snippet: PlaylistItemSnippet,
    pub content_details: Option<PlaylistItemContentDetails>,
}

impl PlaylistItem {
    /// The video this entry points at.
    pub fn video_id(&self) -> Option<&str> {
        self.content_details
            .as_ref()
            .and_then(|details| details.video_id.as_deref())
            .or_else(|| {
                self.snippet
                    .resource_id
                    .as_ref()
                    .and_then(|resource| resource.video_id.as_deref())
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    /// When the item was added to the playlist. For an uploads playlist this is
    /// the upload time.
    pub published_at: Timestamp,
    pub title: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    /// Title of the channel that owns the playlist.
    #[serde(default)]
    pub channel_title: String,
    pub resource_id: Option<ResourceId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemContentDetails {
    pub video_id: Option<String>,
}

/// Identifies the resource a playlist item refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub kind: String,
    pub video_id: Option<String>,
}

/// Request body for `playlistItems.insert`.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems/insert>
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistItemInsertRequest {
    pub snippet: PlaylistItemInsertSnippet,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemInsertSnippet {
    pub playlist_id: String,
    pub resource_id: ResourceId,
}

impl PlaylistItemInsertRequest {
    pub fn video(playlist_id: &str, video_id: &str) -> Self {
        Self {
            snippet: PlaylistItemInsertSnippet {
                playlist_id: playlist_id.to_string(),
                resource_id: ResourceId {
                    kind: "youtube#video".to_string(),
                    video_id: Some(video_id.to_string()),
                },
            },
        }
    }
}

/// The parts of an inserted `playlistItem` we care about.
#[derive(Debug, Clone, Deserialize)]
pub struct InsertedPlaylistItem {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_playlist_body() {
        let body = serde_json::to_value(PlaylistInsertRequest::private("0 Watch", "desc")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "snippet": {"title": "0 Watch", "description": "desc"},
                "status": {"privacyStatus": "private"}
            })
        );
    }

    #[test]
    fn insert_playlist_item_body() {
        let body = serde_json::to_value(PlaylistItemInsertRequest::video("PL1", "vid")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "snippet": {
                    "playlistId": "PL1",
                    "resourceId": {"kind": "youtube#video", "videoId": "vid"}
                }
            })
        );
    }

    #[test]
    fn playlist_item_from_api() {
        let json = r#"{
            "kind": "youtube#playlistItem",
            "id": "item1",
            "snippet": {
                "publishedAt": "2024-05-01T12:00:00Z",
                "channelId": "UC1",
                "title": "A video",
                "thumbnails": {"default": {"url": "https://i.ytimg.com/d.jpg", "width": 120, "height": 90}},
                "channelTitle": "Some Channel",
                "resourceId": {"kind": "youtube#video", "videoId": "vid1"}
            },
            "contentDetails": {"videoId": "vid1", "videoPublishedAt": "2024-05-01T12:00:00Z"}
        }"#;
        let item: PlaylistItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.video_id(), Some("vid1"));
        assert_eq!(item.snippet.channel_title, "Some Channel");
        assert_eq!(
            item.snippet.published_at,
            "2024-05-01T12:00:00Z".parse::<Timestamp>().unwrap()
        );
        assert_eq!(
            item.snippet.thumbnails.grid_url(),
            Some("https://i.ytimg.com/d.jpg")
        );
    }
}
