//! YouTube Channels API types.

use serde::{Deserialize, Serialize};

/// A `channel` resource, as returned with `part=contentDetails`.
///
/// See: <https://developers.google.com/youtube/v3/docs/channels#resource>
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    /// The ID that YouTube uses to uniquely identify the channel.
    pub id: String,
    pub content_details: Option<ChannelContentDetails>,
}

impl Channel {
    /// The playlist holding every video the channel has published, if YouTube reported one.
    pub fn uploads_playlist(&self) -> Option<&str> {
        self.content_details
            .as_ref()?
            .related_playlists
            .as_ref()?
            .uploads
            .as_deref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelContentDetails {
    pub related_playlists: Option<RelatedPlaylists>,
}

/// Playlists YouTube maintains on the channel's behalf.
///
/// See: <https://developers.google.com/youtube/v3/docs/channels#contentDetails.relatedPlaylists>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedPlaylists {
    pub uploads: Option<String>,
    pub likes: Option<String>,
}
