//! Canned YouTube Data API responses served by wiremock.

#![allow(dead_code)]

use jiff::{SignedDuration, Timestamp};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ACCESS_TOKEN: &str = "ya29.test-token";

pub fn days_ago(days: i64) -> String {
    (Timestamp::now() - SignedDuration::from_hours(24 * days)).to_string()
}

pub fn subscription(channel_id: &str) -> Value {
    json!({
        "kind": "youtube#subscription",
        "id": format!("sub-{channel_id}"),
        "snippet": {
            "title": format!("Channel {channel_id}"),
            "resourceId": {"kind": "youtube#channel", "channelId": channel_id}
        }
    })
}

pub fn channel(channel_id: &str, uploads: &str) -> Value {
    json!({
        "kind": "youtube#channel",
        "id": channel_id,
        "contentDetails": {"relatedPlaylists": {"likes": "", "uploads": uploads}}
    })
}

pub fn playlist_item(video_id: &str, published_at: &str, channel_title: &str) -> Value {
    json!({
        "kind": "youtube#playlistItem",
        "id": format!("item-{video_id}"),
        "snippet": {
            "publishedAt": published_at,
            "title": format!("Video {video_id}"),
            "thumbnails": {
                "default": {"url": format!("https://i.ytimg.com/vi/{video_id}/default.jpg"), "width": 120, "height": 90},
                "medium": {"url": format!("https://i.ytimg.com/vi/{video_id}/mqdefault.jpg"), "width": 320, "height": 180}
            },
            "channelTitle": channel_title,
            "resourceId": {"kind": "youtube#video", "videoId": video_id}
        },
        "contentDetails": {"videoId": video_id, "videoPublishedAt": published_at}
    })
}

pub fn video(video_id: &str, duration: &str) -> Value {
    json!({
        "kind": "youtube#video",
        "id": video_id,
        "contentDetails": {"duration": duration, "dimension": "2d", "definition": "hd"}
    })
}

pub fn list(items: Vec<Value>) -> Value {
    json!({
        "kind": "youtube#listResponse",
        "pageInfo": {"totalResults": items.len(), "resultsPerPage": 50},
        "items": items
    })
}

pub fn ok(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// One subscription (`UC1`) whose uploads playlist (`UU1`) holds a recent
/// 10 minute video `v1` by "Favorite Channel".
pub async fn mount_single_channel_feed(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/subscriptions"))
        .respond_with(ok(list(vec![subscription("UC1")])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("id", "UC1"))
        .respond_with(ok(list(vec![channel("UC1", "UU1")])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", "UU1"))
        .respond_with(ok(list(vec![playlist_item(
            "v1",
            &days_ago(1),
            "Favorite Channel",
        )])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "v1"))
        .respond_with(ok(list(vec![video("v1", "PT10M")])))
        .mount(server)
        .await;
}
