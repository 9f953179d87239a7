//! YouTube Subscriptions API types.

use serde::{Deserialize, Serialize};

/// A `subscription` resource links the authenticated user to a channel.
///
/// See: <https://developers.google.com/youtube/v3/docs/subscriptions#resource>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub snippet: SubscriptionSnippet,
}

impl Subscription {
    /// The subscribed-to channel.
    pub fn channel_id(&self) -> &str {
        &self.snippet.resource_id.channel_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSnippet {
    /// The subscribed-to channel's title.
    #[serde(default)]
    pub title: String,
    pub resource_id: SubscriptionResource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResource {
    pub channel_id: String,
}
