//! YouTube Data API v3 client library.
//!
//! The dashboard only needs a handful of read endpoints (subscriptions, channels,
//! playlist items, videos) plus the two inserts behind "watch later". They are
//! collected in the [`YouTubeApi`] trait so the feed pipeline and the watch-later
//! workflow can be driven by [`YouTubeClient`] in production and by an in-memory
//! fake in tests.
//!
//! Every id-list and batch call is limited to [`MAX_IDS_PER_CALL`] entries by
//! the API; callers chunk before calling.

pub mod channels;
pub mod client;
pub mod playlists;
pub mod subscriptions;
pub mod types;
pub mod videos;

#[cfg(test)]
pub(crate) mod fake;

use std::future::Future;

pub use channels::Channel;
pub use client::YouTubeClient;
pub use playlists::{Playlist, PlaylistInsertRequest, PlaylistItem};
pub use subscriptions::Subscription;
pub use types::{ListResponse, PageInfo, PagedStream, Thumbnails};
pub use videos::Video;

/// Largest `maxResults` the list endpoints accept.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Largest number of ids (or batched requests) the API accepts in one call.
pub const MAX_IDS_PER_CALL: usize = 50;

/// One entry of a batched call: the key it was issued for and its own outcome.
pub type BatchEntry<T> = (String, eyre::Result<T>);

/// The YouTube operations the dashboard depends on.
///
/// Implementations must be shareable across tasks; every method takes `&self`.
pub trait YouTubeApi: Sync {
    /// One page of the authenticated user's subscriptions (`subscriptions.list?mine=true`).
    fn list_my_subscriptions(
        &self,
        page_token: Option<String>,
    ) -> impl Future<Output = eyre::Result<ListResponse<Subscription>>> + Send;

    /// Channel details for at most [`MAX_IDS_PER_CALL`] ids.
    ///
    /// Unknown ids are simply absent from the result.
    fn list_channels(&self, ids: &[String])
    -> impl Future<Output = eyre::Result<Vec<Channel>>> + Send;

    /// The `max_results` most recent items of each playlist, as one batch of at
    /// most [`MAX_IDS_PER_CALL`] requests.
    ///
    /// The outer call only fails if the batch as a whole could not be issued;
    /// each playlist gets its own result, in input order.
    fn list_playlist_items_batch(
        &self,
        playlist_ids: &[String],
        max_results: u32,
    ) -> impl Future<Output = eyre::Result<Vec<BatchEntry<Vec<PlaylistItem>>>>> + Send;

    /// Video details for at most [`MAX_IDS_PER_CALL`] ids.
    ///
    /// Deleted or private videos are absent from the result.
    fn list_videos(&self, ids: &[String]) -> impl Future<Output = eyre::Result<Vec<Video>>> + Send;

    /// One page of the authenticated user's playlists (`playlists.list?mine=true`).
    fn list_my_playlists(
        &self,
        page_token: Option<String>,
    ) -> impl Future<Output = eyre::Result<ListResponse<Playlist>>> + Send;

    /// Creates a playlist and returns it.
    fn insert_playlist(
        &self,
        request: &PlaylistInsertRequest,
    ) -> impl Future<Output = eyre::Result<Playlist>> + Send;

    /// Appends a video to a playlist, returning the new playlist item's id.
    fn insert_playlist_item(
        &self,
        playlist_id: &str,
        video_id: &str,
    ) -> impl Future<Output = eyre::Result<String>> + Send;
}
