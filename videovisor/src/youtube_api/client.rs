//! HTTP implementation of [`YouTubeApi`] on top of `reqwest`.

use crate::youtube_api::playlists::{
    InsertedPlaylistItem, PlaylistInsertRequest, PlaylistItemInsertRequest,
};
use crate::youtube_api::{
    BatchEntry, Channel, ListResponse, MAX_IDS_PER_CALL, MAX_PAGE_SIZE, Playlist, PlaylistItem,
    Subscription, Video, YouTubeApi,
};
use eyre::Context;
use futures_util::future::join_all;
use http::Method;
use oauth2::AccessToken;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

/// Production endpoint of the Data API.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Client for the YouTube Data API v3, bound to one user's access token.
///
/// The client does not refresh tokens itself; it is built per request from a
/// credential that [`crate::credentials`] has already validated. Cloning is
/// cheap and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    access_token: AccessToken,
    client: reqwest::Client,
    base_url: String,
}

impl YouTubeClient {
    /// Creates a client talking to the production API.
    pub fn new(access_token: AccessToken, client: reqwest::Client) -> Self {
        Self::with_base_url(access_token, client, DEFAULT_BASE_URL)
    }

    /// Creates a client against another deployment of the API (used by tests).
    pub fn with_base_url(
        access_token: AccessToken,
        client: reqwest::Client,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            access_token,
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Makes an authenticated request and fails on any non-2xx status.
    ///
    /// Google reports failures as `{"error": {"message": ...}}`; that message is
    /// surfaced when present, otherwise the raw body is.
    #[instrument(skip(self, json_body), level = tracing::Level::TRACE)]
    async fn make_authenticated_request(
        &self,
        method: Method,
        resource: &str,
        query_params: &[(&str, &str)],
        json_body: Option<&(impl Serialize + Sync)>,
    ) -> eyre::Result<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, resource);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(self.access_token.secret())
            .query(query_params);
        if let Some(body) = json_body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("send {method} request to YouTube API: {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            let message = serde_json::from_str::<ApiErrorBody>(&error_text)
                .map(|body| body.error.message)
                .unwrap_or(error_text);
            eyre::bail!("YouTube API {method} {resource} failed with status {status}: {message}");
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        query_params: &[(&str, &str)],
    ) -> eyre::Result<T> {
        self.make_authenticated_request(Method::GET, resource, query_params, None::<&()>)
            .await?
            .json()
            .await
            .with_context(|| format!("parse YouTube {resource} response as JSON"))
    }

    /// Most recent entries of one playlist (`playlistItems.list`).
    #[instrument(skip(self))]
    pub async fn list_playlist_items(
        &self,
        playlist_id: &str,
        max_results: u32,
    ) -> eyre::Result<ListResponse<PlaylistItem>> {
        let max_results = max_results.min(MAX_PAGE_SIZE).to_string();
        let items: ListResponse<PlaylistItem> = self
            .get_json(
                "playlistItems",
                &[
                    ("part", "snippet,contentDetails"),
                    ("playlistId", playlist_id),
                    ("maxResults", max_results.as_str()),
                ],
            )
            .await?;

        tracing::trace!(
            playlist_id,
            returned_items = items.items.len(),
            "fetched playlist items"
        );
        Ok(items)
    }
}

impl YouTubeApi for YouTubeClient {
    #[instrument(skip(self))]
    async fn list_my_subscriptions(
        &self,
        page_token: Option<String>,
    ) -> eyre::Result<ListResponse<Subscription>> {
        let max_results = MAX_PAGE_SIZE.to_string();
        let mut query_params = vec![
            ("part", "snippet"),
            ("mine", "true"),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(ref token) = page_token {
            query_params.push(("pageToken", token.as_str()));
        }

        let subscriptions: ListResponse<Subscription> =
            self.get_json("subscriptions", &query_params).await?;

        tracing::debug!(
            total_results = subscriptions.page_info.as_ref().map(|p| p.total_results),
            returned_items = subscriptions.items.len(),
            "fetched subscriptions"
        );
        Ok(subscriptions)
    }

    #[instrument(skip(self, ids), fields(ids = ids.len()))]
    async fn list_channels(&self, ids: &[String]) -> eyre::Result<Vec<Channel>> {
        eyre::ensure!(
            ids.len() <= MAX_IDS_PER_CALL,
            "at most {MAX_IDS_PER_CALL} channel ids per call, got {}",
            ids.len()
        );
        let ids = ids.join(",");
        let channels: ListResponse<Channel> = self
            .get_json("channels", &[("part", "contentDetails"), ("id", ids.as_str())])
            .await?;

        tracing::debug!(returned_items = channels.items.len(), "fetched channels");
        Ok(channels.items.into())
    }

    #[instrument(skip(self, playlist_ids), fields(playlists = playlist_ids.len()))]
    async fn list_playlist_items_batch(
        &self,
        playlist_ids: &[String],
        max_results: u32,
    ) -> eyre::Result<Vec<BatchEntry<Vec<PlaylistItem>>>> {
        eyre::ensure!(
            playlist_ids.len() <= MAX_IDS_PER_CALL,
            "at most {MAX_IDS_PER_CALL} requests per batch, got {}",
            playlist_ids.len()
        );

        // Each logical request runs on its own; the batch resolves once all
        // of them have, in input order.
        let requests = playlist_ids.iter().map(|playlist_id| async move {
            let items = self
                .list_playlist_items(playlist_id, max_results)
                .await
                .map(|response| Vec::from(response.items));
            (playlist_id.clone(), items)
        });
        let entries = join_all(requests).await;

        tracing::debug!(
            failed = entries.iter().filter(|(_, r)| r.is_err()).count(),
            "fetched playlist items batch"
        );
        Ok(entries)
    }

    #[instrument(skip(self, ids), fields(ids = ids.len()))]
    async fn list_videos(&self, ids: &[String]) -> eyre::Result<Vec<Video>> {
        eyre::ensure!(
            ids.len() <= MAX_IDS_PER_CALL,
            "at most {MAX_IDS_PER_CALL} video ids per call, got {}",
            ids.len()
        );
        let ids = ids.join(",");
        let videos: ListResponse<Video> = self
            .get_json("videos", &[("part", "contentDetails"), ("id", ids.as_str())])
            .await?;

        tracing::debug!(returned_items = videos.items.len(), "fetched videos");
        Ok(videos.items.into())
    }

    #[instrument(skip(self))]
    async fn list_my_playlists(
        &self,
        page_token: Option<String>,
    ) -> eyre::Result<ListResponse<Playlist>> {
        let max_results = MAX_PAGE_SIZE.to_string();
        let mut query_params = vec![
            ("part", "snippet"),
            ("mine", "true"),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(ref token) = page_token {
            query_params.push(("pageToken", token.as_str()));
        }

        let playlists: ListResponse<Playlist> = self.get_json("playlists", &query_params).await?;

        tracing::debug!(
            returned_items = playlists.items.len(),
            "fetched own playlists"
        );
        Ok(playlists)
    }

    #[instrument(skip(self), ret)]
    async fn insert_playlist(&self, request: &PlaylistInsertRequest) -> eyre::Result<Playlist> {
        let playlist: Playlist = self
            .make_authenticated_request(
                Method::POST,
                "playlists",
                &[("part", "snippet,status")],
                Some(request),
            )
            .await?
            .json()
            .await
            .context("parse YouTube playlists.insert response as JSON")?;

        tracing::info!(playlist_id = %playlist.id, title = %playlist.snippet.title, "created playlist");
        Ok(playlist)
    }

    #[instrument(skip(self))]
    async fn insert_playlist_item(&self, playlist_id: &str, video_id: &str) -> eyre::Result<String> {
        let body = PlaylistItemInsertRequest::video(playlist_id, video_id);
        let item: InsertedPlaylistItem = self
            .make_authenticated_request(
                Method::POST,
                "playlistItems",
                &[("part", "snippet")],
                Some(&body),
            )
            .await?
            .json()
            .await
            .context("parse YouTube playlistItems.insert response as JSON")?;

        tracing::debug!(item_id = %item.id, "inserted playlist item");
        Ok(item.id)
    }
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorDetail {
    message: String,
}
