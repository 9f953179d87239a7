//! Shared types and pagination for the YouTube API client.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll, ready};
use tokio_stream::Stream;

type PendingPage<'a, F, T> =
    Pin<Box<dyn Future<Output = eyre::Result<(F, ListResponse<T>)>> + Send + 'a>>;

/// Walks a page-token based list endpoint, yielding one item at a time.
///
/// The fetcher is called with `None` for the first page and with each returned
/// `nextPageToken` afterwards. The stream ends once a page comes back without a
/// token. An error ends the stream after it has been yielded.
pub struct PagedStream<'a, T, F> {
    buffered: VecDeque<T>,
    pending: Option<PendingPage<'a, F, T>>,
}

impl<'a, T, F> PagedStream<'a, T, F> {
    pub fn new<Fut>(fetcher: F) -> Self
    where
        F: Fn(Option<String>) -> Fut + Send + 'a,
        Fut: Future<Output = eyre::Result<ListResponse<T>>> + Send + 'a,
    {
        let first_page = async move {
            let page = fetcher(None).await?;
            Ok((fetcher, page))
        };
        Self {
            buffered: VecDeque::new(),
            pending: Some(Box::pin(first_page)),
        }
    }
}

impl<T: Unpin, F> Unpin for PagedStream<'_, T, F> {}

impl<'a, T: Unpin, F, Fut> Stream for PagedStream<'a, T, F>
where
    F: Fn(Option<String>) -> Fut + Send + 'a,
    Fut: Future<Output = eyre::Result<ListResponse<T>>> + Send + 'a,
{
    type Item = eyre::Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }

            let Some(pending) = self.pending.as_mut() else {
                return Poll::Ready(None);
            };

            match ready!(pending.as_mut().poll(cx)) {
                Ok((fetcher, page)) => {
                    self.buffered.extend(page.items);
                    // the next request is only issued once this page is drained
                    self.pending = page.next_page_token.map(|token| {
                        Box::pin(async move {
                            let page = fetcher(Some(token)).await?;
                            Ok((fetcher, page))
                        }) as PendingPage<'a, F, T>
                    });
                }
                Err(e) => {
                    self.pending = None;
                    return Poll::Ready(Some(Err(e)));
                }
            }
        }
    }
}

/// Envelope shared by every `*.list` response of the Data API.
///
/// See: <https://developers.google.com/youtube/v3/docs/subscriptions/list#response>
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Identifies the API resource's type, e.g. `youtube#subscriptionListResponse`.
    #[serde(default)]
    pub kind: String,
    /// The resources on this page. YouTube omits the field for empty results.
    #[serde(default = "VecDeque::new")]
    pub items: VecDeque<T>,
    #[serde(rename = "pageInfo")]
    pub page_info: Option<PageInfo>,
    /// Token for the next page, absent on the last page.
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

impl<T> ListResponse<T> {
    /// A response holding `items` with no further pages.
    pub fn last_page(items: impl IntoIterator<Item = T>) -> Self {
        Self::page(items, None)
    }

    pub fn page(items: impl IntoIterator<Item = T>, next_page_token: Option<String>) -> Self {
        Self {
            kind: String::new(),
            items: items.into_iter().collect(),
            page_info: None,
            next_page_token,
        }
    }
}

/// Paging details for lists of resources.
///
/// See: <https://developers.google.com/youtube/v3/docs/pageInfo>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInfo {
    /// The total number of results in the result set.
    #[serde(rename = "totalResults")]
    pub total_results: u32,
    /// The number of results included in the API response.
    #[serde(rename = "resultsPerPage")]
    pub results_per_page: u32,
}

/// Thumbnail images keyed by resolution.
///
/// See: <https://developers.google.com/youtube/v3/docs/thumbnails>
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
    pub standard: Option<Thumbnail>,
    pub maxres: Option<Thumbnail>,
}

impl Thumbnails {
    /// URL of the grid-sized image: `medium`, else `default`, else nothing.
    pub fn grid_url(&self) -> Option<&str> {
        [&self.medium, &self.default]
            .into_iter()
            .flatten()
            .map(|t| t.url.as_str())
            .next()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}
