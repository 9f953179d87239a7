//! YouTube Videos API types.

use eyre::Context;
use jiff::{SignedDuration, Span, SpanRelativeTo, Unit};
use serde::{Deserialize, Serialize};

/// A `video` resource, as returned with `part=contentDetails`.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#resource>
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    /// The ID that YouTube uses to uniquely identify the video.
    pub id: String,
    pub content_details: Option<VideoContentDetails>,
}

impl Video {
    /// The video's length, or `None` when YouTube did not report one.
    ///
    /// An unparseable value is an error so callers can decide how to treat it.
    pub fn duration(&self) -> eyre::Result<Option<SignedDuration>> {
        let Some(raw) = self
            .content_details
            .as_ref()
            .and_then(|details| details.duration.as_deref())
            .filter(|raw| !raw.is_empty())
        else {
            return Ok(None);
        };
        parse_duration(raw)
            .with_context(|| format!("parse duration of video {}", self.id))
            .map(Some)
    }
}

/// Information about the video content.
///
/// See: <https://developers.google.com/youtube/v3/docs/videos#contentDetails>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoContentDetails {
    /// The length of the video as an ISO 8601 duration, e.g. `PT15M33S`.
    pub duration: Option<String>,
}

/// Parses an ISO 8601 duration as YouTube reports it.
///
/// Long videos and streams may carry a day component (`P1DT2H`); days count as
/// 24 hours.
pub fn parse_duration(raw: &str) -> eyre::Result<SignedDuration> {
    let span: Span = raw
        .parse()
        .with_context(|| format!("invalid ISO 8601 duration {raw:?}"))?;
    let seconds = span
        .total((Unit::Second, SpanRelativeTo::days_are_24_hours()))
        .with_context(|| format!("duration {raw:?} has no fixed length"))?;
    Ok(SignedDuration::from_secs_f64(seconds))
}
