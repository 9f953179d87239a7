//! The user's favorite channels, kept as one channel name per line in a plain
//! text file next to the server.

use std::io::ErrorKind;
use std::path::Path;

/// Reads the favorites file.
///
/// A missing file means no favorites. Any other read failure is logged and
/// treated the same, since favorites are decoration on top of the feed.
pub async fn load(path: &Path) -> Vec<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => parse(&contents),
        Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read favorites");
            Vec::new()
        }
    }
}

pub fn parse(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
