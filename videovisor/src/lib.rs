//! A personal dashboard of recent, full-length uploads from the channels a
//! YouTube user is subscribed to.
//!
//! The interesting part is [`feed`]: it walks the user's subscriptions through
//! the Data API in batches, keeps what was uploaded in the last 30 days and is
//! longer than three minutes, and orders it newest first. The result is kept in
//! [`cache`] for 15 minutes. [`web`] puts an OAuth login and a small JSON and
//! HTML surface in front of it, and [`watch_later`] lets the user queue a video
//! into a private playlist.

pub mod cache;
pub mod config;
pub mod credentials;
pub mod favorites;
pub mod feed;
pub mod oauth;
pub mod watch_later;
pub mod web;
pub mod youtube_api;
