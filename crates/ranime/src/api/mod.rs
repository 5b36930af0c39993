//! Remote APIs.
//!
//! The randomanime.org listing API supplies the anime; AniList supplies the
//! cover image.

pub mod anilist;
pub mod client;
pub mod types;

pub use anilist::AniListClient;
pub use client::ListingClient;
pub use types::*;
