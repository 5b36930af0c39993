//! ranime library: pick a random anime from a randomanime.org custom list.
//!
//! Listing pages are fetched through an on-disk expiring call cache, a page
//! and then a record are sampled at random, and AniList supplies the cover.

pub mod api;
pub mod cache;
pub mod credentials;
pub mod discovery;
pub mod error;
pub mod report;

pub use api::{AniListClient, AnimeRecord, ListingClient, ListingPage, ListingQuery};
pub use cache::{CacheError, CallArgs, CallArguments, Clock, ExpiringCache, SystemClock};
pub use credentials::{CredentialError, Credentials};
pub use discovery::{Discovery, PageSource, RandomSource, RngSource, PAGE_SIZE};
pub use error::{RanimeError, Result};
