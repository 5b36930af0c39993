//! Random anime discovery.
//!
//! Picks one record from a paginated custom list in two rounds. Page 1 gives
//! `resultsTotal`, from which the page count is `floor(total / page_size)`
//! clamped to at least 1. A page is then drawn uniformly from `1..=page_count`
//! and a record uniformly from that page. Records past the last whole page are
//! never drawn. Both fetches go through the call cache.

use crate::api::{AnimeRecord, ListingClient, ListingPage, ListingQuery};
use crate::cache::{CacheError, Clock, ExpiringCache};
use crate::error::{RanimeError, Result};
use rand::Rng;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use tracing::{debug, info};

/// Records per page served by the listing API
pub const PAGE_SIZE: u32 = 50;

/// Cache namespace of listing page fetches
pub const LISTING_NAMESPACE: &str = "get_randomanime_page";

/// Arguments that identify a listing page; the auth key is not one of them
pub const LISTING_KEY_ARGUMENTS: [&str; 2] = ["id", "page"];

/// Something that can produce listing pages
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn page(&self, query: ListingQuery) -> Result<ListingPage>;
}

impl PageSource for ListingClient {
    async fn page(&self, query: ListingQuery) -> Result<ListingPage> {
        self.fetch_page(query).await
    }
}

impl<F, C, Fut> PageSource for ExpiringCache<F, C>
where
    F: Fn(ListingQuery) -> Fut,
    Fut: Future<Output = Result<ListingPage>>,
    C: Clock,
{
    async fn page(&self, query: ListingQuery) -> Result<ListingPage> {
        self.invoke(query).await
    }
}

/// Future returned by the cached listing call
pub type PageFuture = Pin<Box<dyn Future<Output = Result<ListingPage>>>>;

/// Wrap a listing client in the call cache
pub fn cached_listing(
    root: impl AsRef<Path>,
    expiry_seconds: u64,
    client: ListingClient,
) -> std::result::Result<ExpiringCache<impl Fn(ListingQuery) -> PageFuture>, CacheError> {
    ExpiringCache::new(
        root,
        LISTING_NAMESPACE,
        expiry_seconds,
        LISTING_KEY_ARGUMENTS,
        move |query: ListingQuery| -> PageFuture {
            let client = client.clone();
            Box::pin(async move { client.fetch_page(query).await })
        },
    )
}

/// Source of randomness for sampling
pub trait RandomSource {
    /// Uniform integer in `[low, high]`
    fn page_in(&mut self, low: u32, high: u32) -> u32;

    /// Uniform index in `[0, len)`; `len` is never zero
    fn index_below(&mut self, len: usize) -> usize;
}

/// Randomness backed by a `rand` generator
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl RngSource<rand::rngs::ThreadRng> {
    pub fn thread() -> Self {
        Self(rand::thread_rng())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn page_in(&mut self, low: u32, high: u32) -> u32 {
        self.0.gen_range(low..=high)
    }

    fn index_below(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

/// Number of pages to sample from.
///
/// Whole pages only, as the listing API reports them, but never less than one
/// so lists shorter than a page still yield page 1.
pub fn page_count(results_total: u64, page_size: u32) -> u32 {
    let full_pages = results_total / u64::from(page_size.max(1));
    u32::try_from(full_pages).unwrap_or(u32::MAX).max(1)
}

/// Take one record at random out of a page
pub fn pick_record<G: RandomSource>(
    random: &mut G,
    mut results: Vec<AnimeRecord>,
    page: u32,
) -> Result<AnimeRecord> {
    if results.is_empty() {
        return Err(RanimeError::Sampling(format!("page {page} has no results")));
    }

    let index = random.index_below(results.len());
    if index >= results.len() {
        return Err(RanimeError::Sampling(format!(
            "index {index} out of range for page {page} with {} results",
            results.len()
        )));
    }

    Ok(results.swap_remove(index))
}

/// Two-round random pick over a paginated list
pub struct Discovery<P, G> {
    pages: P,
    random: G,
    page_size: u32,
}

impl<P: PageSource, G: RandomSource> Discovery<P, G> {
    /// Create a discovery over `pages`, which serves `page_size` records per page
    pub fn new(pages: P, random: G, page_size: u32) -> Result<Self> {
        if page_size == 0 {
            return Err(RanimeError::Sampling("page size must be positive".to_string()));
        }

        Ok(Self {
            pages,
            random,
            page_size,
        })
    }

    pub fn pages(&self) -> &P {
        &self.pages
    }

    /// Pick a random anime from a custom list
    pub async fn discover(&mut self, auth_key: &str, list_id: &str) -> Result<AnimeRecord> {
        let first = self
            .pages
            .page(ListingQuery::new(auth_key, list_id, 1))
            .await?;

        let pages = page_count(first.results_total, self.page_size);
        let page = self.random.page_in(1, pages);
        info!(
            list_id = %list_id,
            results_total = first.results_total,
            pages,
            page,
            "Sampled listing page"
        );

        let listing = self
            .pages
            .page(ListingQuery::new(auth_key, list_id, page))
            .await?;

        let anime = pick_record(&mut self.random, listing.results, page)?;
        debug!(name = anime.name(), ani_list_id = ?anime.ani_list_id(), "Picked anime");

        Ok(anime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Pages served from memory, recording every request
    struct MemoryPages {
        pages: HashMap<u32, ListingPage>,
        requests: RefCell<Vec<u32>>,
    }

    impl MemoryPages {
        fn new(results_total: u64, pages: &[(u32, usize)]) -> Self {
            let pages = pages
                .iter()
                .map(|&(page, count)| {
                    let results = (0..count)
                        .map(|i| {
                            serde_json::from_value(json!({
                                "name": format!("anime {page}-{i}"),
                                "ani_list_id": page as usize * 1000 + i
                            }))
                            .unwrap()
                        })
                        .collect();
                    (
                        page,
                        ListingPage {
                            results_total,
                            results,
                        },
                    )
                })
                .collect();

            Self {
                pages,
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageSource for MemoryPages {
        async fn page(&self, query: ListingQuery) -> Result<ListingPage> {
            self.requests.borrow_mut().push(query.page);
            self.pages
                .get(&query.page)
                .cloned()
                .ok_or_else(|| RanimeError::Sampling(format!("no page {}", query.page)))
        }
    }

    /// Returns fixed answers and records the ranges it was asked for
    struct FixedRandom {
        page: u32,
        index: usize,
        page_ranges: Vec<(u32, u32)>,
    }

    impl FixedRandom {
        fn new(page: u32, index: usize) -> Self {
            Self {
                page,
                index,
                page_ranges: Vec::new(),
            }
        }
    }

    impl RandomSource for FixedRandom {
        fn page_in(&mut self, low: u32, high: u32) -> u32 {
            self.page_ranges.push((low, high));
            self.page
        }

        fn index_below(&mut self, _len: usize) -> usize {
            self.index
        }
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(260, 50), 5);
        assert_eq!(page_count(100, 50), 2);
        assert_eq!(page_count(50, 50), 1);
        assert_eq!(page_count(30, 50), 1);
        assert_eq!(page_count(0, 50), 1);
    }

    #[test]
    fn test_rng_source_stays_in_range() {
        use rand::SeedableRng;

        let mut random = RngSource(rand::rngs::StdRng::seed_from_u64(7));
        for _ in 0..500 {
            let page = random.page_in(1, page_count(260, PAGE_SIZE));
            assert!((1..=5).contains(&page));
            assert!(random.index_below(3) < 3);
        }
        assert_eq!(random.page_in(1, page_count(30, PAGE_SIZE)), 1);
    }

    #[test]
    fn test_pick_record_rejects_empty_page() {
        let mut random = FixedRandom::new(1, 0);
        let result = pick_record(&mut random, Vec::new(), 3);
        assert!(matches!(result, Err(RanimeError::Sampling(_))));
    }

    #[test]
    fn test_pick_record_rejects_out_of_range_index() {
        let mut random = FixedRandom::new(1, 5);
        let records = vec![serde_json::from_value(json!({"name": "only"})).unwrap()];
        let result = pick_record(&mut random, records, 1);
        assert!(matches!(result, Err(RanimeError::Sampling(_))));
    }

    #[test]
    fn test_new_rejects_zero_page_size() {
        let pages = MemoryPages::new(10, &[(1, 10)]);
        assert!(Discovery::new(pages, FixedRandom::new(1, 0), 0).is_err());
    }

    #[tokio::test]
    async fn test_discover_samples_from_page_count() -> Result<()> {
        let pages = MemoryPages::new(260, &[(1, 50), (4, 50)]);
        let mut discovery = Discovery::new(pages, FixedRandom::new(4, 7), PAGE_SIZE)?;

        let anime = discovery.discover("token", "list-1").await?;

        assert_eq!(anime.ani_list_id(), Some(4007));
        assert_eq!(discovery.random.page_ranges, vec![(1, 5)]);
        assert_eq!(*discovery.pages().requests.borrow(), vec![1, 4]);
        Ok(())
    }

    #[tokio::test]
    async fn test_discover_short_list_uses_page_one() -> Result<()> {
        let pages = MemoryPages::new(30, &[(1, 30)]);
        let mut discovery = Discovery::new(pages, FixedRandom::new(1, 29), PAGE_SIZE)?;

        let anime = discovery.discover("token", "list-1").await?;

        assert_eq!(anime.ani_list_id(), Some(1029));
        assert_eq!(discovery.random.page_ranges, vec![(1, 1)]);
        assert_eq!(*discovery.pages().requests.borrow(), vec![1, 1]);
        Ok(())
    }

    #[tokio::test]
    async fn test_discover_empty_sampled_page() {
        let pages = MemoryPages::new(100, &[(1, 50), (2, 0)]);
        let mut discovery = Discovery::new(pages, FixedRandom::new(2, 0), PAGE_SIZE).unwrap();

        let result = discovery.discover("token", "list-1").await;

        assert!(matches!(result, Err(RanimeError::Sampling(_))));
    }
}
