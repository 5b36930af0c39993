//! End-to-end tests of discovery against mock listing and AniList servers.

use ranime::discovery::{cached_listing, LISTING_NAMESPACE};
use ranime::{AniListClient, Discovery, ListingClient, RandomSource, RanimeError, PAGE_SIZE};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST_PATH: &str = "/api/list/custom";

/// Random source that returns scripted answers
struct Scripted {
    page: u32,
    index: usize,
}

impl RandomSource for Scripted {
    fn page_in(&mut self, low: u32, high: u32) -> u32 {
        assert!(low <= self.page && self.page <= high, "page {} outside [{low}, {high}]", self.page);
        self.page
    }

    fn index_below(&mut self, len: usize) -> usize {
        assert!(self.index < len);
        self.index
    }
}

/// Listing page body with `count` records numbered from `first_id`
fn listing_body(results_total: u64, first_id: u64, count: u64) -> Value {
    let results: Vec<Value> = (first_id..first_id + count)
        .map(|id| json!({ "name": format!("anime {id}"), "ani_list_id": id }))
        .collect();
    json!({ "resultsTotal": results_total, "results": results })
}

async fn mount_page(server: &MockServer, page: u32, body: Value, expected: u64) {
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("id", "list-1"))
        .and(query_param("page", page.to_string()))
        .and(header("authorization", "token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected)
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> ListingClient {
    ListingClient::new(format!("{}{LIST_PATH}", server.uri()), None).unwrap()
}

fn entry_count(root: &std::path::Path) -> usize {
    std::fs::read_dir(root.join(LISTING_NAMESPACE))
        .map(|dir| dir.count())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_discover_returns_stubbed_selection() {
    let server = MockServer::start().await;
    // Page 1 is fetched twice by discovery but only once over the network
    mount_page(&server, 1, listing_body(100, 1, 50), 1).await;

    let temp_dir = TempDir::new().unwrap();
    let listing = cached_listing(temp_dir.path(), 3600, client(&server)).unwrap();
    let mut discovery = Discovery::new(listing, Scripted { page: 1, index: 0 }, PAGE_SIZE).unwrap();

    let anime = discovery.discover("token", "list-1").await.unwrap();

    assert_eq!(anime.ani_list_id(), Some(1));
    assert_eq!(entry_count(temp_dir.path()), 1);
}

#[tokio::test]
async fn test_discover_fetches_sampled_page() {
    let server = MockServer::start().await;
    mount_page(&server, 1, listing_body(260, 1, 50), 1).await;
    mount_page(&server, 5, listing_body(260, 201, 50), 1).await;

    let temp_dir = TempDir::new().unwrap();
    let listing = cached_listing(temp_dir.path(), 3600, client(&server)).unwrap();
    let mut discovery = Discovery::new(listing, Scripted { page: 5, index: 49 }, PAGE_SIZE).unwrap();

    let anime = discovery.discover("token", "list-1").await.unwrap();

    assert_eq!(anime.ani_list_id(), Some(250));
    assert_eq!(entry_count(temp_dir.path()), 2);
}

#[tokio::test]
async fn test_short_list_samples_page_one() {
    let server = MockServer::start().await;
    mount_page(&server, 1, listing_body(30, 1, 30), 1).await;

    let temp_dir = TempDir::new().unwrap();
    let listing = cached_listing(temp_dir.path(), 3600, client(&server)).unwrap();
    let mut discovery = Discovery::new(listing, Scripted { page: 1, index: 29 }, PAGE_SIZE).unwrap();

    let anime = discovery.discover("token", "list-1").await.unwrap();

    assert_eq!(anime.ani_list_id(), Some(30));
}

#[tokio::test]
async fn test_later_runs_are_served_from_disk() {
    let server = MockServer::start().await;
    mount_page(&server, 1, listing_body(100, 1, 50), 1).await;
    mount_page(&server, 2, listing_body(100, 51, 50), 1).await;

    let temp_dir = TempDir::new().unwrap();

    for _ in 0..3 {
        let listing = cached_listing(temp_dir.path(), 3600, client(&server)).unwrap();
        let mut discovery =
            Discovery::new(listing, Scripted { page: 2, index: 3 }, PAGE_SIZE).unwrap();
        let anime = discovery.discover("token", "list-1").await.unwrap();
        assert_eq!(anime.ani_list_id(), Some(54));
    }
}

#[tokio::test]
async fn test_upstream_error_status_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad auth key"))
        .expect(2)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let listing = cached_listing(temp_dir.path(), 3600, client(&server)).unwrap();
    let mut discovery = Discovery::new(listing, Scripted { page: 1, index: 0 }, PAGE_SIZE).unwrap();

    for _ in 0..2 {
        let err = discovery.discover("token", "list-1").await.unwrap_err();
        match err {
            RanimeError::UpstreamStatus { status, body } => {
                assert_eq!(status.as_u16(), 401);
                assert_eq!(body, "bad auth key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(entry_count(temp_dir.path()), 0);
}

#[tokio::test]
async fn test_malformed_body_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let listing = cached_listing(temp_dir.path(), 3600, client(&server)).unwrap();
    let mut discovery = Discovery::new(listing, Scripted { page: 1, index: 0 }, PAGE_SIZE).unwrap();

    let err = discovery.discover("token", "list-1").await.unwrap_err();

    assert!(matches!(err, RanimeError::UpstreamBody(_)));
    assert_eq!(entry_count(temp_dir.path()), 0);
}

#[tokio::test]
async fn test_empty_page_is_sampling_error() {
    let server = MockServer::start().await;
    mount_page(&server, 1, listing_body(0, 1, 0), 1).await;

    let temp_dir = TempDir::new().unwrap();
    let listing = cached_listing(temp_dir.path(), 3600, client(&server)).unwrap();
    let mut discovery = Discovery::new(listing, Scripted { page: 1, index: 0 }, PAGE_SIZE).unwrap();

    let err = discovery.discover("token", "list-1").await.unwrap_err();

    assert!(matches!(err, RanimeError::Sampling(_)));
}

#[tokio::test]
async fn test_cover_image_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "id": 457 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "Media": { "coverImage": {
                "extraLarge": "https://img.example/xl.jpg",
                "large": "https://img.example/l.jpg",
                "medium": "https://img.example/m.jpg"
            }}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let anilist = AniListClient::new(server.uri());

    assert_eq!(
        anilist.cover_image(457).await.as_deref(),
        Some("https://img.example/xl.jpg")
    );
}

#[tokio::test]
async fn test_cover_image_failure_degrades_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "data": { "Media": null },
            "errors": [{ "message": "Not Found.", "status": 404 }]
        })))
        .mount(&server)
        .await;

    let anilist = AniListClient::new(server.uri());

    assert_eq!(anilist.cover_image(1).await, None);
}
