//! AniList GraphQL client for cover images.
//!
//! A missing cover only costs the report its image, so every failure here is
//! logged and turned into `None`.

use super::types::{GraphQlResponse, MediaData};
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

const COVER_IMAGE_QUERY: &str = r#"
query ($id: Int) {
  Media(id: $id, type: ANIME) {
    coverImage {
      extraLarge
      large
      medium
    }
  }
}
"#;

/// AniList client
#[derive(Debug, Clone)]
pub struct AniListClient {
    client: Client,
    graphql_url: String,
}

impl AniListClient {
    pub fn new(graphql_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            graphql_url: graphql_url.into(),
        }
    }

    /// Extra large cover image URL of an anime, or `None` on any error
    pub async fn cover_image(&self, ani_list_id: u64) -> Option<String> {
        match self.fetch_cover_image(ani_list_id).await {
            Ok(url) => {
                debug!(ani_list_id, url = %url, "Fetched cover image");
                Some(url)
            }
            Err(e) => {
                warn!(ani_list_id, error = %format!("{e:#}"), "Error fetching cover image");
                None
            }
        }
    }

    async fn fetch_cover_image(&self, ani_list_id: u64) -> Result<String> {
        let body = json!({
            "query": COVER_IMAGE_QUERY,
            "variables": { "id": ani_list_id },
        });

        let response = self
            .client
            .post(&self.graphql_url)
            .json(&body)
            .send()
            .await
            .context("AniList request failed")?
            .error_for_status()
            .context("AniList returned an error status")?;

        let data: GraphQlResponse<MediaData> = response
            .json()
            .await
            .context("Failed to parse AniList response")?;

        data.data
            .and_then(|d| d.media)
            .and_then(|m| m.cover_image.extra_large)
            .ok_or_else(|| anyhow!("AniList has no extra large cover for media {ani_list_id}"))
    }
}
