//! Response types for the randomanime.org listing API and AniList.

use crate::cache::CallArguments;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Arguments of one listing page request
#[derive(Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub auth_key: String,
    pub list_id: String,
    pub page: u32,
}

impl ListingQuery {
    pub fn new(auth_key: impl Into<String>, list_id: impl Into<String>, page: u32) -> Self {
        Self {
            auth_key: auth_key.into(),
            list_id: list_id.into(),
            page,
        }
    }
}

// The auth key never ends up in logs
impl fmt::Debug for ListingQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListingQuery")
            .field("auth_key", &"<redacted>")
            .field("list_id", &self.list_id)
            .field("page", &self.page)
            .finish()
    }
}

impl CallArguments for ListingQuery {
    fn argument(&self, name: &str) -> Option<String> {
        match name {
            "auth_key" => Some(self.auth_key.clone()),
            "id" => Some(self.list_id.clone()),
            "page" => Some(self.page.to_string()),
            _ => None,
        }
    }

    fn is_empty(&self) -> bool {
        false
    }
}

/// One page of a custom list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingPage {
    /// Number of records across all pages
    #[serde(rename = "resultsTotal")]
    pub results_total: u64,
    /// Records on this page only
    pub results: Vec<AnimeRecord>,
}

/// An anime as returned by the listing API.
///
/// Kept as the raw JSON object; accessors read the fields the report needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimeRecord(Map<String, Value>);

/// Streaming platform entry of an anime
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StreamingLink {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub audio: Option<Vec<String>>,
}

impl AnimeRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw field access
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// AniList media id, accepting numbers and numeric strings
    pub fn ani_list_id(&self) -> Option<u64> {
        numeric(self.get("ani_list_id")?)
    }

    /// MyAnimeList id, accepting numbers and numeric strings
    pub fn my_anime_list_id(&self) -> Option<u64> {
        numeric(self.get("my_anime_list_id")?)
    }

    /// A string field, ignoring null and empty strings
    pub fn text(&self, field: &str) -> Option<&str> {
        match self.get(field)? {
            Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// A scalar field rendered for display, ignoring null, false and empty values
    pub fn display(&self, field: &str) -> Option<String> {
        match self.get(field)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(true) => Some("yes".to_string()),
            _ => None,
        }
    }

    /// A list of strings; non-string items are skipped
    pub fn list(&self, field: &str) -> Vec<&str> {
        match self.get(field) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.text("name").unwrap_or("Unknown title")
    }

    pub fn english_name(&self) -> Option<&str> {
        self.text("english_name")
    }

    pub fn description(&self) -> Option<&str> {
        self.text("description")
    }

    pub fn trailer(&self) -> Option<&str> {
        self.text("trailer")
    }

    /// Streaming links; malformed entries are skipped
    pub fn links(&self) -> Vec<StreamingLink> {
        match self.get("links") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn numeric(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// AniList GraphQL response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
}

/// `data` of the cover image query
#[derive(Debug, Clone, Deserialize)]
pub struct MediaData {
    #[serde(rename = "Media")]
    pub media: Option<Media>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Media {
    #[serde(rename = "coverImage")]
    pub cover_image: CoverImage,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImage {
    pub extra_large: Option<String>,
    pub large: Option<String>,
    pub medium: Option<String>,
}
