//! Search backend seam and the wire shapes it exchanges
pub mod http;
pub mod memory;

use crate::error::SearchError;
use crate::facets::{FacetOption, FacetSelections};
use crate::query::QuerySnapshot;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use http::HttpBackend;
pub use memory::{CatalogEntry, MemoryBackend};

/// Default number of results per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Largest page size the search endpoint accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Everything the backend needs to answer one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub text: String,
    pub page: u32,
    pub page_size: u32,
    pub facets: FacetSelections,
}

impl SearchRequest {
    pub fn from_snapshot(snapshot: &QuerySnapshot, page_size: u32) -> Self {
        Self {
            text: snapshot.text().to_string(),
            page: snapshot.page(),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            facets: snapshot.facets().clone(),
        }
    }
}

/// Summary of a catalog resource as listed in search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// One page of results plus the facet options for the filters in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub items: Vec<ResourceSummary>,
    pub total: u64,
    pub page_size: u32,
    #[serde(default)]
    pub facets: BTreeMap<String, Vec<FacetOption>>,
}

impl SearchResult {
    /// Decode a response body, rejecting shapes that cannot be paginated.
    pub fn from_json(body: &[u8]) -> Result<Self, SearchError> {
        let result: SearchResult =
            serde_json::from_slice(body).map_err(|e| SearchError::malformed(e.to_string()))?;
        if result.page_size == 0 {
            return Err(SearchError::malformed("page_size must be greater than zero"));
        }
        Ok(result)
    }
}

/// Anything that can answer a search request.
///
/// `page` is 1-indexed, an empty text matches every resource and unknown
/// facet categories or values are ignored rather than rejected.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, request: SearchRequest) -> Result<SearchResult, SearchError>;

    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_response_without_facets() {
        let body = br#"{"items":[{"id":"1","title":"Tides","authors":["A. Lee"],"date":"2020-01-01"}],"total":1,"page_size":10}"#;
        let result = SearchResult::from_json(body).unwrap();
        assert_eq!(result.items[0].title, "Tides");
        assert!(result.facets.is_empty());
    }

    #[test]
    fn missing_fields_are_malformed() {
        let err = SearchResult::from_json(br#"{"items":[]}"#).unwrap_err();
        assert!(matches!(err, SearchError::Malformed { .. }));
    }

    #[test]
    fn zero_page_size_is_malformed() {
        let err = SearchResult::from_json(br#"{"items":[],"total":0,"page_size":0}"#).unwrap_err();
        assert!(matches!(err, SearchError::Malformed { .. }));
    }

    #[test]
    fn request_clamps_page_size() {
        let snapshot = QuerySnapshot::new("x", 2, FacetSelections::new());
        assert_eq!(SearchRequest::from_snapshot(&snapshot, 500).page_size, MAX_PAGE_SIZE);
        assert_eq!(SearchRequest::from_snapshot(&snapshot, 0).page_size, 1);
    }
}
