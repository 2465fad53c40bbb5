//! HTTP client for the `/search` endpoint
use super::{SearchBackend, SearchRequest, SearchResult};
use crate::error::{CatalogError, SearchError};
use crate::query::{PAGE_PARAM, PAGE_SIZE_PARAM, QUERY_PARAM};
use async_trait::async_trait;
use log::debug;
use std::time::Duration;
use url::Url;

pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpBackend {
    /// Build a client for the API rooted at `api_url`.
    pub fn new(api_url: &str, timeout: Duration) -> crate::error::Result<Self> {
        let mut base = Url::parse(api_url)
            .map_err(|e| CatalogError::Config(format!("invalid api_url '{api_url}': {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join("search/")
            .map_err(|e| CatalogError::Config(format!("invalid api_url '{api_url}': {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    /// Full request URL; facet values become repeated category parameters.
    pub fn request_url(&self, request: &SearchRequest) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair(QUERY_PARAM, &request.text)
                .append_pair(PAGE_PARAM, &request.page.to_string())
                .append_pair(PAGE_SIZE_PARAM, &request.page_size.to_string());
            for (category, value) in request.facets.pairs() {
                pairs.append_pair(category, value);
            }
        }
        url
    }
}

#[async_trait]
impl SearchBackend for HttpBackend {
    async fn search(&self, request: SearchRequest) -> Result<SearchResult, SearchError> {
        let url = self.request_url(&request);
        debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SearchError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::status(
                status.as_u16(),
                status.canonical_reason().unwrap_or("unexpected status"),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SearchError::transport(e.to_string()))?;
        SearchResult::from_json(&body)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facets::FacetSelections;

    fn request() -> SearchRequest {
        SearchRequest {
            text: "sea level".to_string(),
            page: 2,
            page_size: 10,
            facets: [("type", "article"), ("type", "report")].into_iter().collect(),
        }
    }

    #[test]
    fn request_url_keeps_api_prefix() {
        let backend = HttpBackend::new("http://localhost:8000/api", Duration::from_secs(5)).unwrap();
        assert_eq!(
            backend.request_url(&request()).as_str(),
            "http://localhost:8000/api/search/?query=sea+level&page=2&page_size=10&type=article&type=report"
        );
    }

    #[test]
    fn request_url_without_facets() {
        let backend = HttpBackend::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        let req = SearchRequest {
            facets: FacetSelections::new(),
            ..request()
        };
        assert_eq!(
            backend.request_url(&req).as_str(),
            "http://localhost:8000/search/?query=sea+level&page=2&page_size=10"
        );
    }

    #[test]
    fn reserved_facet_category_does_not_reach_the_request() {
        let backend = HttpBackend::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        let req = SearchRequest {
            text: String::new(),
            page: 1,
            facets: FacetSelections::new().toggle("page", "x").toggle("type", "article"),
            ..request()
        };
        assert_eq!(
            backend.request_url(&req).as_str(),
            "http://localhost:8000/search/?query=&page=1&page_size=10&type=article"
        );
    }

    #[test]
    fn rejects_invalid_api_url() {
        assert!(matches!(
            HttpBackend::new("not a url", Duration::from_secs(5)),
            Err(CatalogError::Config(_))
        ));
    }
}
