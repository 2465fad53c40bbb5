//! Canonical search query state and its address (URL query string) form
use crate::error::QueryError;
use crate::facets::FacetSelections;
use serde::Serialize;
use std::sync::Arc;
use url::form_urlencoded;

/// Parameter carrying the free-text query.
pub const QUERY_PARAM: &str = "query";
/// Parameter carrying the 1-indexed page number.
pub const PAGE_PARAM: &str = "page";
/// Backend-only parameter, never part of the state.
pub const PAGE_SIZE_PARAM: &str = "page_size";

/// Names that can never be used as facet categories in an address.
pub fn is_reserved_param(name: &str) -> bool {
    matches!(name, QUERY_PARAM | PAGE_PARAM | PAGE_SIZE_PARAM)
}

/// Immutable value fully determining what should be shown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QuerySnapshot {
    text: String,
    page: u32,
    facets: FacetSelections,
}

impl Default for QuerySnapshot {
    fn default() -> Self {
        Self {
            text: String::new(),
            page: 1,
            facets: FacetSelections::new(),
        }
    }
}

impl QuerySnapshot {
    pub fn new(text: &str, page: u32, facets: FacetSelections) -> Self {
        Self {
            text: text.trim().to_string(),
            page: page.max(1),
            facets,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn facets(&self) -> &FacetSelections {
        &self.facets
    }

    /// An empty query matches everything.
    pub fn matches_all(&self) -> bool {
        self.text.is_empty()
    }

    /// Encode as `query=..&page=..&<category>=<value>...`.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair(QUERY_PARAM, &self.text);
        serializer.append_pair(PAGE_PARAM, &self.page.to_string());
        for (category, value) in self.facets.pairs() {
            serializer.append_pair(category, value);
        }
        serializer.finish()
    }

    /// Parse an address or bare query string.
    ///
    /// Anything before a `?` is ignored. A missing, non-numeric or zero page
    /// becomes 1 and an absent query means "match all". Every other
    /// non-reserved parameter is read as a facet selection.
    pub fn from_query_string(address: &str) -> Self {
        let qs = match address.split_once('?') {
            Some((_, rest)) => rest,
            None => address,
        };
        let qs = qs.split('#').next().unwrap_or_default();

        let mut text = String::new();
        let mut page = 1;
        let mut facets = FacetSelections::new();

        for (key, value) in form_urlencoded::parse(qs.as_bytes()) {
            match key.as_ref() {
                QUERY_PARAM => text = value.into_owned(),
                PAGE_PARAM => {
                    page = value
                        .trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|p| *p >= 1)
                        .unwrap_or(1);
                }
                PAGE_SIZE_PARAM => {}
                category => facets.insert(category, &value),
            }
        }

        Self::new(&text, page, facets)
    }
}

/// Holder of the current snapshot and the only place it is mutated.
///
/// Each mutator returns the new snapshot when the state changed and `None`
/// when the call was a no-op, so callers only refetch on real changes.
#[derive(Debug, Clone, Default)]
pub struct SearchQueryState {
    current: Arc<QuerySnapshot>,
}

impl SearchQueryState {
    pub fn new(initial: QuerySnapshot) -> Self {
        Self {
            current: Arc::new(initial),
        }
    }

    pub fn from_address(address: &str) -> Self {
        Self::new(QuerySnapshot::from_query_string(address))
    }

    pub fn snapshot(&self) -> Arc<QuerySnapshot> {
        Arc::clone(&self.current)
    }

    /// Trim and store new query text, returning to the first page.
    pub fn set_text(&mut self, text: &str) -> Option<Arc<QuerySnapshot>> {
        let text = text.trim();
        if text == self.current.text && self.current.page == 1 {
            return None;
        }
        self.replace(QuerySnapshot {
            text: text.to_string(),
            page: 1,
            facets: self.current.facets.clone(),
        })
    }

    /// Jump to a page. Pages past the last known total are allowed and
    /// simply come back empty.
    pub fn set_page(&mut self, page: u32) -> Result<Option<Arc<QuerySnapshot>>, QueryError> {
        if page == 0 {
            return Err(QueryError::InvalidPage(page));
        }
        if page == self.current.page {
            return Ok(None);
        }
        Ok(self.replace(QuerySnapshot {
            text: self.current.text.clone(),
            page,
            facets: self.current.facets.clone(),
        }))
    }

    /// Replace the facet selections wholesale, returning to the first page.
    pub fn set_facet_selections(&mut self, facets: FacetSelections) -> Option<Arc<QuerySnapshot>> {
        if facets == self.current.facets && self.current.page == 1 {
            return None;
        }
        self.replace(QuerySnapshot {
            text: self.current.text.clone(),
            page: 1,
            facets,
        })
    }

    fn replace(&mut self, next: QuerySnapshot) -> Option<Arc<QuerySnapshot>> {
        self.current = Arc::new(next);
        Some(self.snapshot())
    }
}
