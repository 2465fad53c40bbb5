//! Epoch-tagged request issuing and response reconciliation
//!
//! Every query change allocates a new [`RequestEpoch`]. A completed request
//! only touches the visible state when its epoch is still the latest one
//! issued, so the view always reflects the most recently issued query no
//! matter in which order the replies arrive.
use crate::backend::{ResourceSummary, SearchRequest, SearchResult, DEFAULT_PAGE_SIZE};
use crate::error::SearchError;
use crate::facets::FacetOption;
use crate::metrics::Metrics;
use crate::query::QuerySnapshot;
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Tag of one issued request. Strictly increasing within a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestEpoch(u64);

impl fmt::Display for RequestEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A request the caller must send to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub epoch: RequestEpoch,
    pub request: SearchRequest,
}

/// What happened to a completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Discarded,
}

/// Results as last applied, plus the loading and error flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultState {
    pub loading: bool,
    pub items: Vec<ResourceSummary>,
    pub total: u64,
    pub page_size: u32,
    pub facets: BTreeMap<String, Vec<FacetOption>>,
    pub error: Option<SearchError>,
}

impl ResultState {
    fn new(page_size: u32) -> Self {
        Self {
            loading: false,
            items: Vec::new(),
            total: 0,
            page_size,
            facets: BTreeMap::new(),
            error: None,
        }
    }
}

pub struct RequestCoordinator {
    page_size: u32,
    issued: u64,
    state: ResultState,
    metrics: Arc<Metrics>,
}

impl RequestCoordinator {
    pub fn new(page_size: u32, metrics: Arc<Metrics>) -> Self {
        let page_size = if page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        Self {
            page_size,
            issued: 0,
            state: ResultState::new(page_size),
            metrics,
        }
    }

    pub fn state(&self) -> &ResultState {
        &self.state
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Epoch of the most recently issued request.
    pub fn latest_epoch(&self) -> Option<RequestEpoch> {
        (self.issued > 0).then_some(RequestEpoch(self.issued))
    }

    /// Register a query change and return the request to send for it.
    ///
    /// Previously shown items and facets stay in place while loading.
    pub fn on_query_change(&mut self, snapshot: &QuerySnapshot) -> PendingRequest {
        self.issued += 1;
        let epoch = RequestEpoch(self.issued);
        self.state.loading = true;
        self.metrics.requests_issued.inc();

        let request = SearchRequest::from_snapshot(snapshot, self.page_size);
        debug!(
            "issuing {epoch}: query='{}' page={} facets={}",
            request.text,
            request.page,
            request.facets.len()
        );
        PendingRequest { epoch, request }
    }

    /// Apply the outcome of the request tagged `epoch`, unless a newer request
    /// has been issued since, in which case it is dropped without a trace.
    pub fn complete(
        &mut self,
        epoch: RequestEpoch,
        outcome: Result<SearchResult, SearchError>,
    ) -> Completion {
        if self.latest_epoch() != Some(epoch) {
            debug!("discarding stale response {epoch}");
            self.metrics.responses_discarded.inc();
            return Completion::Discarded;
        }

        match outcome {
            Ok(result) => {
                debug!("applying {epoch}: {} of {} results", result.items.len(), result.total);
                self.state.items = result.items;
                self.state.total = result.total;
                self.state.page_size = result.page_size;
                self.state.facets = result.facets;
                self.state.error = None;
                self.metrics.responses_applied.inc();
            }
            Err(err) => {
                warn!("search {epoch} failed: {err}");
                self.state.items.clear();
                self.state.total = 0;
                self.state.error = Some(err);
                self.metrics.request_failures.inc();
            }
        }
        self.state.loading = false;
        Completion::Applied
    }
}
