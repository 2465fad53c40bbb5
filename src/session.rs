//! One search session: query state, coordinator, backend and address
//!
//! User events are reduced synchronously into a new query snapshot; when the
//! snapshot changed the address is rewritten and a request is spawned. Every
//! spawned request reports back over a channel tagged with its epoch and the
//! session applies completions one at a time, so no state is shared with the
//! request tasks.
use crate::address::{address_for, AddressStore};
use crate::backend::{SearchBackend, SearchResult};
use crate::coordinator::{Completion, RequestCoordinator, RequestEpoch};
use crate::error::{QueryError, SearchError};
use crate::metrics::Metrics;
use crate::pagination::total_pages;
use crate::query::{QuerySnapshot, SearchQueryState};
use crate::view::ViewModel;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

/// A user-initiated action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SubmitText(String),
    GotoPage(u32),
    NextPage,
    PrevPage,
    ToggleFacet { category: String, value: String },
    ClearFacets,
    /// Load a whole address, as when following a shared link.
    Navigate(String),
}

/// Outcome of a backend call, delivered back to the session.
#[derive(Debug)]
pub struct Finished {
    pub epoch: RequestEpoch,
    pub outcome: Result<SearchResult, SearchError>,
}

pub struct SearchSession {
    query: SearchQueryState,
    coordinator: RequestCoordinator,
    backend: Arc<dyn SearchBackend>,
    address: Box<dyn AddressStore>,
    finished_tx: mpsc::UnboundedSender<Finished>,
    finished_rx: mpsc::UnboundedReceiver<Finished>,
}

impl SearchSession {
    /// Create a session whose initial query is read from `address`.
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        address: Box<dyn AddressStore>,
        page_size: u32,
        metrics: Arc<Metrics>,
    ) -> Self {
        let query = SearchQueryState::from_address(&address.read());
        let (finished_tx, finished_rx) = mpsc::unbounded_channel();
        Self {
            query,
            coordinator: RequestCoordinator::new(page_size, metrics),
            backend,
            address,
            finished_tx,
            finished_rx,
        }
    }

    pub fn query(&self) -> Arc<QuerySnapshot> {
        self.query.snapshot()
    }

    pub fn coordinator(&self) -> &RequestCoordinator {
        &self.coordinator
    }

    pub fn is_loading(&self) -> bool {
        self.coordinator.state().loading
    }

    /// Current shareable address.
    pub fn address(&self) -> String {
        self.address.read()
    }

    pub fn view(&self) -> ViewModel {
        ViewModel::derive(&self.query.snapshot(), self.coordinator.state())
    }

    /// Issue the request for the initial query.
    pub fn start(&mut self) -> RequestEpoch {
        info!("search session started on {} backend", self.backend.name());
        let snapshot = self.query.snapshot();
        self.address.write(address_for(&snapshot));
        self.issue(&snapshot)
    }

    /// Apply a user event. Returns the epoch of the request it caused, if any.
    pub fn dispatch(&mut self, event: SessionEvent) -> Result<Option<RequestEpoch>, QueryError> {
        debug!("event: {event:?}");
        let Some(snapshot) = self.reduce(event)? else {
            return Ok(None);
        };
        self.address.write(address_for(&snapshot));
        Ok(Some(self.issue(&snapshot)))
    }

    fn reduce(&mut self, event: SessionEvent) -> Result<Option<Arc<QuerySnapshot>>, QueryError> {
        let current = self.query.snapshot();
        let changed = match event {
            SessionEvent::SubmitText(text) => self.query.set_text(&text),
            SessionEvent::GotoPage(page) => self.query.set_page(page)?,
            SessionEvent::NextPage => {
                let state = self.coordinator.state();
                let last = total_pages(state.total, state.page_size);
                if current.page() >= last {
                    None
                } else {
                    self.query.set_page(current.page() + 1)?
                }
            }
            SessionEvent::PrevPage => {
                if current.page() <= 1 {
                    None
                } else {
                    self.query.set_page(current.page() - 1)?
                }
            }
            SessionEvent::ToggleFacet { category, value } => {
                let facets = current.facets().toggle(&category, &value);
                self.query.set_facet_selections(facets)
            }
            SessionEvent::ClearFacets => self.query.set_facet_selections(Default::default()),
            SessionEvent::Navigate(address) => {
                let next = QuerySnapshot::from_query_string(&address);
                if next == *current {
                    None
                } else {
                    self.query = SearchQueryState::new(next);
                    Some(self.query.snapshot())
                }
            }
        };
        Ok(changed)
    }

    fn issue(&mut self, snapshot: &QuerySnapshot) -> RequestEpoch {
        let pending = self.coordinator.on_query_change(snapshot);
        let backend = Arc::clone(&self.backend);
        let finished_tx = self.finished_tx.clone();
        let epoch = pending.epoch;

        tokio::spawn(async move {
            let request = pending.request;
            let search = tokio::spawn(async move { backend.search(request).await });
            // a panicking backend still has to settle its epoch
            let outcome = match search.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("search task {epoch} did not finish: {e}");
                    Err(SearchError::transport(format!("search task failed: {e}")))
                }
            };
            // the session may already be gone
            let _ = finished_tx.send(Finished { epoch, outcome });
        });
        epoch
    }

    /// Wait for the next request to finish and reconcile it.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        let finished = self.finished_rx.recv().await?;
        Some(self.coordinator.complete(finished.epoch, finished.outcome))
    }

    /// Wait until the latest issued request has been applied.
    pub async fn settle(&mut self) {
        while self.is_loading() {
            if self.next_completion().await.is_none() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::MemoryAddress;
    use crate::backend::{MockSearchBackend, SearchRequest};
    use crate::facets::FacetSelections;
    use std::collections::BTreeMap;

    fn result(total: u64) -> SearchResult {
        SearchResult {
            items: vec![],
            total,
            page_size: 10,
            facets: BTreeMap::new(),
        }
    }

    fn session(backend: MockSearchBackend, address: &str) -> SearchSession {
        SearchSession::new(
            Arc::new(backend),
            Box::new(MemoryAddress::new(address)),
            10,
            Arc::new(Metrics::new().unwrap()),
        )
    }

    #[tokio::test]
    async fn facet_toggle_resets_page_and_sends_filter() {
        let mut backend = MockSearchBackend::new();
        backend.expect_name().return_const("mock");
        backend
            .expect_search()
            .withf(|req: &SearchRequest| req.page == 3 && req.facets.is_empty())
            .times(1)
            .returning(|_| Ok(result(45)));
        backend
            .expect_search()
            .withf(|req: &SearchRequest| {
                req.page == 1 && req.facets == FacetSelections::new().toggle("type", "article")
            })
            .times(1)
            .returning(|_| Ok(result(20)));

        let mut session = session(backend, "/search?query=water&page=3");
        session.start();
        session.settle().await;

        let epoch = session
            .dispatch(SessionEvent::ToggleFacet {
                category: "type".to_string(),
                value: "article".to_string(),
            })
            .unwrap();
        assert!(epoch.is_some());
        session.settle().await;

        assert_eq!(session.query().page(), 1);
        assert_eq!(session.address(), "/search?query=water&page=1&type=article");
        assert_eq!(session.coordinator().state().total, 20);
    }

    #[tokio::test]
    async fn no_op_events_issue_nothing() {
        let mut backend = MockSearchBackend::new();
        backend.expect_name().return_const("mock");
        backend
            .expect_search()
            .times(1)
            .returning(|_| Ok(result(5)));

        let mut session = session(backend, "/search?query=water");
        session.start();
        session.settle().await;

        assert_eq!(session.dispatch(SessionEvent::SubmitText(" water ".into())), Ok(None));
        assert_eq!(session.dispatch(SessionEvent::PrevPage), Ok(None));
        // one page of results, so there is no next page
        assert_eq!(session.dispatch(SessionEvent::NextPage), Ok(None));
        assert_eq!(session.dispatch(SessionEvent::ClearFacets), Ok(None));
        assert_eq!(
            session.dispatch(SessionEvent::GotoPage(0)),
            Err(QueryError::InvalidPage(0))
        );
    }

    #[tokio::test]
    async fn failure_is_recovered_into_the_view() {
        let mut backend = MockSearchBackend::new();
        backend.expect_name().return_const("mock");
        backend
            .expect_search()
            .times(1)
            .returning(|_| Err(SearchError::status(500, "Internal Server Error")));
        backend
            .expect_search()
            .times(1)
            .returning(|_| Ok(result(3)));

        let mut session = session(backend, "/search");
        session.start();
        session.settle().await;
        assert_eq!(
            session.view().error,
            Some(SearchError::status(500, "Internal Server Error"))
        );

        session
            .dispatch(SessionEvent::SubmitText("retry".into()))
            .unwrap();
        session.settle().await;
        assert_eq!(session.view().error, None);
        assert_eq!(session.view().total, 3);
    }
}
