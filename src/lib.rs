pub mod address;
pub mod app;
pub mod backend;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod facets;
pub mod interactive;
pub mod metrics;
pub mod pagination;
pub mod query;
pub mod session;
pub mod view;

pub use crate::error::{CatalogError, Result, SearchError};
pub use address::{AddressStore, MemoryAddress};
pub use app::CatalogApp;
pub use backend::{
    HttpBackend, MemoryBackend, ResourceSummary, SearchBackend, SearchRequest, SearchResult,
};
pub use cli::{Cli, Commands};
pub use coordinator::{Completion, RequestCoordinator, RequestEpoch, ResultState};
pub use facets::{FacetCategory, FacetOption, FacetSelections};
pub use pagination::{project, PageControl, PaginationView};
pub use query::{QuerySnapshot, SearchQueryState};
pub use session::{SearchSession, SessionEvent};
pub use view::{render, ViewModel};
