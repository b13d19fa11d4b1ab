//! Asynchronous resource lifecycle for the 9volt dashboard.
//!
//! Each tracked backend resource (cluster, events, status) moves through
//! `Idle -> Fetching -> Succeeded | Failed`. Fetches run as cancellable tokio
//! tasks owned by [`RequestCoordinator`]; their outcomes arrive as
//! [`ResourceSignal`]s that the UI folds into a [`DashboardStore`].

pub mod coordinator;
pub mod lifecycle;
pub mod store;
pub mod transport;
pub mod view_model;

pub use coordinator::{fetch_signal, RequestCoordinator, SignalSink};
pub use lifecycle::{Lifecycle, Phase, RequestId, ResourceState};
pub use store::{DashboardStore, ResourceSignal};
pub use transport::{HttpFetcher, HttpFetcherConfig, ResourceFetcher, SetupError};
pub use view_model::{
    format_datetime, format_timestamp, ClusterViewModel, EventRow, EventsViewModel, MemberCard,
    StatusViewModel,
};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
