//! Backend commands queued from UI to backend worker.

use shared::protocol::{ApiResource, ResourceRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    Fetch(ResourceRequest),
    Cancel(ApiResource),
    CancelAll,
    Shutdown,
}

impl BackendCommand {
    pub fn fetch(resource: ApiResource) -> Self {
        Self::Fetch(ResourceRequest::new(resource))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "fetch",
            Self::Cancel(_) => "cancel",
            Self::CancelAll => "cancel_all",
            Self::Shutdown => "shutdown",
        }
    }
}
