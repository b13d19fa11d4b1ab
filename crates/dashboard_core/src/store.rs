use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use shared::{
    domain::{ClusterStats, EventLog, StatusReport},
    error::{FailureInfo, FetchError},
    protocol::ApiResource,
};

use crate::lifecycle::{Lifecycle, Phase, RequestId, ResourceState};

/// A lifecycle signal tagged with the resource it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceSignal {
    Cluster(Lifecycle<ClusterStats>),
    Events(Lifecycle<EventLog>),
    Status(Lifecycle<StatusReport>),
}

impl ResourceSignal {
    pub fn begin(resource: ApiResource, request_id: RequestId) -> Self {
        match resource {
            ApiResource::Cluster => Self::Cluster(Lifecycle::Begin { request_id }),
            ApiResource::Events => Self::Events(Lifecycle::Begin { request_id }),
            ApiResource::Status => Self::Status(Lifecycle::Begin { request_id }),
        }
    }

    pub fn failure(resource: ApiResource, request_id: RequestId, failure: FailureInfo) -> Self {
        match resource {
            ApiResource::Cluster => Self::Cluster(Lifecycle::Failure {
                request_id,
                failure,
            }),
            ApiResource::Events => Self::Events(Lifecycle::Failure {
                request_id,
                failure,
            }),
            ApiResource::Status => Self::Status(Lifecycle::Failure {
                request_id,
                failure,
            }),
        }
    }

    pub fn cancelled(resource: ApiResource, request_id: RequestId) -> Self {
        match resource {
            ApiResource::Cluster => Self::Cluster(Lifecycle::Cancelled { request_id }),
            ApiResource::Events => Self::Events(Lifecycle::Cancelled { request_id }),
            ApiResource::Status => Self::Status(Lifecycle::Cancelled { request_id }),
        }
    }

    /// Turns the raw outcome of a GET into the matching completion signal.
    ///
    /// A body that does not decode into the resource's payload type is
    /// reported as a failure without a response (status 500).
    pub fn completed(
        resource: ApiResource,
        request_id: RequestId,
        outcome: Result<serde_json::Value, FetchError>,
        received_at: DateTime<Utc>,
    ) -> Self {
        let body = match outcome {
            Ok(body) => body,
            Err(FetchError::Cancelled) => return Self::cancelled(resource, request_id),
            Err(err) => return Self::failure(resource, request_id, err.to_failure()),
        };

        match resource {
            ApiResource::Cluster => match decode::<ClusterStats>(body) {
                Ok(data) => Self::Cluster(Lifecycle::Success {
                    request_id,
                    data,
                    received_at,
                }),
                Err(err) => Self::failure(resource, request_id, err.to_failure()),
            },
            ApiResource::Events => match decode::<EventLog>(body) {
                Ok(data) => Self::Events(Lifecycle::Success {
                    request_id,
                    data,
                    received_at,
                }),
                Err(err) => Self::failure(resource, request_id, err.to_failure()),
            },
            ApiResource::Status => Self::Status(Lifecycle::Success {
                request_id,
                data: body,
                received_at,
            }),
        }
    }

    pub fn resource(&self) -> ApiResource {
        match self {
            Self::Cluster(_) => ApiResource::Cluster,
            Self::Events(_) => ApiResource::Events,
            Self::Status(_) => ApiResource::Status,
        }
    }

    pub fn request_id(&self) -> RequestId {
        match self {
            Self::Cluster(signal) => signal.request_id(),
            Self::Events(signal) => signal.request_id(),
            Self::Status(signal) => signal.request_id(),
        }
    }

    pub fn kind(&self) -> &'static str {
        fn kind_of<T>(signal: &Lifecycle<T>) -> &'static str {
            match signal {
                Lifecycle::Begin { .. } => "begin",
                Lifecycle::Success { .. } => "success",
                Lifecycle::Failure { .. } => "failure",
                Lifecycle::Cancelled { .. } => "cancelled",
            }
        }
        match self {
            Self::Cluster(signal) => kind_of(signal),
            Self::Events(signal) => kind_of(signal),
            Self::Status(signal) => kind_of(signal),
        }
    }
}

fn decode<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, FetchError> {
    serde_json::from_value(body).map_err(|err| FetchError::decode(err.to_string()))
}

/// Application state container, owned by whoever drives the UI and passed
/// down explicitly.
#[derive(Debug, Clone)]
pub struct DashboardStore {
    pub cluster: ResourceState<ClusterStats>,
    pub events: ResourceState<EventLog>,
    pub status: ResourceState<StatusReport>,
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardStore {
    pub fn new() -> Self {
        Self {
            cluster: ResourceState::new(ApiResource::Cluster),
            events: ResourceState::new(ApiResource::Events),
            status: ResourceState::new(ApiResource::Status),
        }
    }

    pub fn dispatch(&mut self, signal: ResourceSignal) {
        match signal {
            ResourceSignal::Cluster(signal) => fold(&mut self.cluster, signal),
            ResourceSignal::Events(signal) => fold(&mut self.events, signal),
            ResourceSignal::Status(signal) => fold(&mut self.status, signal),
        }
    }

    pub fn is_fetching(&self, resource: ApiResource) -> bool {
        match resource {
            ApiResource::Cluster => self.cluster.is_fetching,
            ApiResource::Events => self.events.is_fetching,
            ApiResource::Status => self.status.is_fetching,
        }
    }

    pub fn any_fetching(&self) -> bool {
        ApiResource::ALL
            .into_iter()
            .any(|resource| self.is_fetching(resource))
    }

    pub fn status_text(&self, resource: ApiResource) -> &str {
        match resource {
            ApiResource::Cluster => &self.cluster.status_text,
            ApiResource::Events => &self.events.status_text,
            ApiResource::Status => &self.status.status_text,
        }
    }

    pub fn phase(&self, resource: ApiResource) -> Phase {
        match resource {
            ApiResource::Cluster => self.cluster.phase,
            ApiResource::Events => self.events.phase,
            ApiResource::Status => self.status.phase,
        }
    }
}

fn fold<T>(slot: &mut ResourceState<T>, signal: Lifecycle<T>) {
    let resource = slot.resource();
    let current = std::mem::replace(slot, ResourceState::new(resource));
    *slot = current.reduce(signal);
}
