use chrono::{DateTime, Utc};
use shared::{error::FailureInfo, protocol::ApiResource};

/// Identifies one fetch. Ids grow monotonically per coordinator, so a larger
/// id always belongs to a newer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching,
    Succeeded,
    Failed,
}

/// Lifecycle signal for one resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Lifecycle<T> {
    Begin {
        request_id: RequestId,
    },
    Success {
        request_id: RequestId,
        data: T,
        received_at: DateTime<Utc>,
    },
    Failure {
        request_id: RequestId,
        failure: FailureInfo,
    },
    Cancelled {
        request_id: RequestId,
    },
}

impl<T> Lifecycle<T> {
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::Begin { request_id }
            | Self::Success { request_id, .. }
            | Self::Failure { request_id, .. }
            | Self::Cancelled { request_id } => *request_id,
        }
    }
}

/// Per-resource view state.
///
/// `data` only changes on a successful completion; failures and
/// cancellations keep the last good payload around.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    resource: ApiResource,
    pub is_fetching: bool,
    pub data: Option<T>,
    pub status_text: String,
    pub phase: Phase,
    pub in_flight: Option<RequestId>,
    pub last_failure: Option<FailureInfo>,
    pub last_success_at: Option<DateTime<Utc>>,
}

impl<T> ResourceState<T> {
    pub fn new(resource: ApiResource) -> Self {
        Self {
            resource,
            is_fetching: false,
            data: None,
            status_text: String::new(),
            phase: Phase::Idle,
            in_flight: None,
            last_failure: None,
            last_success_at: None,
        }
    }

    pub fn resource(&self) -> ApiResource {
        self.resource
    }

    /// Folds one signal into the state.
    ///
    /// Completions are only accepted for the outstanding request; anything
    /// else belongs to a superseded fetch and leaves the state untouched.
    pub fn reduce(self, signal: Lifecycle<T>) -> Self {
        let noun = self.resource.noun();
        match signal {
            Lifecycle::Begin { request_id } => {
                if self.in_flight.is_some_and(|current| request_id < current) {
                    return self;
                }
                Self {
                    is_fetching: true,
                    phase: Phase::Fetching,
                    in_flight: Some(request_id),
                    status_text: format!("Retrieving {}.", noun.to_ascii_lowercase()),
                    ..self
                }
            }
            Lifecycle::Success {
                request_id,
                data,
                received_at,
            } => {
                if !self.is_outstanding(request_id) {
                    return self;
                }
                Self {
                    is_fetching: false,
                    phase: Phase::Succeeded,
                    in_flight: None,
                    data: Some(data),
                    status_text: format!("{noun} retrieved."),
                    last_failure: None,
                    last_success_at: Some(received_at),
                    ..self
                }
            }
            Lifecycle::Failure {
                request_id,
                failure,
            } => {
                if !self.is_outstanding(request_id) {
                    return self;
                }
                Self {
                    is_fetching: false,
                    phase: Phase::Failed,
                    in_flight: None,
                    status_text: format!("{noun} Error: {failure}"),
                    last_failure: Some(failure),
                    ..self
                }
            }
            Lifecycle::Cancelled { request_id } => {
                if !self.is_outstanding(request_id) {
                    return self;
                }
                let phase = if self.last_failure.is_some() {
                    Phase::Failed
                } else if self.data.is_some() {
                    Phase::Succeeded
                } else {
                    Phase::Idle
                };
                Self {
                    is_fetching: false,
                    phase,
                    in_flight: None,
                    status_text: format!("{noun} request cancelled."),
                    ..self
                }
            }
        }
    }

    fn is_outstanding(&self, request_id: RequestId) -> bool {
        self.in_flight == Some(request_id)
    }
}
