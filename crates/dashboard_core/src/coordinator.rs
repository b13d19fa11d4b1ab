//! Fetch-and-dispatch: one cancellable tokio task per resource request.

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use shared::protocol::{ApiResource, ResourceRequest};
use tokio::{runtime::Handle, sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    lifecycle::{Lifecycle, RequestId},
    store::ResourceSignal,
    transport::ResourceFetcher,
};

/// Receiver of lifecycle signals. Called from the coordinator's caller for
/// `Begin`/`Cancelled` and from runtime worker threads for completions.
pub trait SignalSink: Send + Sync + 'static {
    fn emit(&self, signal: ResourceSignal);
}

impl SignalSink for mpsc::UnboundedSender<ResourceSignal> {
    fn emit(&self, signal: ResourceSignal) {
        if self.send(signal).is_err() {
            warn!("lifecycle signal receiver dropped");
        }
    }
}

/// Runs one GET and converts its outcome into a completion signal.
pub async fn fetch_signal(
    fetcher: &dyn ResourceFetcher,
    request: &ResourceRequest,
    request_id: RequestId,
) -> ResourceSignal {
    let outcome = fetcher.get_json(request).await;
    ResourceSignal::completed(request.resource, request_id, outcome, Utc::now())
}

struct InFlight {
    request_id: RequestId,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl InFlight {
    fn is_live(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Issues resource fetches and reports their lifecycle through a [`SignalSink`].
///
/// At most one request per resource is live: starting a new one cancels the
/// previous task, which then never reports a completion.
pub struct RequestCoordinator<S: SignalSink> {
    fetcher: Arc<dyn ResourceFetcher>,
    sink: Arc<S>,
    runtime: Handle,
    next_request_id: u64,
    in_flight: HashMap<ApiResource, InFlight>,
}

impl<S: SignalSink> RequestCoordinator<S> {
    pub fn new(fetcher: Arc<dyn ResourceFetcher>, sink: S, runtime: Handle) -> Self {
        Self {
            fetcher,
            sink: Arc::new(sink),
            runtime,
            next_request_id: 0,
            in_flight: HashMap::new(),
        }
    }

    pub fn request(&mut self, resource: ApiResource) -> RequestId {
        self.request_with(ResourceRequest::new(resource))
    }

    /// Emits `Begin` before the fetch task is spawned, so the caller observes
    /// the fetching state ahead of any network activity.
    pub fn request_with(&mut self, request: ResourceRequest) -> RequestId {
        let resource = request.resource;
        if let Some(previous) = self.in_flight.remove(&resource) {
            if previous.is_live() {
                debug!(
                    %resource,
                    superseded = %previous.request_id,
                    "cancelling superseded request"
                );
            }
            previous.token.cancel();
        }

        self.next_request_id += 1;
        let request_id = RequestId(self.next_request_id);
        debug!(%resource, %request_id, query = ?request.query, "starting resource request");
        self.sink.emit(ResourceSignal::begin(resource, request_id));

        let token = CancellationToken::new();
        let task_token = token.clone();
        let fetcher = Arc::clone(&self.fetcher);
        let sink = Arc::clone(&self.sink);
        let task = self.runtime.spawn(async move {
            let signal = tokio::select! {
                biased;
                _ = task_token.cancelled() => {
                    debug!(%resource, %request_id, "resource request cancelled");
                    return;
                }
                signal = fetch_signal(fetcher.as_ref(), &request, request_id) => signal,
            };
            log_completion(&signal);
            sink.emit(signal);
        });

        self.in_flight.insert(
            resource,
            InFlight {
                request_id,
                token,
                task,
            },
        );
        request_id
    }

    /// Cancels the live request for `resource`, if any, and reports it.
    pub fn cancel(&mut self, resource: ApiResource) -> Option<RequestId> {
        let in_flight = self.in_flight.remove(&resource)?;
        if !in_flight.is_live() {
            return None;
        }
        in_flight.token.cancel();
        self.sink
            .emit(ResourceSignal::cancelled(resource, in_flight.request_id));
        Some(in_flight.request_id)
    }

    pub fn cancel_all(&mut self) {
        for resource in ApiResource::ALL {
            self.cancel(resource);
        }
    }

    pub fn is_in_flight(&self, resource: ApiResource) -> bool {
        self.in_flight
            .get(&resource)
            .is_some_and(|in_flight| in_flight.is_live())
    }
}

impl<S: SignalSink> Drop for RequestCoordinator<S> {
    fn drop(&mut self) {
        for (_, in_flight) in self.in_flight.drain() {
            in_flight.token.cancel();
        }
    }
}

fn log_completion(signal: &ResourceSignal) {
    let resource = signal.resource();
    let request_id = signal.request_id();
    match signal {
        ResourceSignal::Cluster(Lifecycle::Failure { failure, .. })
        | ResourceSignal::Events(Lifecycle::Failure { failure, .. })
        | ResourceSignal::Status(Lifecycle::Failure { failure, .. }) => {
            warn!(
                %resource,
                %request_id,
                status = failure.status,
                "resource request failed: {}",
                failure.status_text
            );
        }
        _ => info!(%resource, %request_id, outcome = signal.kind(), "resource request completed"),
    }
}
