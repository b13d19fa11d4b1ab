//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread, time::Duration};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use dashboard_core::{
    HttpFetcher, HttpFetcherConfig, RequestCoordinator, ResourceSignal, SignalSink,
};

use crate::{
    backend_bridge::commands::BackendCommand,
    config::Settings,
    controller::events::{UiError, UiErrorContext, UiEvent},
};

/// Forwards lifecycle signals into the UI event queue.
///
/// Signals are never dropped: a lost completion would leave its resource
/// fetching forever. When the queue is full the sender waits for the UI's
/// next drain, which only ever uses `try_recv`, so this cannot deadlock.
pub struct UiSignalSink {
    ui_tx: Sender<UiEvent>,
}

impl UiSignalSink {
    pub fn new(ui_tx: Sender<UiEvent>) -> Self {
        Self { ui_tx }
    }
}

impl SignalSink for UiSignalSink {
    fn emit(&self, signal: ResourceSignal) {
        let resource = signal.resource();
        let kind = signal.kind();
        let signal = match self.ui_tx.try_send(UiEvent::Signal(signal)) {
            Ok(()) => return,
            Err(TrySendError::Full(signal)) => signal,
            Err(TrySendError::Disconnected(_)) => {
                tracing::debug!(%resource, kind, "ui event queue closed");
                return;
            }
        };
        tracing::warn!(%resource, kind, "ui event queue full; waiting for the ui to drain");
        if self.ui_tx.send(signal).is_err() {
            tracing::debug!(%resource, kind, "ui event queue closed");
        }
    }
}

pub fn launch(settings: Settings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let fetcher = match HttpFetcher::new(HttpFetcherConfig {
            base_url: settings.api_url.clone(),
            access_token: settings.access_token.clone(),
            timeout: settings.request_timeout(),
        }) {
            Ok(fetcher) => fetcher,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    err.to_string(),
                )));
                tracing::error!("failed to build api client: {err}");
                return;
            }
        };
        let api_url = fetcher.base_url().to_string();
        tracing::info!(%api_url, token = settings.access_token.is_some(), "backend worker ready");
        let _ = ui_tx.try_send(UiEvent::BackendReady { api_url });

        let coordinator = RequestCoordinator::new(
            Arc::new(fetcher),
            UiSignalSink::new(ui_tx),
            runtime.handle().clone(),
        );
        run_command_loop(&cmd_rx, coordinator);
        runtime.shutdown_timeout(Duration::from_secs(1));
        tracing::info!("backend worker stopped");
    });
}

/// Applies UI commands until shutdown or until the UI side hangs up.
pub fn run_command_loop<S: SignalSink>(
    cmd_rx: &Receiver<BackendCommand>,
    mut coordinator: RequestCoordinator<S>,
) {
    while let Ok(cmd) = cmd_rx.recv() {
        tracing::debug!(command = cmd.name(), "backend received command");
        match cmd {
            BackendCommand::Fetch(request) => {
                coordinator.request_with(request);
            }
            BackendCommand::Cancel(resource) => {
                coordinator.cancel(resource);
            }
            BackendCommand::CancelAll => coordinator.cancel_all(),
            BackendCommand::Shutdown => break,
        }
    }
    coordinator.cancel_all();
}
