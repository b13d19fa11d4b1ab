use crossbeam_channel::{Receiver, Sender};
use dashboard_core::{ClusterViewModel, DashboardStore, EventsViewModel, StatusViewModel};
use eframe::egui;
use shared::protocol::{ApiResource, ResourceRequest};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::{UiError, UiEvent},
        orchestration::dispatch_backend_command,
    },
    ui::{
        navigation::{NavigationShell, Route},
        views::{self, EventFilter, ViewAction},
    },
};

const BANNER_FILL: egui::Color32 = egui::Color32::from_rgb(111, 53, 53);
const BANNER_STROKE: egui::Color32 = egui::Color32::from_rgb(175, 96, 96);

/// Dismissable error shown above the active view.
#[derive(Debug, Clone)]
struct StatusBanner {
    message: String,
}

pub struct DashboardApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    store: DashboardStore,
    nav: NavigationShell,
    event_filter: EventFilter,
    api_url: String,
    status: String,
    status_banner: Option<StatusBanner>,
}

impl DashboardApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        start_route: Route,
        api_url: String,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            store: DashboardStore::new(),
            nav: NavigationShell::new(start_route),
            event_filter: EventFilter::default(),
            api_url,
            status: "Starting".to_string(),
            status_banner: None,
        };
        if let Some(resource) = app.nav.mount_initial() {
            app.fetch(resource);
        }
        app
    }

    fn request_for(&self, resource: ApiResource) -> ResourceRequest {
        match resource {
            ApiResource::Events => self.event_filter.request(),
            other => other.into(),
        }
    }

    fn fetch(&mut self, resource: ApiResource) {
        let request = self.request_for(resource);
        self.send(BackendCommand::Fetch(request));
    }

    fn send(&mut self, cmd: BackendCommand) {
        if let Some(err) = dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            self.show_error(err);
        }
    }

    fn navigate(&mut self, route: Route) {
        if let Some(resource) = self.nav.navigate(route) {
            self.fetch(resource);
        }
    }

    fn apply_view_action(&mut self, action: ViewAction) {
        match action {
            ViewAction::Fetch(request) => self.send(BackendCommand::Fetch(request)),
            ViewAction::Cancel(resource) => self.send(BackendCommand::Cancel(resource)),
            ViewAction::Navigate(route) => self.navigate(route),
        }
    }

    fn show_error(&mut self, err: UiError) {
        tracing::warn!(
            category = err.label(),
            context = ?err.context(),
            "{}",
            err.message()
        );
        self.status = format!("{} error: {}", err.label(), err.message());
        self.status_banner = Some(StatusBanner {
            message: err.message().to_string(),
        });
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::BackendReady { api_url } => {
                    self.status = format!("Connected to {api_url}");
                    self.api_url = api_url;
                }
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Error(err) => self.show_error(err),
                UiEvent::Signal(signal) => self.store.dispatch(signal),
            }
        }
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            egui::Frame::NONE
                .fill(BANNER_FILL)
                .stroke(egui::Stroke::new(1.0, BANNER_STROKE))
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
            ui.add_space(8.0);
        }
    }

    fn show_navigation_panel(&mut self, ctx: &egui::Context) {
        let mut selected = None;
        egui::SidePanel::left("navigation_panel")
            .resizable(false)
            .exact_width(170.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.heading(Route::Home.title());
                ui.separator();
                for route in Route::ALL {
                    let label = format!("{}  {}", route.icon(), route.title());
                    let busy = route
                        .resource()
                        .is_some_and(|resource| self.store.is_fetching(resource));
                    ui.horizontal(|ui| {
                        if ui
                            .selectable_label(self.nav.is_active(route), label)
                            .clicked()
                        {
                            selected = Some(route);
                        }
                        if busy {
                            ui.spinner();
                        }
                    });
                }
            });
        if let Some(route) = selected {
            self.navigate(route);
        }
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&self.status).small());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(egui::RichText::new(&self.api_url).small().monospace());
                        if self.store.any_fetching() {
                            ui.label(egui::RichText::new("fetching").small());
                        }
                    });
                });
            });
    }

    fn show_active_view(&mut self, ctx: &egui::Context) {
        let mut action = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            action = match self.nav.active() {
                Route::Home => views::show_home(ui, &self.store),
                Route::Cluster => {
                    views::show_cluster(ui, &ClusterViewModel::from_state(&self.store.cluster))
                }
                Route::Events => views::show_events(
                    ui,
                    &EventsViewModel::from_state(&self.store.events),
                    &mut self.event_filter,
                ),
                Route::Status => {
                    views::show_status(ui, &StatusViewModel::from_state(&self.store.status))
                }
            };
        });
        if let Some(action) = action {
            self.apply_view_action(action);
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        if self.store.any_fetching() && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.send(BackendCommand::CancelAll);
        }

        self.show_navigation_panel(ctx);
        self.show_status_bar(ctx);
        self.show_active_view(ctx);

        if self.store.any_fetching() {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

impl Drop for DashboardApp {
    fn drop(&mut self) {
        let _ = self.cmd_tx.try_send(BackendCommand::Shutdown);
    }
}
