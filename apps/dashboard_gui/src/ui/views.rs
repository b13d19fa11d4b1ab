//! Route views. Each one renders a view model and reports what the user asked for.

use dashboard_core::{
    ClusterViewModel, DashboardStore, EventsViewModel, MemberCard, StatusViewModel,
};
use eframe::egui;
use shared::protocol::{ApiResource, ResourceRequest};

use crate::ui::navigation::Route;

const DIRECTOR_ACCENT: egui::Color32 = egui::Color32::from_rgb(88, 101, 242);
const CARD_FILL: egui::Color32 = egui::Color32::from_rgb(43, 45, 49);
const CARD_STROKE: egui::Color32 = egui::Color32::from_rgb(63, 65, 71);
const MUTED_TEXT: egui::Color32 = egui::Color32::from_rgb(148, 155, 164);
const ERROR_TEXT: egui::Color32 = egui::Color32::from_rgb(237, 66, 69);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    Fetch(ResourceRequest),
    Cancel(ApiResource),
    Navigate(Route),
}

/// Text typed into the events filter box; comma separated event types.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub input: String,
    pub applied: String,
}

impl EventFilter {
    pub fn request(&self) -> ResourceRequest {
        ResourceRequest::events_of_types(self.applied.split(','))
    }

    pub fn apply(&mut self) -> ResourceRequest {
        self.applied = self.input.trim().to_string();
        self.request()
    }

    pub fn clear(&mut self) -> ResourceRequest {
        self.input.clear();
        self.applied.clear();
        self.request()
    }

    pub fn is_active(&self) -> bool {
        !self.applied.is_empty()
    }
}

fn is_error_text(status_text: &str) -> bool {
    status_text.contains("Error:")
}

/// Spinner, status text, refresh time and the refresh/cancel buttons shared by
/// every resource view.
fn resource_header(
    ui: &mut egui::Ui,
    title: &str,
    status_text: &str,
    is_fetching: bool,
    last_refreshed: Option<&str>,
    refresh: ResourceRequest,
) -> Option<ViewAction> {
    let mut action = None;
    let resource = refresh.resource;
    ui.horizontal(|ui| {
        ui.heading(title);
        if is_fetching {
            ui.spinner();
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Refresh").clicked() {
                action = Some(ViewAction::Fetch(refresh));
            }
            if ui
                .add_enabled(is_fetching, egui::Button::new("Cancel"))
                .clicked()
            {
                action = Some(ViewAction::Cancel(resource));
            }
        });
    });

    let status_color = if is_error_text(status_text) {
        ERROR_TEXT
    } else {
        MUTED_TEXT
    };
    ui.label(egui::RichText::new(status_text).color(status_color));
    if let Some(at) = last_refreshed {
        ui.label(
            egui::RichText::new(format!("Last refreshed {at}"))
                .small()
                .color(MUTED_TEXT),
        );
    }
    ui.separator();
    action
}

fn card_frame(highlight: bool) -> egui::Frame {
    let stroke = if highlight {
        egui::Stroke::new(2.0, DIRECTOR_ACCENT)
    } else {
        egui::Stroke::new(1.0, CARD_STROKE)
    };
    egui::Frame::NONE
        .fill(CARD_FILL)
        .stroke(stroke)
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 8))
}

pub fn show_home(ui: &mut egui::Ui, store: &DashboardStore) -> Option<ViewAction> {
    let mut action = None;
    ui.heading(Route::Home.title());
    ui.label("Monitoring dashboard for a 9volt cluster.");
    ui.add_space(12.0);

    egui::Grid::new("home_overview")
        .num_columns(3)
        .spacing([16.0, 8.0])
        .show(ui, |ui| {
            for route in [Route::Status, Route::Cluster, Route::Events] {
                let Some(resource) = route.resource() else {
                    continue;
                };
                if ui.link(route.title()).clicked() {
                    action = Some(ViewAction::Navigate(route));
                }
                if store.is_fetching(resource) {
                    ui.spinner();
                } else {
                    ui.label("");
                }
                let text = store.status_text(resource);
                let text = if text.is_empty() { "Not loaded yet." } else { text };
                ui.label(egui::RichText::new(text).color(MUTED_TEXT));
                ui.end_row();
            }
        });
    action
}

pub fn show_cluster(ui: &mut egui::Ui, view: &ClusterViewModel) -> Option<ViewAction> {
    let action = resource_header(
        ui,
        Route::Cluster.title(),
        &view.status_text,
        view.is_fetching,
        view.last_refreshed.as_deref(),
        ApiResource::Cluster.into(),
    );

    match (&view.director, view.director_card()) {
        (Some(_), Some(card)) => {
            ui.label(egui::RichText::new("Director").strong());
            member_card(ui, card);
            ui.add_space(8.0);
        }
        (Some(director), None) => {
            ui.label(
                egui::RichText::new(format!("Director {director} is not a listed member"))
                    .color(MUTED_TEXT),
            );
        }
        (None, _) if !view.members.is_empty() => {
            ui.label(egui::RichText::new("No director elected").color(MUTED_TEXT));
        }
        (None, _) => {}
    }

    if view.members.is_empty() {
        if !view.is_fetching {
            ui.label(egui::RichText::new("No cluster members to show.").color(MUTED_TEXT));
        }
        return action;
    }

    ui.label(egui::RichText::new(format!("Members ({})", view.members.len())).strong());
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                for card in &view.members {
                    member_card(ui, card);
                }
            });
        });
    action
}

fn member_card(ui: &mut egui::Ui, card: &MemberCard) {
    card_frame(card.is_director).show(ui, |ui| {
        ui.set_width(280.0);
        ui.vertical(|ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&card.hostname).strong());
                if card.is_director {
                    ui.label(egui::RichText::new("director").color(DIRECTOR_ACCENT));
                }
            });
            ui.label(egui::RichText::new(&card.member_id).monospace().small());
            ui.label(format!("Listening on {}", card.listen_address));
            ui.label(
                egui::RichText::new(format!("Last updated {}", card.last_updated))
                    .small()
                    .color(MUTED_TEXT),
            );
            if let Some(version) = &card.version {
                ui.label(egui::RichText::new(format!("Version {version}")).small());
            }
            if !card.tags.is_empty() {
                ui.label(
                    egui::RichText::new(format!("Tags: {}", card.tags.join(", ")))
                        .small()
                        .color(MUTED_TEXT),
                );
            }
        });
    });
}

pub fn show_events(
    ui: &mut egui::Ui,
    view: &EventsViewModel,
    filter: &mut EventFilter,
) -> Option<ViewAction> {
    let mut action = resource_header(
        ui,
        Route::Events.title(),
        &view.status_text,
        view.is_fetching,
        view.last_refreshed.as_deref(),
        filter.request(),
    );

    ui.horizontal(|ui| {
        ui.label("Types");
        let response = ui.add(
            egui::TextEdit::singleline(&mut filter.input)
                .hint_text("monitor,alerter")
                .desired_width(220.0),
        );
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Apply").clicked() || submitted {
            action = Some(ViewAction::Fetch(filter.apply()));
        }
        if ui
            .add_enabled(filter.is_active(), egui::Button::new("Clear"))
            .clicked()
        {
            action = Some(ViewAction::Fetch(filter.clear()));
        }
    });
    ui.add_space(6.0);

    if view.rows.is_empty() {
        if !view.is_fetching {
            ui.label(egui::RichText::new("No events to show.").color(MUTED_TEXT));
        }
        return action;
    }

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            egui::Grid::new("events_grid")
                .num_columns(5)
                .striped(true)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    for column in ["Key", "Time", "Type", "Member", "Message"] {
                        ui.label(egui::RichText::new(column).strong());
                    }
                    ui.end_row();

                    for row in &view.rows {
                        ui.label(egui::RichText::new(&row.key).strong());
                        ui.label(egui::RichText::new(&row.timestamp).small());
                        ui.label(&row.kind);
                        ui.label(egui::RichText::new(&row.member_id).monospace().small());
                        ui.label(&row.message);
                        ui.end_row();
                    }
                });
        });
    action
}

pub fn show_status(ui: &mut egui::Ui, view: &StatusViewModel) -> Option<ViewAction> {
    let action = resource_header(
        ui,
        Route::Status.title(),
        &view.status_text,
        view.is_fetching,
        view.last_refreshed.as_deref(),
        ApiResource::Status.into(),
    );

    match &view.pretty_json {
        Some(pretty) => {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut pretty.as_str())
                            .font(egui::TextStyle::Monospace)
                            .desired_width(f32::INFINITY),
                    );
                });
        }
        None if !view.is_fetching => {
            ui.label(egui::RichText::new("No status report to show.").color(MUTED_TEXT));
        }
        None => {}
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::{EventRow, MemberCard};

    /// Runs `render` in a headless frame and returns every painted text.
    fn rendered_texts(mut render: impl FnMut(&mut egui::Ui)) -> Vec<String> {
        fn collect(shape: &egui::Shape, out: &mut Vec<String>) {
            match shape {
                egui::Shape::Text(text) => out.push(text.galley.text().to_string()),
                egui::Shape::Vec(shapes) => shapes.iter().for_each(|shape| collect(shape, out)),
                _ => {}
            }
        }

        let ctx = egui::Context::default();
        let mut output = None;
        // Grids and scroll areas size themselves on the first frame.
        for _ in 0..3 {
            output = Some(ctx.run(egui::RawInput::default(), |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| render(ui));
            }));
        }
        let mut texts = Vec::new();
        for clipped in output.expect("frame output").shapes {
            collect(&clipped.shape, &mut texts);
        }
        texts
    }

    #[test]
    fn views_render_without_fetched_data() {
        let store = DashboardStore::new();

        let texts = rendered_texts(|ui| {
            show_home(ui, &store);
        });
        assert!(texts.iter().any(|t| t == "Not loaded yet."));

        let texts = rendered_texts(|ui| {
            show_cluster(ui, &ClusterViewModel::from_state(&store.cluster));
        });
        assert!(texts.iter().any(|t| t == "No cluster members to show."));

        let mut filter = EventFilter::default();
        let texts = rendered_texts(|ui| {
            show_events(ui, &EventsViewModel::from_state(&store.events), &mut filter);
        });
        assert!(texts.iter().any(|t| t == "No events to show."));

        let texts = rendered_texts(|ui| {
            show_status(ui, &StatusViewModel::from_state(&store.status));
        });
        assert!(texts.iter().any(|t| t == "No status report to show."));
    }

    #[test]
    fn event_rows_show_their_key() {
        let view = EventsViewModel {
            status_text: "Events retrieved.".into(),
            is_fetching: false,
            rows: vec![
                EventRow {
                    key: "evt-2".into(),
                    message: "disk full".into(),
                    kind: "alerter".into(),
                    member_id: "m1".into(),
                    timestamp: "Wednesday, January 1st, 2020, 12:00:00.000 AM UTC".into(),
                },
                EventRow {
                    key: "evt-1".into(),
                    message: "member joined".into(),
                    kind: "cluster".into(),
                    member_id: "m2".into(),
                    timestamp: "unknown".into(),
                },
            ],
            last_refreshed: None,
        };
        let mut filter = EventFilter::default();
        let texts = rendered_texts(|ui| {
            show_events(ui, &view, &mut filter);
        });

        assert!(texts.iter().any(|t| t == "Key"));
        for row in &view.rows {
            assert!(texts.contains(&row.key), "missing key {}", row.key);
            assert!(texts.contains(&row.message));
        }
    }

    #[test]
    fn director_card_is_rendered_with_its_marker() {
        let card = MemberCard {
            member_id: "m1".into(),
            hostname: "h1".into(),
            listen_address: "1.2.3.4:80".into(),
            last_updated: "unknown".into(),
            tags: vec![],
            version: None,
            is_director: true,
        };
        let view = ClusterViewModel {
            status_text: "Clusters retrieved.".into(),
            is_fetching: false,
            members: vec![card],
            director: Some("m1".into()),
            last_refreshed: None,
        };
        let texts = rendered_texts(|ui| {
            show_cluster(ui, &view);
        });
        assert!(texts.iter().any(|t| t == "Director"));
        assert!(texts.iter().any(|t| t == "director"));
        assert!(texts.iter().any(|t| t == "h1"));
    }

    #[test]
    fn event_filter_applies_trimmed_types() {
        let mut filter = EventFilter {
            input: "  monitor, alerter ".into(),
            ..EventFilter::default()
        };
        assert_eq!(filter.request(), ResourceRequest::new(ApiResource::Events));

        let request = filter.apply();
        assert!(filter.is_active());
        assert_eq!(
            request.query,
            vec![("type".to_string(), "monitor,alerter".to_string())]
        );
        // Refresh keeps the applied filter even while the box is edited.
        filter.input = "other".into();
        assert_eq!(filter.request(), request);
    }

    #[test]
    fn clearing_filter_fetches_everything() {
        let mut filter = EventFilter {
            input: "monitor".into(),
            ..EventFilter::default()
        };
        filter.apply();
        assert_eq!(filter.clear(), ResourceRequest::new(ApiResource::Events));
        assert!(!filter.is_active());
        assert!(filter.input.is_empty());
    }

    #[test]
    fn error_texts_are_highlighted() {
        assert!(is_error_text("Events Error: 404 Not Found"));
        assert!(!is_error_text("Events retrieved."));
    }
}
