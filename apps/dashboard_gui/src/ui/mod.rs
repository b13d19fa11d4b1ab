//! UI layer for the dashboard: app shell, navigation and route views.

pub mod app;
pub mod navigation;
pub mod views;

pub use app::DashboardApp;
