//! Route table and the navigation shell that decides when a view mounts.

use std::str::FromStr;

use shared::protocol::ApiResource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Status,
    Cluster,
    Events,
}

impl Route {
    pub const ALL: [Route; 4] = [Self::Home, Self::Status, Self::Cluster, Self::Events];

    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/ui",
            Self::Status => "/ui/Status",
            Self::Cluster => "/ui/Cluster",
            Self::Events => "/ui/Events",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Home => "9-Volt",
            Self::Status => "Status",
            Self::Cluster => "Cluster",
            Self::Events => "Events",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Home => "⌂",
            Self::Status => "📊",
            Self::Cluster => "▦",
            Self::Events => "⚠",
        }
    }

    /// The resource a route's view fetches when it mounts.
    pub fn resource(self) -> Option<ApiResource> {
        match self {
            Self::Home => None,
            Self::Status => Some(ApiResource::Status),
            Self::Cluster => Some(ApiResource::Cluster),
            Self::Events => Some(ApiResource::Events),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown route '{0}' (expected one of /ui, /ui/Status, /ui/Cluster, /ui/Events)")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    /// Accepts a route path or title, ignoring case.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().trim_end_matches('/');
        Self::ALL
            .into_iter()
            .find(|route| {
                route.path().eq_ignore_ascii_case(wanted)
                    || route.title().eq_ignore_ascii_case(wanted)
                    || format!("{route:?}").eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownRoute(value.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct NavigationShell {
    active: Route,
    mounted: bool,
}

impl NavigationShell {
    pub fn new(start: Route) -> Self {
        Self {
            active: start,
            mounted: false,
        }
    }

    pub fn active(&self) -> Route {
        self.active
    }

    pub fn is_active(&self, route: Route) -> bool {
        self.active == route
    }

    /// Mounts the start route once; returns the resource to fetch on that
    /// first display.
    pub fn mount_initial(&mut self) -> Option<ApiResource> {
        if self.mounted {
            return None;
        }
        self.mounted = true;
        self.active.resource()
    }

    /// Switches to `route`. Selecting the already mounted route is a no-op.
    pub fn navigate(&mut self, route: Route) -> Option<ApiResource> {
        if self.mounted && self.active == route {
            return None;
        }
        tracing::debug!(from = self.active.path(), to = route.path(), "navigating");
        self.active = route;
        self.mounted = true;
        route.resource()
    }
}
