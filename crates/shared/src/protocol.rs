use serde::{Deserialize, Serialize};

pub const CLUSTER_PATH: &str = "/api/v1/cluster";
pub const EVENT_PATH: &str = "/api/v1/event";
pub const STATUS_PATH: &str = "/status/check";

/// Header checked by the backend on every `/api` route when access tokens are configured.
pub const ACCESS_TOKEN_HEADER: &str = "X-Access-Token";

/// Query parameter accepted by the event endpoint (comma separated event types).
pub const EVENT_TYPE_QUERY: &str = "type";

/// The backend resources the dashboard tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiResource {
    Cluster,
    Events,
    Status,
}

impl ApiResource {
    pub const ALL: [ApiResource; 3] = [Self::Cluster, Self::Events, Self::Status];

    pub fn path(self) -> &'static str {
        match self {
            Self::Cluster => CLUSTER_PATH,
            Self::Events => EVENT_PATH,
            Self::Status => STATUS_PATH,
        }
    }

    /// Whether the backend guards this endpoint with the access token middleware.
    pub fn requires_access_token(self) -> bool {
        self.path().starts_with("/api/")
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Cluster => "cluster",
            Self::Events => "events",
            Self::Status => "status",
        }
    }

    /// Plural noun used in status messages ("Clusters retrieved.").
    pub fn noun(self) -> &'static str {
        match self {
            Self::Cluster => "Clusters",
            Self::Events => "Events",
            Self::Status => "Status",
        }
    }
}

impl std::fmt::Display for ApiResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A GET against one resource, with optional query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub resource: ApiResource,
    pub query: Vec<(String, String)>,
}

impl ResourceRequest {
    pub fn new(resource: ApiResource) -> Self {
        Self {
            resource,
            query: Vec::new(),
        }
    }

    /// Event listing restricted to the given types; an empty list fetches everything.
    pub fn events_of_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = types
            .into_iter()
            .map(|kind| kind.as_ref().trim().to_string())
            .filter(|kind| !kind.is_empty())
            .collect::<Vec<_>>()
            .join(",");

        let mut request = Self::new(ApiResource::Events);
        if !joined.is_empty() {
            request.query.push((EVENT_TYPE_QUERY.to_string(), joined));
        }
        request
    }
}

impl From<ApiResource> for ResourceRequest {
    fn from(value: ApiResource) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_api_routes_need_the_access_token() {
        assert!(ApiResource::Cluster.requires_access_token());
        assert!(ApiResource::Events.requires_access_token());
        assert!(!ApiResource::Status.requires_access_token());
    }

    #[test]
    fn event_type_filter_joins_non_empty_types() {
        let request = ResourceRequest::events_of_types([" monitor", "", "alerter "]);
        assert_eq!(
            request.query,
            vec![("type".to_string(), "monitor,alerter".to_string())]
        );

        let unfiltered = ResourceRequest::events_of_types(Vec::<String>::new());
        assert!(unfiltered.query.is_empty());
        assert_eq!(unfiltered.resource, ApiResource::Events);
    }
}
