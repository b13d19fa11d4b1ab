use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(MemberId);

/// Parses a backend timestamp (RFC 3339, as emitted by Go's `time.Time`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw.trim()).ok()
}

/// Membership status record published by each cluster member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberStatus {
    #[serde(rename = "MemberID")]
    pub member_id: MemberId,
    #[serde(rename = "Hostname", default)]
    pub hostname: String,
    #[serde(rename = "ListenAddress", default)]
    pub listen_address: String,
    #[serde(rename = "LastUpdated", default)]
    pub last_updated: String,
    #[serde(rename = "Tags", default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(rename = "Version", default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "SemVer", default, skip_serializing_if = "Option::is_none")]
    pub sem_ver: Option<String>,
}

impl MemberStatus {
    pub fn last_updated_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.last_updated)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorStatus {
    #[serde(rename = "MemberID")]
    pub member_id: MemberId,
    #[serde(rename = "LastUpdate", default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
}

/// Payload of `GET /api/v1/cluster`.
///
/// `Director` is `null` while no member holds the director lock, and older
/// backends omit `Members` entirely on an empty cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterStats {
    #[serde(rename = "Members", default, deserialize_with = "null_as_default")]
    pub members: BTreeMap<String, MemberStatus>,
    #[serde(rename = "Director", default)]
    pub director: Option<DirectorStatus>,
}

impl ClusterStats {
    pub fn director_id(&self) -> Option<&MemberId> {
        self.director.as_ref().map(|director| &director.member_id)
    }

    pub fn is_director(&self, member_id: &MemberId) -> bool {
        self.director_id() == Some(member_id)
    }
}

/// A single entry of the cluster event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(rename = "memberid", default)]
    pub member_id: String,
}

impl Event {
    pub fn timestamp_at(&self) -> Option<DateTime<FixedOffset>> {
        parse_timestamp(&self.timestamp)
    }
}

/// Payload of `GET /api/v1/event`: event key to event.
pub type EventLog = BTreeMap<String, Event>;

/// Payload of `GET /status/check`, displayed verbatim.
pub type StatusReport = serde_json::Value;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_cluster_payload_and_marks_director() {
        let raw = r#"{"Members":{"m1":{"MemberID":"m1","Hostname":"h1","ListenAddress":"1.2.3.4:80","LastUpdated":"2020-01-01T00:00:00Z"}},"Director":{"MemberID":"m1"}}"#;
        let stats: ClusterStats = serde_json::from_str(raw).expect("cluster payload");

        let member = &stats.members["m1"];
        assert_eq!(member.hostname, "h1");
        assert_eq!(member.listen_address, "1.2.3.4:80");
        assert!(member.last_updated_at().is_some());
        assert!(stats.is_director(&MemberId::from("m1")));
        assert!(!stats.is_director(&MemberId::from("m2")));
    }

    #[test]
    fn tolerates_null_director_and_members() {
        let stats: ClusterStats =
            serde_json::from_str(r#"{"Members":null,"Director":null}"#).expect("payload");
        assert!(stats.members.is_empty());
        assert_eq!(stats.director_id(), None);

        let empty: ClusterStats = serde_json::from_str("{}").expect("empty payload");
        assert_eq!(empty, ClusterStats::default());
    }

    #[test]
    fn decodes_event_log_with_backend_field_names() {
        let raw = r#"{"evt-1":{"type":"monitor","message":"check failed","timestamp":"2020-01-01T00:00:00.5Z","memberid":"m1"}}"#;
        let log: EventLog = serde_json::from_str(raw).expect("event log");

        let event = &log["evt-1"];
        assert_eq!(event.kind, "monitor");
        assert_eq!(event.member_id, "m1");
        assert!(event.timestamp_at().is_some());
    }

    #[test]
    fn unparsable_timestamps_do_not_fail_decoding() {
        let raw = r#"{"MemberID":"m1","LastUpdated":"yesterday"}"#;
        let member: MemberStatus = serde_json::from_str(raw).expect("member");
        assert_eq!(member.last_updated, "yesterday");
        assert!(member.last_updated_at().is_none());
    }
}
