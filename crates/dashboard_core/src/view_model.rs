//! Render-ready projections of resource state. Views only read these.

use std::cmp::Ordering;

use chrono::{DateTime, Datelike, Utc};
use shared::domain::{parse_timestamp, ClusterStats, EventLog, StatusReport};

use crate::lifecycle::ResourceState;

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// `Wednesday, January 1st, 2020, 12:00:00.000 AM UTC`
pub fn format_datetime(value: DateTime<Utc>) -> String {
    let day = value.day();
    format!(
        "{}{day}{}{}",
        value.format("%A, %B "),
        ordinal_suffix(day),
        value.format(", %Y, %-I:%M:%S%.3f %p UTC")
    )
}

/// Formats a backend timestamp for display, falling back to the raw text
/// when it is not RFC 3339.
pub fn format_timestamp(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(parsed) => format_datetime(parsed.with_timezone(&Utc)),
        None if raw.trim().is_empty() => "unknown".to_string(),
        None => raw.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberCard {
    pub member_id: String,
    pub hostname: String,
    pub listen_address: String,
    pub last_updated: String,
    pub tags: Vec<String>,
    pub version: Option<String>,
    pub is_director: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterViewModel {
    pub status_text: String,
    pub is_fetching: bool,
    pub members: Vec<MemberCard>,
    pub director: Option<String>,
    pub last_refreshed: Option<String>,
}

impl ClusterViewModel {
    pub fn from_state(state: &ResourceState<ClusterStats>) -> Self {
        let (members, director) = match &state.data {
            Some(stats) => (member_cards(stats), stats.director_id().map(ToString::to_string)),
            None => (Vec::new(), None),
        };
        Self {
            status_text: state.status_text.clone(),
            is_fetching: state.is_fetching,
            members,
            director,
            last_refreshed: state.last_success_at.map(format_datetime),
        }
    }

    pub fn director_card(&self) -> Option<&MemberCard> {
        self.members.iter().find(|card| card.is_director)
    }
}

fn member_cards(stats: &ClusterStats) -> Vec<MemberCard> {
    // BTreeMap iteration keeps cards ordered by member key.
    stats
        .members
        .values()
        .map(|member| MemberCard {
            member_id: member.member_id.to_string(),
            hostname: member.hostname.clone(),
            listen_address: member.listen_address.clone(),
            last_updated: format_timestamp(&member.last_updated),
            tags: member.tags.clone(),
            version: member.sem_ver.clone().or_else(|| member.version.clone()),
            is_director: stats.is_director(&member.member_id),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    pub key: String,
    pub message: String,
    pub kind: String,
    pub member_id: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsViewModel {
    pub status_text: String,
    pub is_fetching: bool,
    pub rows: Vec<EventRow>,
    pub last_refreshed: Option<String>,
}

impl EventsViewModel {
    pub fn from_state(state: &ResourceState<EventLog>) -> Self {
        Self {
            status_text: state.status_text.clone(),
            is_fetching: state.is_fetching,
            rows: state.data.as_ref().map(event_rows).unwrap_or_default(),
            last_refreshed: state.last_success_at.map(format_datetime),
        }
    }
}

/// Newest first; events without a parsable timestamp sink to the bottom.
fn event_rows(log: &EventLog) -> Vec<EventRow> {
    let mut entries = log
        .iter()
        .map(|(key, event)| (event.timestamp_at(), key, event))
        .collect::<Vec<_>>();
    entries.sort_by(|(left_at, left_key, _), (right_at, right_key, _)| {
        let newest_first = match (left_at, right_at) {
            (Some(left), Some(right)) => right.cmp(left),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        newest_first.then_with(|| left_key.cmp(right_key))
    });

    entries
        .into_iter()
        .map(|(_, key, event)| EventRow {
            key: key.clone(),
            message: event.message.clone(),
            kind: event.kind.clone(),
            member_id: event.member_id.clone(),
            timestamp: format_timestamp(&event.timestamp),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusViewModel {
    pub status_text: String,
    pub is_fetching: bool,
    pub pretty_json: Option<String>,
    pub last_refreshed: Option<String>,
}

impl StatusViewModel {
    pub fn from_state(state: &ResourceState<StatusReport>) -> Self {
        Self {
            status_text: state.status_text.clone(),
            is_fetching: state.is_fetching,
            pretty_json: state
                .data
                .as_ref()
                .map(|report| {
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| report.to_string())
                }),
            last_refreshed: state.last_success_at.map(format_datetime),
        }
    }
}
