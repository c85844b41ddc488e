//! Session aggregation. Rebuilds conversation boxes from the flat message
//! stream.
//!
//! Aggregates are always computed from scratch. Grouping keeps first-seen
//! session order, and each group is sorted by timestamp before any derived
//! field is read, so feeding the flattened output back in yields the same
//! aggregates.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use console_types::{
    message::Message,
    profile::DeviceTier,
    session::{SessionAggregate, ANONYMOUS_USER, SESSION_STARTED},
};

/// Words that follow "I'm" / "this is" far more often than a name does
const NOT_A_NAME: &[&str] = &[
    "Available", "Busy", "Calling", "Confused", "Fine", "Free", "Good", "Great", "Here", "Hoping",
    "Interested", "Just", "Looking", "New", "Not", "Okay", "Ready", "Sorry", "Still", "Sure",
    "Trying", "Wondering",
];

pub fn aggregate(messages: &[Message], tier: DeviceTier) -> Vec<SessionAggregate> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&Message>> = HashMap::new();

    for msg in messages {
        groups
            .entry(msg.session_id.as_str())
            .or_insert_with(|| {
                order.push(msg.session_id.as_str());
                Vec::new()
            })
            .push(msg);
    }

    order
        .into_iter()
        .filter_map(|id| groups.remove(id).map(|group| build(id, group, tier)))
        .collect()
}

/// Inverse of [`aggregate`]: every message, grouped by session in
/// aggregate order.
pub fn flatten(aggregates: &[SessionAggregate]) -> Vec<Message> {
    aggregates
        .iter()
        .flat_map(|a| a.messages.iter().cloned())
        .collect()
}

fn build(session_id: &str, mut group: Vec<&Message>, tier: DeviceTier) -> SessionAggregate {
    // Unparsable timestamps sort last and keep their relative order.
    group.sort_by_key(|m| {
        let ts = m.parsed_timestamp();
        (ts.is_none(), ts)
    });

    let stamps: Vec<DateTime<Utc>> = group.iter().filter_map(|m| m.parsed_timestamp()).collect();
    let started_at = stamps.iter().min().copied();
    let last_activity = stamps.iter().max().copied();

    let duration_minutes = match (started_at, last_activity) {
        (Some(first), Some(last)) if group.len() >= 2 => (last - first).num_minutes().max(0),
        _ => 0,
    };

    let first_message = group
        .iter()
        .find(|m| m.is_user() && !m.content.trim().is_empty())
        .map(|m| m.content.clone())
        .unwrap_or_else(|| SESSION_STARTED.to_string());

    let user_email = group
        .iter()
        .filter_map(|m| m.user_email.as_deref())
        .map(str::trim)
        .find(|e| !e.is_empty())
        .map(String::from);

    SessionAggregate {
        session_id: session_id.to_string(),
        user_name: resolve_user_name(&group),
        user_email,
        message_count: group.len(),
        first_message,
        started_at,
        last_activity,
        duration_minutes,
        duration: format_duration(duration_minutes, tier),
        has_appointment: false,
        appointment_id: None,
        appointment: None,
        messages: group.into_iter().cloned().collect(),
    }
}

/// Display name → first + last → first → name stated in a user message →
/// "Anonymous User". Each step scans the whole session before falling
/// through.
pub fn resolve_user_name(group: &[&Message]) -> String {
    let infos = || group.iter().filter_map(|m| m.user_info.as_ref());

    if let Some(name) = infos().find_map(|i| non_empty(i.user_name.as_deref())) {
        return name.to_string();
    }

    if let Some(full) = infos().find_map(|i| {
        match (non_empty(i.first_name.as_deref()), non_empty(i.last_name.as_deref())) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            _ => None,
        }
    }) {
        return full;
    }

    if let Some(first) = infos().find_map(|i| non_empty(i.first_name.as_deref())) {
        return first.to_string();
    }

    group
        .iter()
        .filter(|m| m.is_user())
        .find_map(|m| name_from_content(&m.content))
        .unwrap_or_else(|| ANONYMOUS_USER.to_string())
}

/// Picks up "my name is Jane Doe", "I'm Jane", "this is Jane" and similar.
pub fn name_from_content(content: &str) -> Option<String> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let re = PATTERN
        .get_or_init(|| {
            Regex::new(
                r"\b(?i:my name is|my name's|i am|i'm|i’m|this is|call me)\s+([A-Z][a-zA-Z'\-]+(?:\s+[A-Z][a-zA-Z'\-]+)?)",
            )
            .ok()
        })
        .as_ref()?;

    re.captures_iter(content).find_map(|caps| {
        let name = caps.get(1)?.as_str();
        let first_word = name.split_whitespace().next()?;
        if NOT_A_NAME.contains(&first_word) {
            None
        } else {
            Some(name.to_string())
        }
    })
}

/// Compact shows whole hours past the first hour, medium hours and minutes,
/// full spells the units out.
pub fn format_duration(minutes: i64, tier: DeviceTier) -> String {
    let minutes = minutes.max(0);
    let (hours, rem) = (minutes / 60, minutes % 60);
    match tier {
        DeviceTier::Compact if hours == 0 => format!("{}m", minutes),
        DeviceTier::Compact => format!("{}h", hours),
        DeviceTier::Medium if hours == 0 => format!("{}m", minutes),
        DeviceTier::Medium if rem == 0 => format!("{}h", hours),
        DeviceTier::Medium => format!("{}h {}m", hours, rem),
        DeviceTier::Full if hours == 0 => plural(minutes, "minute"),
        DeviceTier::Full if rem == 0 => plural(hours, "hour"),
        DeviceTier::Full => format!("{} {}", plural(hours, "hour"), plural(rem, "minute")),
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
