//! Read-only statistics and exports over the loaded aggregates.

use std::collections::HashMap;

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use console_types::{
    profile::DeviceProfile,
    session::SessionAggregate,
    ConsoleError, Result,
};

/// Share of the busiest hour an hour must exceed to count as a peak
const PEAK_THRESHOLD: f64 = 0.7;
const MIN_TERM_LEN: usize = 3;

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "you", "your", "are", "was", "with", "this", "that", "have", "has",
    "can", "could", "would", "will", "what", "when", "where", "how", "who", "not", "but", "any",
    "all", "our", "out", "get", "from", "about", "there", "they", "them", "then", "than", "just",
    "like", "want", "need", "please", "thanks", "thank", "hello", "yes", "hey", "its", "it's",
    "i'm", "i'd", "i'll", "me", "my", "is", "to", "of", "in", "on", "at", "an", "be", "do", "so",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStats {
    pub total_sessions: usize,
    pub sessions_with_appointment: usize,
    /// 0.0 – 1.0
    pub conversion_rate: f64,
    /// UTC hours, ascending
    pub peak_hours: Vec<u32>,
    pub top_terms: Vec<TermCount>,
    pub avg_messages_per_session: f64,
    pub avg_duration_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

pub fn stats(aggregates: &[SessionAggregate], profile: &DeviceProfile) -> ConversationStats {
    let total = aggregates.len();
    let with_appointment = aggregates.iter().filter(|a| a.has_appointment).count();
    let (avg_messages, avg_duration) = if total == 0 {
        (0.0, 0.0)
    } else {
        let messages: usize = aggregates.iter().map(|a| a.message_count).sum();
        let minutes: i64 = aggregates.iter().map(|a| a.duration_minutes).sum();
        (messages as f64 / total as f64, minutes as f64 / total as f64)
    };

    ConversationStats {
        total_sessions: total,
        sessions_with_appointment: with_appointment,
        conversion_rate: conversion_rate(aggregates),
        peak_hours: peak_hours(aggregates),
        top_terms: top_terms(aggregates, profile.top_terms),
        avg_messages_per_session: avg_messages,
        avg_duration_minutes: avg_duration,
    }
}

pub fn conversion_rate(aggregates: &[SessionAggregate]) -> f64 {
    if aggregates.is_empty() {
        return 0.0;
    }
    let booked = aggregates.iter().filter(|a| a.has_appointment).count();
    booked as f64 / aggregates.len() as f64
}

/// Hours whose message count is above 70% of the busiest hour's.
pub fn peak_hours(aggregates: &[SessionAggregate]) -> Vec<u32> {
    let mut per_hour = [0usize; 24];
    for ts in aggregates
        .iter()
        .flat_map(|a| a.messages.iter())
        .filter_map(|m| m.parsed_timestamp())
    {
        per_hour[ts.hour() as usize] += 1;
    }

    let busiest = per_hour.iter().copied().max().unwrap_or(0);
    if busiest == 0 {
        return Vec::new();
    }
    let threshold = busiest as f64 * PEAK_THRESHOLD;
    (0u32..24)
        .filter(|h| per_hour[*h as usize] as f64 > threshold)
        .collect()
}

/// Most frequent words of user messages; ties break alphabetically.
pub fn top_terms(aggregates: &[SessionAggregate], limit: usize) -> Vec<TermCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for msg in aggregates
        .iter()
        .flat_map(|a| a.messages.iter())
        .filter(|m| m.is_user())
    {
        for token in tokenize(&msg.content) {
            *counts.entry(token).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<TermCount> = counts
        .into_iter()
        .map(|(term, count)| TermCount { term, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
    ranked.truncate(limit);
    ranked
}

fn tokenize(content: &str) -> impl Iterator<Item = String> + '_ {
    content
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| w.chars().count() >= MIN_TERM_LEN)
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
}

// ─── Export ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }
}

const CSV_HEADER: &str =
    "session_id,user_name,user_email,message_count,first_message,last_activity,duration,has_appointment,appointment_id";

/// Export the aggregates named by `ids`, in the order given. Unknown ids are
/// skipped; more ids than the tier allows is rejected outright.
pub fn export_selection(
    aggregates: &[SessionAggregate],
    ids: &[String],
    format: ExportFormat,
    profile: &DeviceProfile,
) -> Result<String> {
    if ids.len() > profile.max_export {
        return Err(ConsoleError::ValidationLimitExceeded {
            operation: "export".to_string(),
            requested: ids.len(),
            limit: profile.max_export,
        });
    }

    let by_id: HashMap<&str, &SessionAggregate> =
        aggregates.iter().map(|a| (a.session_id.as_str(), a)).collect();
    let selected: Vec<&SessionAggregate> = ids
        .iter()
        .filter_map(|id| by_id.get(id.as_str()).copied())
        .collect();

    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(&selected)?),
        ExportFormat::Csv => {
            let mut out = String::from(CSV_HEADER);
            out.push('\n');
            for a in selected {
                let row = [
                    a.session_id.clone(),
                    a.user_name.clone(),
                    a.user_email.clone().unwrap_or_default(),
                    a.message_count.to_string(),
                    a.first_message.clone(),
                    a.last_activity.map(|t| t.to_rfc3339()).unwrap_or_default(),
                    a.duration.clone(),
                    a.has_appointment.to_string(),
                    a.appointment_id.map(|id| id.to_string()).unwrap_or_default(),
                ];
                let cells: Vec<String> = row.iter().map(|c| csv_cell(c)).collect();
                out.push_str(&cells.join(","));
                out.push('\n');
            }
            Ok(out)
        }
    }
}

fn csv_cell(raw: &str) -> String {
    if raw.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
