use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::Message;

pub const ANONYMOUS_USER: &str = "Anonymous User";
pub const SESSION_STARTED: &str = "Session started";

/// Appointment booked from a chat session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRef {
    pub appointment_id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
}

impl AppointmentRef {
    pub fn new(appointment_id: u64) -> Self {
        Self {
            appointment_id,
            name: String::new(),
            date: String::new(),
            time: String::new(),
        }
    }
}

/// Session id → appointment. Derived and disposable.
pub type LinkMap = HashMap<String, AppointmentRef>;

/// Session-level summary built from raw messages (a "conversation box").
///
/// Always rebuilt from the loaded message set, never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionAggregate {
    pub session_id: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    pub message_count: usize,
    pub first_message: String,
    /// Earliest parsable timestamp
    pub started_at: Option<DateTime<Utc>>,
    /// Latest parsable timestamp
    pub last_activity: Option<DateTime<Utc>>,
    pub duration_minutes: i64,
    /// `duration_minutes` formatted for the active tier
    pub duration: String,
    pub has_appointment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment: Option<AppointmentRef>,
    pub messages: Vec<Message>,
}

impl SessionAggregate {
    pub fn set_appointment(&mut self, appointment: Option<&AppointmentRef>) {
        self.has_appointment = appointment.is_some();
        self.appointment_id = appointment.map(|a| a.appointment_id);
        self.appointment = appointment.cloned();
    }
}

/// Lightweight row for list views that do not need the transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub user_name: String,
    pub first_message: String,
    pub last_activity: Option<DateTime<Utc>>,
    pub duration: String,
    pub message_count: usize,
    pub has_appointment: bool,
}

impl From<&SessionAggregate> for SessionSummary {
    fn from(a: &SessionAggregate) -> Self {
        Self {
            session_id: a.session_id.clone(),
            user_name: a.user_name.clone(),
            first_message: a.first_message.clone(),
            last_activity: a.last_activity,
            duration: a.duration.clone(),
            message_count: a.message_count,
            has_appointment: a.has_appointment,
        }
    }
}
