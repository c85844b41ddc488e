//! Appointment linking.
//!
//! Which sessions led to a booking is answered by the appointment store in a
//! single batched request for the whole id set. The result is memoized on the
//! message set (each session's id and message count), so repeated refreshes
//! of an unchanged conversation list cost no lookup while a new message in a
//! loaded session asks again. Appointment presence is an enrichment: a failed lookup degrades to
//! "no appointment known" instead of failing the load.

use std::collections::{BTreeMap, BTreeSet};

use console_types::session::{LinkMap, SessionAggregate};

use crate::net::{with_retry, RetryPolicy};
use crate::ports::{AppointmentStorePort, ClockPort};

/// Session id to message count for a loaded set
pub type LinkKey = BTreeMap<String, usize>;

/// Memo of the last successful lookup
#[derive(Debug, Default)]
pub struct AppointmentLinker {
    cached: Option<(LinkKey, LinkMap)>,
}

impl AppointmentLinker {
    pub fn new() -> Self {
        Self { cached: None }
    }

    /// The map from the last lookup, if it was made for exactly `key`.
    pub fn cached_for(&self, key: &LinkKey) -> Option<&LinkMap> {
        match &self.cached {
            Some((cached_key, map)) if cached_key == key => Some(map),
            _ => None,
        }
    }

    pub fn remember(&mut self, key: LinkKey, map: LinkMap) {
        self.cached = Some((key, map));
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

pub fn session_ids(aggregates: &[SessionAggregate]) -> BTreeSet<String> {
    aggregates.iter().map(|a| a.session_id.clone()).collect()
}

pub fn link_key(aggregates: &[SessionAggregate]) -> LinkKey {
    aggregates
        .iter()
        .map(|a| (a.session_id.clone(), a.message_count))
        .collect()
}

/// One batched lookup. `None` when the store could not answer; callers treat
/// that as an empty map and do not memoize it.
pub async fn lookup(
    store: &dyn AppointmentStorePort,
    clock: &dyn ClockPort,
    policy: &RetryPolicy,
    token: &str,
    ids: &BTreeSet<String>,
) -> Option<LinkMap> {
    if ids.is_empty() {
        return Some(LinkMap::new());
    }
    let ids: Vec<String> = ids.iter().cloned().collect();
    match with_retry(clock, policy, || store.batch_lookup(token, &ids)).await {
        Ok(map) => {
            log::debug!("Appointment lookup: {} of {} sessions linked", map.len(), ids.len());
            Some(map)
        }
        Err(e) => {
            log::warn!("Appointment lookup failed ({}), continuing without links", e);
            None
        }
    }
}

/// Overwrites every aggregate's appointment fields from `map`. Message
/// content is never consulted.
pub fn merge(aggregates: &mut [SessionAggregate], map: &LinkMap) {
    for agg in aggregates.iter_mut() {
        agg.set_appointment(map.get(&agg.session_id));
    }
}
