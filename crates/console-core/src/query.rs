//! Search, category filtering and sorting over the loaded aggregates.
//!
//! Every pass runs over the whole collection so the filtered count the pager
//! shows is exact.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};

use console_types::{
    profile::{DeviceProfile, DeviceTier},
    session::SessionAggregate,
    view::{CategoryFilter, DateRange, SortKey, SortOrder, ViewState},
};

pub fn apply<'a>(
    aggregates: &'a [SessionAggregate],
    view: &ViewState,
    profile: &DeviceProfile,
    now: DateTime<Utc>,
) -> Vec<&'a SessionAggregate> {
    let term = view.search_term.trim().to_lowercase();

    let mut out: Vec<&SessionAggregate> = aggregates
        .iter()
        .filter(|a| term.is_empty() || matches_search(a, &term, profile.tier))
        .filter(|a| matches_category(a, view.category, now))
        .filter(|a| view.date_range.map_or(true, |r| in_range(a, &r)))
        .collect();

    sort(&mut out, view.sort_key, view.sort_order);
    out
}

/// `term` must already be lowercase. Compact matches the name, first
/// message and id; medium adds email and booked name; full also reads
/// every message.
pub fn matches_search(agg: &SessionAggregate, term: &str, tier: DeviceTier) -> bool {
    let hit = |field: &str| field.to_lowercase().contains(term);

    if hit(&agg.user_name) || hit(&agg.first_message) || hit(&agg.session_id) {
        return true;
    }
    if tier == DeviceTier::Compact {
        return false;
    }
    if agg.user_email.as_deref().is_some_and(hit)
        || agg.appointment.as_ref().is_some_and(|a| hit(&a.name))
    {
        return true;
    }
    tier == DeviceTier::Full && agg.messages.iter().any(|m| hit(&m.content))
}

/// Sessions without a parsable timestamp never match a time-based filter.
pub fn matches_category(agg: &SessionAggregate, category: CategoryFilter, now: DateTime<Utc>) -> bool {
    match category {
        CategoryFilter::All | CategoryFilter::CustomRange => true,
        CategoryFilter::HasAppointment => agg.has_appointment,
        CategoryFilter::NoAppointment => !agg.has_appointment,
        CategoryFilter::Recent => agg
            .last_activity
            .is_some_and(|t| now.signed_duration_since(t) <= Duration::hours(24)),
        CategoryFilter::Today => agg
            .last_activity
            .is_some_and(|t| t.date_naive() == now.date_naive()),
    }
}

fn in_range(agg: &SessionAggregate, range: &DateRange) -> bool {
    agg.last_activity
        .is_some_and(|t| range.contains(t.date_naive()))
}

/// Stable: equal keys keep their incoming order in both directions.
pub fn sort(items: &mut [&SessionAggregate], key: SortKey, order: SortOrder) {
    items.sort_by(|a, b| compare(a, b, key, order));
}

fn compare(a: &SessionAggregate, b: &SessionAggregate, key: SortKey, order: SortOrder) -> Ordering {
    let directed = |ord: Ordering| match order {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
    };
    match key {
        // Undated sessions go last whichever way the list is sorted.
        SortKey::Recency => match (a.last_activity, b.last_activity) {
            (Some(x), Some(y)) => directed(x.cmp(&y)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortKey::MessageCount => directed(a.message_count.cmp(&b.message_count)),
        SortKey::Name => directed(a.user_name.to_lowercase().cmp(&b.user_name.to_lowercase())),
    }
}
