//! The console facade: what the presentation layer talks to.
//!
//! `ConsoleState` holds everything synchronous: the loaded messages, the
//! aggregates rebuilt from them, view state, selection and the delete state
//! machine. `Console` adds the ports and runs the async flows (load, detail,
//! delete) around it. State is only borrowed between awaits, never across
//! one, so a background refresh and an operator action can interleave on the
//! single UI thread.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashSet;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use console_types::{
    config::ConsoleConfig,
    event::{ConsoleEvent, Notification, RefreshMode},
    message::Message,
    profile::{DeviceProfile, DeviceTier},
    session::{LinkMap, SessionAggregate, SessionSummary},
    view::{CategoryFilter, DateRange, SortKey, SortOrder, ViewMode, ViewState},
    ConsoleError, Result,
};

use crate::aggregator::aggregate;
use crate::analysis::{self, ConversationStats, ExportFormat};
use crate::deletion::{self, BulkDeleteReport, DeleteTarget, DeletionFlow, DeletionState};
use crate::event_bus::EventBus;
use crate::linker::{self, AppointmentLinker};
use crate::net::{with_retry, RetryPolicy};
use crate::pagination::{paginate, Page};
use crate::ports::*;
use crate::query;
use crate::scheduler::{InteractionGate, ModalKind};
use crate::view_state::{Preferences, ViewStateManager};

/// The collaborators a console needs
#[derive(Clone)]
pub struct Ports {
    pub auth: Rc<dyn AuthPort>,
    pub source: Rc<dyn MessageSourcePort>,
    pub appointments: Rc<dyn AppointmentStorePort>,
    pub preferences: Rc<dyn PreferencePort>,
    pub clock: Rc<dyn ClockPort>,
}

/// Serializable projection handed to the view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleSnapshot {
    pub tier: DeviceTier,
    pub view: ViewState,
    pub page: Page<SessionSummary>,
    pub filtered_count: usize,
    pub total_count: usize,
    pub selected: Option<String>,
    pub deletion: DeletionState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Single(String),
    Bulk(BulkDeleteReport),
}

pub struct ConsoleState {
    profile: DeviceProfile,
    messages: Vec<Message>,
    aggregates: Vec<SessionAggregate>,
    linker: AppointmentLinker,
    view: ViewStateManager,
    selected: Option<String>,
    deletion: DeletionFlow,
    next_ticket: u64,
    applied_ticket: u64,
}

impl ConsoleState {
    pub fn new(profile: DeviceProfile, prefs: Preferences, confirm_debounce_ms: u64) -> Self {
        Self {
            view: ViewStateManager::new(profile.clone(), prefs),
            profile,
            messages: Vec::new(),
            aggregates: Vec::new(),
            linker: AppointmentLinker::new(),
            selected: None,
            deletion: DeletionFlow::new(confirm_debounce_ms),
            next_ticket: 0,
            applied_ticket: 0,
        }
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn aggregates(&self) -> &[SessionAggregate] {
        &self.aggregates
    }

    pub fn aggregate(&self, session_id: &str) -> Option<&SessionAggregate> {
        self.aggregates.iter().find(|a| a.session_id == session_id)
    }

    pub fn view(&self) -> &ViewState {
        self.view.state()
    }

    pub fn view_mut(&mut self) -> &mut ViewStateManager {
        &mut self.view
    }

    pub fn linker(&self) -> &AppointmentLinker {
        &self.linker
    }

    pub fn linker_mut(&mut self) -> &mut AppointmentLinker {
        &mut self.linker
    }

    pub fn deletion(&self) -> &DeletionFlow {
        &self.deletion
    }

    pub fn deletion_mut(&mut self) -> &mut DeletionFlow {
        &mut self.deletion
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Only ids present in the loaded set can be selected.
    pub fn select(&mut self, session_id: Option<&str>) -> bool {
        match session_id {
            Some(id) if self.aggregate(id).is_none() => false,
            other => {
                self.selected = other.map(String::from);
                true
            }
        }
    }

    pub fn begin_load(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    /// Replace the loaded set unless a newer load already landed. Returns
    /// whether the snapshot was applied.
    pub fn apply_snapshot(
        &mut self,
        ticket: u64,
        messages: Vec<Message>,
        aggregates: Vec<SessionAggregate>,
    ) -> bool {
        if ticket <= self.applied_ticket {
            return false;
        }
        self.applied_ticket = ticket;
        self.messages = messages;
        self.aggregates = aggregates;
        if let Some(id) = self.selected.clone() {
            if self.aggregate(&id).is_none() {
                self.selected = None;
            }
        }
        true
    }

    /// Drop sessions and their messages together. Returns how many
    /// aggregates went away. Loads already in flight fetched before the
    /// removal and are discarded when they land.
    pub fn remove_sessions(&mut self, ids: &[String]) -> usize {
        self.applied_ticket = self.next_ticket;
        let doomed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let before = self.aggregates.len();
        self.aggregates.retain(|a| !doomed.contains(a.session_id.as_str()));
        self.messages.retain(|m| !doomed.contains(m.session_id.as_str()));
        if self.selected.as_deref().is_some_and(|s| doomed.contains(s)) {
            self.selected = None;
        }
        before - self.aggregates.len()
    }

    pub fn filtered(&self, now: DateTime<Utc>) -> Vec<&SessionAggregate> {
        query::apply(&self.aggregates, self.view.state(), &self.profile, now)
    }

    pub fn filtered_count(&self, now: DateTime<Utc>) -> usize {
        self.filtered(now).len()
    }

    /// Serves the current page and stores the clamped page number.
    pub fn current_page(&mut self, now: DateTime<Utc>) -> Page<SessionSummary> {
        let view = self.view.state();
        let page = {
            let filtered = self.filtered(now);
            paginate(&filtered, view.page, view.page_size).map(SessionSummary::from)
        };
        self.view.sync_page(page.page);
        page
    }

    pub fn snapshot(&mut self, now: DateTime<Utc>) -> ConsoleSnapshot {
        let page = self.current_page(now);
        ConsoleSnapshot {
            tier: self.profile.tier,
            view: self.view.state().clone(),
            filtered_count: page.total_items,
            total_count: self.aggregates.len(),
            page,
            selected: self.selected.clone(),
            deletion: self.deletion.state().clone(),
        }
    }

    pub fn stats(&self) -> ConversationStats {
        analysis::stats(&self.aggregates, &self.profile)
    }

    pub fn export_selection(&self, ids: &[String], format: ExportFormat) -> Result<String> {
        analysis::export_selection(&self.aggregates, ids, format, &self.profile)
    }
}

pub struct Console {
    profile: DeviceProfile,
    config: ConsoleConfig,
    ports: Ports,
    state: Rc<RefCell<ConsoleState>>,
    bus: EventBus,
    interaction: InteractionGate,
}

impl Console {
    pub fn new(profile: DeviceProfile, config: ConsoleConfig, ports: Ports, bus: EventBus) -> Self {
        let prefs = Preferences::new(
            ports.preferences.clone(),
            config.preference_prefix.clone(),
            profile.tier,
        );
        let state = ConsoleState::new(profile.clone(), prefs, config.confirm_debounce_ms);
        Self {
            profile,
            config,
            ports,
            state: Rc::new(RefCell::new(state)),
            bus,
            interaction: InteractionGate::new(),
        }
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn interaction(&self) -> InteractionGate {
        self.interaction.clone()
    }

    pub fn state(&self) -> Ref<'_, ConsoleState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, ConsoleState> {
        self.state.borrow_mut()
    }

    pub fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.ports.clock.now_ms() as i64).unwrap_or_default()
    }

    fn policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.profile)
    }

    fn token(&self) -> Result<String> {
        self.ports
            .auth
            .bearer_token()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConsoleError::NotAuthenticated)
    }

    // ─── Loading ─────────────────────────────────────────────

    /// Fetch, aggregate, link and apply. Background loads never surface a
    /// failure to the operator.
    pub async fn refresh(&self, mode: RefreshMode) -> Result<usize> {
        let ticket = self.state.borrow_mut().begin_load();
        self.bus.emit(ConsoleEvent::LoadStarted { mode });

        match self.load(ticket).await {
            Ok(sessions) => {
                self.bus.emit(ConsoleEvent::LoadCompleted { mode, sessions });
                Ok(sessions)
            }
            Err(e) => {
                match mode {
                    RefreshMode::Foreground => {
                        log::error!("Load failed: {}", e);
                        self.bus.emit(ConsoleEvent::LoadFailed { message: e.to_string() });
                        self.bus.notify(Notification::for_error(
                            self.profile.tier,
                            "load conversations",
                            &e,
                        ));
                    }
                    RefreshMode::Background => {
                        log::warn!("Background refresh failed: {}", e);
                    }
                }
                Err(e)
            }
        }
    }

    async fn load(&self, ticket: u64) -> Result<usize> {
        let token = self.token()?;
        let params = FetchParams {
            session_id: None,
            limit: self.profile.fetch_limit,
            days: self.profile.day_limit,
        };
        let policy = self.policy();
        let clock = self.ports.clock.as_ref();

        let mut messages =
            with_retry(clock, &policy, || self.ports.source.fetch(&token, &params)).await?;
        let mut aggregates = aggregate(&messages, self.profile.tier);

        if aggregates.len() > self.profile.max_sessions {
            log::debug!(
                "Keeping {} most recent of {} sessions",
                self.profile.max_sessions,
                aggregates.len()
            );
            aggregates = cap_sessions(aggregates, self.profile.max_sessions);
            let kept = linker::session_ids(&aggregates);
            messages.retain(|m| kept.contains(&m.session_id));
        }

        let key = linker::link_key(&aggregates);
        let cached = self.state.borrow().linker().cached_for(&key).cloned();
        let links = match cached {
            Some(map) => map,
            None => {
                let store = self.ports.appointments.as_ref();
                let ids = linker::session_ids(&aggregates);
                match linker::lookup(store, clock, &policy, &token, &ids).await {
                    Some(map) => {
                        self.state.borrow_mut().linker_mut().remember(key, map.clone());
                        map
                    }
                    None => LinkMap::new(),
                }
            }
        };
        linker::merge(&mut aggregates, &links);

        let sessions = aggregates.len();
        if !self.state.borrow_mut().apply_snapshot(ticket, messages, aggregates) {
            log::debug!("Discarding stale load #{}", ticket);
            self.bus.emit(ConsoleEvent::LoadDiscarded { ticket });
        }
        Ok(sessions)
    }

    /// Load one session's transcript fresh from the store and open it.
    pub async fn open_session(&self, session_id: &str) -> Result<SessionAggregate> {
        let token = self.token()?;
        let params = FetchParams {
            session_id: Some(session_id.to_string()),
            limit: self.profile.fetch_limit,
            days: self.profile.day_limit,
        };
        let messages = with_retry(self.ports.clock.as_ref(), &self.policy(), || {
            self.ports.source.fetch(&token, &params)
        })
        .await
        .inspect_err(|e| {
            self.bus.notify(Notification::for_error(self.profile.tier, "open conversation", e));
        })?;

        let mut detail = aggregate(&messages, self.profile.tier)
            .into_iter()
            .find(|a| a.session_id == session_id)
            .ok_or_else(|| ConsoleError::Other(format!("Session {} not found", session_id)))?;

        // Links come from the last lookup only.
        let link = {
            let state = self.state.borrow();
            state.aggregate(session_id).and_then(|a| a.appointment.clone())
        };
        detail.set_appointment(link.as_ref());

        self.select(Some(session_id));
        self.interaction.open(ModalKind::Detail);
        Ok(detail)
    }

    pub fn close_detail(&self) {
        self.interaction.close(ModalKind::Detail);
    }

    pub fn select(&self, session_id: Option<&str>) -> bool {
        let changed = {
            let mut state = self.state.borrow_mut();
            let before = state.selected().map(String::from);
            state.select(session_id) && before.as_deref() != session_id
        };
        if changed {
            self.bus.emit(ConsoleEvent::SelectionChanged {
                session_id: session_id.map(String::from),
            });
        }
        changed
    }

    // ─── View state ──────────────────────────────────────────

    pub fn set_search(&self, term: &str) {
        self.state.borrow_mut().view_mut().set_search(term);
    }

    pub fn set_filter(&self, category: CategoryFilter, range: Option<DateRange>) {
        let mut state = self.state.borrow_mut();
        state.view_mut().set_category(category);
        state.view_mut().set_date_range(range);
    }

    pub fn set_sort(&self, key: SortKey, order: SortOrder) {
        self.state.borrow_mut().view_mut().set_sort(key, order);
    }

    pub fn set_view_mode(&self, mode: ViewMode) {
        self.state.borrow_mut().view_mut().set_view_mode(mode);
    }

    pub fn go_to_page(&self, page: usize) -> usize {
        let now = self.now();
        let mut state = self.state.borrow_mut();
        state.view_mut().go_to_page(page);
        state.current_page(now).page
    }

    pub fn change_page_size(&self, size: usize) {
        self.state.borrow_mut().view_mut().change_page_size(size);
    }

    pub fn clear_filters(&self) {
        self.state.borrow_mut().view_mut().clear_filters();
    }

    pub fn snapshot(&self) -> ConsoleSnapshot {
        let now = self.now();
        self.state.borrow_mut().snapshot(now)
    }

    pub fn stats(&self) -> ConversationStats {
        self.state.borrow().stats()
    }

    pub fn export_selection(&self, ids: &[String], format: ExportFormat) -> Result<String> {
        self.state
            .borrow()
            .export_selection(ids, format)
            .inspect_err(|e| {
                self.bus.notify(Notification::for_error(self.profile.tier, "export", e));
            })
    }

    // ─── Deletion ────────────────────────────────────────────

    /// Open the confirmation step for one session.
    pub fn request_delete(&self, session_id: &str) -> bool {
        self.open_confirmation(DeleteTarget::Single(session_id.to_string()))
    }

    pub fn request_bulk_delete(&self, ids: Vec<String>) -> bool {
        self.open_confirmation(DeleteTarget::Bulk(ids))
    }

    fn open_confirmation(&self, target: DeleteTarget) -> bool {
        let now_ms = self.ports.clock.now_ms();
        let opened = self.state.borrow_mut().deletion_mut().open(target, now_ms);
        if opened {
            self.interaction.open(ModalKind::DeleteConfirm);
        }
        opened
    }

    /// Close the confirmation without deleting. Ignored right after opening.
    pub fn dismiss_delete(&self) -> bool {
        let now_ms = self.ports.clock.now_ms();
        let dismissed = self.state.borrow_mut().deletion_mut().dismiss(now_ms);
        if dismissed {
            self.interaction.close(ModalKind::DeleteConfirm);
        }
        dismissed
    }

    /// Run the delete the operator just confirmed.
    pub async fn confirm_delete(&self) -> Result<DeleteOutcome> {
        let target = self.state.borrow_mut().deletion_mut().confirm();
        self.interaction.close(ModalKind::DeleteConfirm);
        match target {
            Some(DeleteTarget::Single(id)) => {
                self.delete(&id).await?;
                Ok(DeleteOutcome::Single(id))
            }
            Some(DeleteTarget::Bulk(ids)) => Ok(DeleteOutcome::Bulk(self.bulk_delete(&ids).await?)),
            None => Err(ConsoleError::Other("No delete awaiting confirmation".to_string())),
        }
    }

    pub async fn delete(&self, session_id: &str) -> Result<()> {
        self.state
            .borrow_mut()
            .deletion_mut()
            .begin(DeleteTarget::Single(session_id.to_string()));

        let result = match self.token() {
            Ok(token) => {
                let policy = RetryPolicy::once(self.profile.timeout_ms);
                deletion::delete_one(
                    self.ports.source.as_ref(),
                    self.ports.clock.as_ref(),
                    &policy,
                    &token,
                    session_id,
                )
                .await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            log::warn!("Delete of session {} failed: {}", session_id, e);
            self.state.borrow_mut().deletion_mut().fail(e.to_string());
            self.bus.notify(Notification::for_error(
                self.profile.tier,
                "delete conversation",
                &e,
            ));
            return Err(e);
        }

        let ids = vec![session_id.to_string()];
        self.commit_removal(&ids);
        self.bus.emit(ConsoleEvent::DeleteCommitted {
            session_id: session_id.to_string(),
        });
        self.bus.notify(Notification::deleted(self.profile.tier, 1));
        self.verify_reload(&ids).await;
        Ok(())
    }

    pub async fn bulk_delete(&self, ids: &[String]) -> Result<BulkDeleteReport> {
        if ids.is_empty() {
            self.state.borrow_mut().deletion_mut().reset();
            return Ok(BulkDeleteReport::default());
        }
        self.state
            .borrow_mut()
            .deletion_mut()
            .begin(DeleteTarget::Bulk(ids.to_vec()));

        let result = match self.token() {
            Ok(token) => {
                let policy = RetryPolicy::once(self.profile.timeout_ms);
                deletion::delete_many(
                    self.ports.source.as_ref(),
                    self.ports.clock.as_ref(),
                    &policy,
                    &token,
                    ids,
                    self.profile.max_bulk_ops,
                )
                .await
            }
            Err(e) => Err(e),
        };

        let report = match result {
            Ok(report) => report,
            Err(e) => {
                self.state.borrow_mut().deletion_mut().fail(e.to_string());
                self.bus
                    .notify(Notification::for_error(self.profile.tier, "delete conversations", &e));
                return Err(e);
            }
        };

        let (ok, failed) = (report.succeeded_count(), report.failed_count());
        self.bus.emit(ConsoleEvent::BulkDeleteFinished { succeeded: ok, failed });

        if ok == 0 {
            self.state
                .borrow_mut()
                .deletion_mut()
                .fail(format!("{} deletes failed", failed));
            self.bus.notify(Notification::for_error(
                self.profile.tier,
                "delete conversations",
                &ConsoleError::PartialBulkFailure { succeeded: 0, failed },
            ));
            return Ok(report);
        }

        self.commit_removal(&report.succeeded);
        if failed == 0 {
            self.bus.notify(Notification::deleted(self.profile.tier, ok));
        } else {
            self.bus
                .notify(Notification::partial_delete(self.profile.tier, ok, failed));
        }
        self.verify_reload(&report.succeeded).await;
        Ok(report)
    }

    fn commit_removal(&self, ids: &[String]) {
        let was_selected = {
            let state = self.state.borrow();
            state.selected().is_some_and(|s| ids.iter().any(|id| id == s))
        };
        {
            let mut state = self.state.borrow_mut();
            state.remove_sessions(ids);
            state.deletion_mut().commit(ids.to_vec());
        }
        if was_selected {
            self.interaction.close(ModalKind::Detail);
            self.bus.emit(ConsoleEvent::SelectionChanged { session_id: None });
        }
    }

    /// Full reload after a confirmed delete so the view matches the store,
    /// not just the local splice.
    async fn verify_reload(&self, deleted: &[String]) {
        if self.config.reload_settle_ms > 0 {
            self.ports.clock.sleep(self.config.reload_settle_ms).await;
        }
        if self.refresh(RefreshMode::Background).await.is_err() {
            return;
        }
        let state = self.state.borrow();
        for id in deleted {
            if state.aggregate(id).is_some() {
                log::warn!("Session {} is back after delete; the store reintroduced it", id);
            }
        }
    }
}

/// Keep the `max` most recent sessions, preserving their relative order.
fn cap_sessions(aggregates: Vec<SessionAggregate>, max: usize) -> Vec<SessionAggregate> {
    let keep: HashSet<String> = {
        let mut refs: Vec<&SessionAggregate> = aggregates.iter().collect();
        query::sort(&mut refs, SortKey::Recency, SortOrder::Desc);
        refs.into_iter().take(max).map(|a| a.session_id.clone()).collect()
    };
    aggregates
        .into_iter()
        .filter(|a| keep.contains(&a.session_id))
        .collect()
}
