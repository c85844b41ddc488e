//! The handle the host page drives: builds the console from browser
//! adapters, runs the background refresh loop and converts every result to
//! a JS value.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::NaiveDate;
use gloo_utils::format::JsValueSerdeExt;
use serde::{de::DeserializeOwned, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use console_core::analysis::ExportFormat;
use console_core::console::{Console, DeleteOutcome, Ports};
use console_core::event_bus::EventBus;
use console_core::scheduler::{ModalKind, RefreshScheduler};
use console_platform::storage::auto_detect_preferences;
use console_platform::{
    detect_profile, HttpAppointmentStore, HttpMessageSource, LocalStorageAuth, TimerClock,
};
use console_types::{
    config::ConsoleConfig,
    event::RefreshMode,
    view::{CategoryFilter, DateRange, SortKey, SortOrder, ViewMode},
    ConsoleError,
};
use console_ui::state::UiState;

#[wasm_bindgen]
pub struct ConsoleHandle {
    console: Rc<Console>,
    ui: Rc<RefCell<UiState>>,
    auth: Rc<LocalStorageAuth>,
    clock: Rc<TimerClock>,
    refresh_loop: RefreshLoop,
}

#[wasm_bindgen]
impl ConsoleHandle {
    /// `config_json` is a partial [`ConsoleConfig`]; `tier` overrides the
    /// viewport-derived device tier.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>, tier: Option<String>) -> ConsoleHandle {
        let config = load_config(config_json.as_deref());
        let profile = detect_profile(tier.as_deref());
        log::info!(
            "Console tier {}: fetch limit {}, {} days, refresh every {}ms",
            profile.tier.as_str(),
            profile.fetch_limit,
            profile.day_limit,
            profile.refresh_interval_ms
        );

        let auth = Rc::new(LocalStorageAuth::new(config.token_storage_key.clone()));
        let clock = Rc::new(TimerClock::new());
        let ports = Ports {
            auth: auth.clone(),
            source: Rc::new(HttpMessageSource::new(config.clone())),
            appointments: Rc::new(HttpAppointmentStore::new(config.clone())),
            preferences: auto_detect_preferences(),
            clock: clock.clone(),
        };

        ConsoleHandle {
            console: Rc::new(Console::new(profile, config, ports, EventBus::new())),
            ui: Rc::new(RefCell::new(UiState::new())),
            auth,
            clock,
            refresh_loop: RefreshLoop::default(),
        }
    }

    /// First foreground load, then the tier's background refresh loop.
    pub fn start(&self) -> js_sys::Promise {
        let first_load = self.refresh();
        let Some(generation) = self.refresh_loop.begin() else {
            return first_load;
        };

        let console = self.console.clone();
        let clock = self.clock.clone();
        let refresh_loop = self.refresh_loop.clone();
        spawn_local(async move {
            let scheduler = RefreshScheduler::for_console(&console);
            log::info!(
                "Background refresh #{} every {}ms",
                generation,
                scheduler.interval_ms()
            );
            scheduler
                .run(&console, clock.as_ref(), || refresh_loop.is_current(generation))
                .await;
            log::info!("Background refresh #{} stopped", generation);
        });
        first_load
    }

    /// Ends the refresh loop after its current sleep.
    pub fn stop(&self) {
        self.refresh_loop.stop();
    }

    pub fn sign_in(&self, token: &str) -> Result<(), JsValue> {
        self.auth.store_token(token).map_err(js_err)
    }

    pub fn sign_out(&self) -> Result<(), JsValue> {
        self.auth.clear_token().map_err(js_err)
    }

    // ─── Projections ─────────────────────────────────────────

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        self.sync_ui();
        to_js(&self.console.snapshot())
    }

    pub fn ui_state(&self) -> Result<JsValue, JsValue> {
        self.sync_ui();
        to_js(&*self.ui.borrow())
    }

    pub fn take_notifications(&self) -> Result<JsValue, JsValue> {
        self.sync_ui();
        let taken = self.ui.borrow_mut().take_notifications();
        to_js(&taken)
    }

    pub fn stats(&self) -> Result<JsValue, JsValue> {
        to_js(&self.console.stats())
    }

    pub fn export_selection(&self, ids: Vec<String>, format: &str) -> Result<String, JsValue> {
        let format = ExportFormat::parse(format)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown export format: {}", format)))?;
        let result = self.console.export_selection(&ids, format);
        self.sync_ui();
        result.map_err(js_err)
    }

    // ─── Loading and selection ───────────────────────────────

    pub fn refresh(&self) -> js_sys::Promise {
        let console = self.console.clone();
        let ui = self.ui.clone();
        future_to_promise(async move {
            let result = console.refresh(RefreshMode::Foreground).await;
            ui.borrow_mut().process_events(console.events().drain());
            result.map(|n| JsValue::from_f64(n as f64)).map_err(js_err)
        })
    }

    pub fn select(&self, session_id: Option<String>) -> bool {
        let changed = self.console.select(session_id.as_deref());
        self.sync_ui();
        changed
    }

    /// Resolves to the full session with its transcript.
    pub fn open_session(&self, session_id: String) -> js_sys::Promise {
        let console = self.console.clone();
        let ui = self.ui.clone();
        future_to_promise(async move {
            let result = console.open_session(&session_id).await;
            ui.borrow_mut().process_events(console.events().drain());
            to_js(&result.map_err(js_err)?)
        })
    }

    pub fn close_detail(&self) {
        self.console.close_detail();
    }

    /// For modals the console does not own, such as an edit form.
    pub fn set_modal_open(&self, kind: &str, open: bool) -> Result<(), JsValue> {
        let kind: ModalKind = parse_value("modal kind", kind)?;
        let gate = self.console.interaction();
        if open {
            gate.open(kind);
        } else {
            gate.close(kind);
        }
        Ok(())
    }

    // ─── View state ──────────────────────────────────────────

    pub fn set_search(&self, term: &str) {
        self.console.set_search(term);
    }

    /// `start` and `end` are `YYYY-MM-DD`; both or neither.
    pub fn set_filter(
        &self,
        category: &str,
        start: Option<String>,
        end: Option<String>,
    ) -> Result<(), JsValue> {
        let category: CategoryFilter = parse_value("category", category)?;
        let range = match (start, end) {
            (Some(s), Some(e)) => Some(DateRange::new(
                parse_value::<NaiveDate>("date", &s)?,
                parse_value::<NaiveDate>("date", &e)?,
            )),
            (None, None) => None,
            _ => return Err(JsValue::from_str("A date range needs both a start and an end")),
        };
        self.console.set_filter(category, range);
        Ok(())
    }

    pub fn set_sort(&self, key: &str, order: &str) -> Result<(), JsValue> {
        let key: SortKey = parse_value("sort key", key)?;
        let order: SortOrder = parse_value("sort order", order)?;
        self.console.set_sort(key, order);
        Ok(())
    }

    pub fn set_view_mode(&self, mode: &str) -> Result<(), JsValue> {
        let mode = ViewMode::parse(mode)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown view mode: {}", mode)))?;
        self.console.set_view_mode(mode);
        Ok(())
    }

    /// Returns the page actually served after clamping.
    pub fn go_to_page(&self, page: usize) -> usize {
        self.console.go_to_page(page)
    }

    pub fn change_page_size(&self, size: usize) {
        self.console.change_page_size(size);
    }

    pub fn clear_filters(&self) {
        self.console.clear_filters();
    }

    // ─── Deletion ────────────────────────────────────────────

    pub fn request_delete(&self, session_id: &str) -> bool {
        self.console.request_delete(session_id)
    }

    pub fn request_bulk_delete(&self, ids: Vec<String>) -> bool {
        self.console.request_bulk_delete(ids)
    }

    pub fn dismiss_delete(&self) -> bool {
        self.console.dismiss_delete()
    }

    /// Resolves to the deleted id, or to the bulk report.
    pub fn confirm_delete(&self) -> js_sys::Promise {
        let console = self.console.clone();
        let ui = self.ui.clone();
        ui.borrow_mut().mark_deleting();
        future_to_promise(async move {
            let result = console.confirm_delete().await;
            ui.borrow_mut().process_events(console.events().drain());
            match result.map_err(js_err)? {
                DeleteOutcome::Single(id) => Ok(JsValue::from_str(&id)),
                DeleteOutcome::Bulk(report) => to_js(&report),
            }
        })
    }

    pub fn delete(&self, session_id: String) -> js_sys::Promise {
        let console = self.console.clone();
        let ui = self.ui.clone();
        ui.borrow_mut().mark_deleting();
        future_to_promise(async move {
            let result = console.delete(&session_id).await;
            ui.borrow_mut().process_events(console.events().drain());
            result.map_err(js_err)?;
            Ok(JsValue::from_str(&session_id))
        })
    }

    pub fn bulk_delete(&self, ids: Vec<String>) -> js_sys::Promise {
        let console = self.console.clone();
        let ui = self.ui.clone();
        ui.borrow_mut().mark_deleting();
        future_to_promise(async move {
            let result = console.bulk_delete(&ids).await;
            ui.borrow_mut().process_events(console.events().drain());
            to_js(&result.map_err(js_err)?)
        })
    }
}

/// Which background loop is the live one. A loop still asleep when the
/// handle is stopped and started again finds itself retired on waking.
#[derive(Clone, Default)]
pub(crate) struct RefreshLoop {
    running: Rc<Cell<bool>>,
    generation: Rc<Cell<u64>>,
}

impl RefreshLoop {
    /// The new loop's generation, or `None` if one is already running.
    pub(crate) fn begin(&self) -> Option<u64> {
        if self.running.replace(true) {
            return None;
        }
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        Some(generation)
    }

    pub(crate) fn stop(&self) {
        self.running.set(false);
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.running.get() && self.generation.get() == generation
    }
}

impl ConsoleHandle {
    fn sync_ui(&self) {
        let events = self.console.events().drain();
        if !events.is_empty() {
            self.ui.borrow_mut().process_events(events);
        }
    }
}

/// Missing or malformed configuration falls back to the defaults.
pub(crate) fn load_config(raw: Option<&str>) -> ConsoleConfig {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => ConsoleConfig::default(),
        Some(json) => ConsoleConfig::from_json(json).unwrap_or_else(|e| {
            log::warn!("Ignoring console config ({}), using defaults", e);
            ConsoleConfig::default()
        }),
    }
}

/// Accepts the same spelling the values serialize to.
pub(crate) fn parse_value<T: DeserializeOwned>(what: &str, raw: &str) -> Result<T, JsValue> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_string()))
        .map_err(|_| JsValue::from_str(&format!("Unknown {}: {}", what, raw)))
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    JsValue::from_serde(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn js_err(e: ConsoleError) -> JsValue {
    JsValue::from_str(&e.to_string())
}
