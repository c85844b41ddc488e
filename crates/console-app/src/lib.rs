//! Conversation Console WASM entry point.
//!
//! This crate is the composition root (DI wiring layer).
//! It assembles the browser adapters, hands them to the console core and
//! exposes the operator actions to the host page through [`ConsoleHandle`].

mod app;

#[cfg(test)]
mod tests;

use wasm_bindgen::prelude::*;

pub use app::ConsoleHandle;

/// WASM entry point, runs once when the module is instantiated
#[wasm_bindgen(start)]
pub fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Conversation console WASM starting...");
}
