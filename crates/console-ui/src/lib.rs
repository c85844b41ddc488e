//! Presentation-state projection of the console event stream. Rendering
//! belongs to the host page; this crate only decides what it should show.

pub mod state;

#[cfg(test)]
mod tests;

pub use state::UiState;
