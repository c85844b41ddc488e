//! Conversation console core: aggregation, linking, querying, pagination
//! and deletion. No platform dependencies; everything outside the process
//! is reached through the traits in [`ports`].

pub mod ports;
pub mod event_bus;
pub mod aggregator;
pub mod linker;
pub mod query;
pub mod pagination;
pub mod view_state;
pub mod net;
pub mod deletion;
pub mod analysis;
pub mod scheduler;
pub mod console;


pub use console::{Console, ConsoleSnapshot, ConsoleState, DeleteOutcome, Ports};
pub use event_bus::EventBus;
