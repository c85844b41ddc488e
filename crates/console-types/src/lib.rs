pub mod message;
pub mod session;
pub mod profile;
pub mod view;
pub mod event;
pub mod config;
pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConsoleError;
pub type Result<T> = std::result::Result<T, ConsoleError>;
