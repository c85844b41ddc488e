pub mod memory;
pub mod local;
pub mod auto;

pub use memory::MemoryPreferences;
pub use local::LocalStoragePreferences;
pub use auto::auto_detect_preferences;
