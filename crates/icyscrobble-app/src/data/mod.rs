//! Data persistence
//!
//! JSON storage helpers and user settings.

pub mod settings;
pub mod storage;

pub use settings::Settings;
