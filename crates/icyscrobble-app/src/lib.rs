//! icyscrobble app services
//!
//! Settings persistence, the ListenBrainz submitter and the polling
//! monitor. Depends on the `icyscrobble` engine crate.

pub mod config;
pub mod data;
pub mod error;
pub mod monitor;
pub mod network;
pub mod submit;
