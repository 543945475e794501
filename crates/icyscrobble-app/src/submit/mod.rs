//! Listen submission
//!
//! Defines the [`ListenSubmitter`] seam and its implementations.

use std::time::{SystemTime, UNIX_EPOCH};

use icyscrobble::stream::TrackInfo;

pub mod dry_run;
pub mod listenbrainz;
pub mod traits;

pub use dry_run::DryRunSubmitter;
pub use listenbrainz::ListenBrainzSubmitter;
pub use traits::ListenSubmitter;

/// A track together with the moment it was observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listen {
    pub track: TrackInfo,
    /// UNIX timestamp in seconds
    pub listened_at: i64,
}

impl Listen {
    pub fn new(track: TrackInfo, listened_at: i64) -> Self {
        Self { track, listened_at }
    }

    /// Stamp `track` with the current time
    pub fn now(track: TrackInfo) -> Self {
        let listened_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Self::new(track, listened_at)
    }
}
