//! Stream handling
//!
//! Opens ICY streams, decodes the interleaved metadata frames and
//! normalizes `StreamTitle` into [`TrackInfo`].

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::timeouts::STOP_CHECK_INTERVAL_MS;
use crate::error::Result;

pub mod icy;
pub mod metadata;

pub use icy::{IcyHeaders, MetadataBlock, StreamSession};
pub use metadata::{normalize, TrackInfo};

/// Read up to `attempts` metadata frames and return the first usable track.
///
/// Stations without a metadata interval get the station-name placeholder
/// straight away. `Ok(None)` means every frame was empty or carried no
/// `StreamTitle`. Frame errors end the scan; the session must not be reused.
pub fn scan_now_playing<R: Read>(
    session: &mut StreamSession<R>,
    attempts: usize,
) -> Result<Option<TrackInfo>> {
    if session.metaint().is_none() {
        return Ok(metadata::station_fallback(session.headers()));
    }

    for attempt in 1..=attempts {
        let block = session.next_block()?;
        if let Some(track) = normalize(&block, session.headers()) {
            debug!(attempt, %track, "now playing");
            return Ok(Some(track));
        }
    }

    debug!(attempts, "no StreamTitle found");
    Ok(None)
}

/// Sleep for `total`, checking `stop` every 250ms.
/// Returns true if the full duration elapsed, false if stopped early.
pub fn sleep_unless_stopped(total: Duration, stop: &AtomicBool) -> bool {
    let interval = Duration::from_millis(STOP_CHECK_INTERVAL_MS);
    let start = Instant::now();
    while start.elapsed() < total {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        let remaining = total.saturating_sub(start.elapsed());
        std::thread::sleep(remaining.min(interval));
    }
    !stop.load(Ordering::Relaxed)
}
