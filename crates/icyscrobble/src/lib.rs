//! icyscrobble — ICY now-playing engine
//!
//! Opens Icecast/Shoutcast streams, decodes in-band ICY metadata frames,
//! normalizes `StreamTitle` into artist/track, and decides which tracks
//! are new enough to report.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::time::Duration;
//! use icyscrobble::stream::{scan_now_playing, StreamSession};
//! use icyscrobble::tracker::ChangeDetector;
//!
//! # fn main() -> icyscrobble::error::Result<()> {
//! let mut session = StreamSession::open("http://example.com/stream", Duration::from_secs(15))?;
//! let mut detector = ChangeDetector::new();
//! if let Some(track) = scan_now_playing(&mut session, 10)? {
//!     detector.report_with(&track, |_| true);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod stream;
pub mod tracker;
