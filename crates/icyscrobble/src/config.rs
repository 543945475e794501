//! Configuration constants for the icyscrobble engine

/// Network-related configuration
pub mod network {
    /// User agent for stream requests.
    ///
    /// Some Shoutcast servers refuse clients that do not look like a browser,
    /// so the generic `Mozilla/5.0` token comes first.
    pub const USER_AGENT: &str =
        concat!("Mozilla/5.0 (compatible; icyscrobble/", env!("CARGO_PKG_VERSION"), ")");

    /// Request header asking the server to interleave metadata
    pub const ICY_METADATA_HEADER: &str = "Icy-MetaData";
}

/// ICY protocol constants
pub mod icy {
    /// Metadata block length = length byte * this factor
    pub const BLOCK_LENGTH_FACTOR: usize = 16;

    /// Key preceding the now-playing value inside a metadata block
    pub const STREAM_TITLE_KEY: &str = "StreamTitle=";

    /// Separator between artist and track in `StreamTitle`
    pub const ARTIST_SEPARATOR: &str = " - ";

    /// Artist reported when `StreamTitle` carries no separator
    pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

    /// Track reported for stations that only advertise their name
    pub const STATION_FALLBACK_TRACK: &str = "Current Track";
}

/// Timeout configuration
pub mod timeouts {
    /// Connect and per-read timeout for stream requests in seconds
    pub const STREAM_TIMEOUT_SECS: u64 = 15;

    /// Timeout for a single listen submission in seconds
    pub const SUBMIT_TIMEOUT_SECS: u64 = 10;

    /// Granularity of stop-flag checks while sleeping, in milliseconds
    pub const STOP_CHECK_INTERVAL_MS: u64 = 250;
}

/// Polling configuration
pub mod polling {
    /// Idle delay between two poll cycles in seconds
    pub const POLL_INTERVAL_SECS: u64 = 30;

    /// Metadata frames read on a fresh session before giving up on a title
    pub const SCAN_ATTEMPTS: usize = 10;
}
