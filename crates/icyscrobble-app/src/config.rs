//! Configuration constants for icyscrobble app services

/// Application metadata
pub mod app {
    /// Application name (used for config directory, etc.)
    pub const NAME: &str = "icyscrobble";

    /// Version reported to the listen service
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Network-related configuration
pub mod network {
    /// User agent for API requests
    pub const USER_AGENT: &str = concat!("icyscrobble/", env!("CARGO_PKG_VERSION"));
}

/// ListenBrainz configuration
pub mod listenbrainz {
    /// Default API root
    pub const API_URL: &str = "https://api.listenbrainz.org";

    /// Listen submission endpoint, relative to the API root
    pub const SUBMIT_PATH: &str = "/1/submit-listens";

    /// Environment variable holding the user token
    pub const TOKEN_ENV: &str = "LISTENBRAINZ_TOKEN";
}
