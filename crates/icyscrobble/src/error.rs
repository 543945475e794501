//! Error types for icyscrobble
//!
//! Centralized error handling using thiserror.

use std::fmt;
use std::io;

use thiserror::Error;

/// Position inside an ICY frame where a read came up short
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStage {
    /// The `metaint` bytes of audio preceding the length byte
    Audio,
    /// The single length-prefix byte
    LengthByte,
    /// The metadata block itself
    Metadata,
}

impl fmt::Display for FrameStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameStage::Audio => "audio payload",
            FrameStage::LengthByte => "metadata length byte",
            FrameStage::Metadata => "metadata block",
        };
        f.write_str(name)
    }
}

/// Main error type for the ICY engine
#[derive(Error, Debug)]
pub enum IcyError {
    #[error("{}", friendly_network_error(.0))]
    Network(#[from] reqwest::Error),

    #[error("Stream does not advertise ICY metadata")]
    NoMetadata,

    #[error("Stream ended while reading {stage}")]
    StreamEnded {
        stage: FrameStage,
        #[source]
        source: io::Error,
    },
}

impl IcyError {
    /// True when the session must be dropped and reopened
    pub fn ends_session(&self) -> bool {
        matches!(self, IcyError::Network(_) | IcyError::StreamEnded { .. })
    }
}

/// Result type alias for icyscrobble
pub type Result<T> = std::result::Result<T, IcyError>;

fn friendly_network_error(e: &reqwest::Error) -> String {
    if e.is_builder() {
        if let Some(url) = e.url() {
            return format!("Invalid URL: {url}");
        }
        return "Invalid URL".to_string();
    }
    if e.is_connect() {
        if let Some(url) = e.url() {
            return format!("Could not connect to {}", url.host_str().unwrap_or("server"));
        }
        return "Could not connect to server".to_string();
    }
    if e.is_timeout() {
        return "Connection timed out".to_string();
    }
    if let Some(status) = e.status() {
        return format!("Server answered HTTP {status}");
    }
    format!("Network error: {e}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_ended_names_stage() {
        let err = IcyError::StreamEnded {
            stage: FrameStage::LengthByte,
            source: io::Error::from(io::ErrorKind::UnexpectedEof),
        };
        assert_eq!(err.to_string(), "Stream ended while reading metadata length byte");
    }

    #[test]
    fn stream_ended_keeps_source() {
        use std::error::Error as _;
        let err = IcyError::StreamEnded {
            stage: FrameStage::Audio,
            source: io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"),
        };
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("reset by peer"));
    }

    #[test]
    fn no_metadata_keeps_session() {
        assert!(!IcyError::NoMetadata.ends_session());
    }

    #[test]
    fn stream_ended_ends_session() {
        let err = IcyError::StreamEnded {
            stage: FrameStage::Metadata,
            source: io::Error::from(io::ErrorKind::UnexpectedEof),
        };
        assert!(err.ends_session());
    }

    #[test]
    fn builder_error_is_reported_as_invalid_url() {
        let err = reqwest::blocking::Client::new()
            .get("not a url")
            .send()
            .unwrap_err();
        let msg = IcyError::from(err).to_string();
        assert!(msg.starts_with("Invalid URL"), "got: {msg}");
    }
}
