//! ListenBrainz submitter
//!
//! Implementation of `ListenSubmitter` for the ListenBrainz
//! `submit-listens` API (<https://listenbrainz.readthedocs.io/>).

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::config::app::{NAME, VERSION};
use crate::config::listenbrainz::SUBMIT_PATH;
use crate::error::{AppError, Result};
use crate::network::HttpClient;

use super::traits::ListenSubmitter;
use super::Listen;

// =============================================================================
// Request body types (serde)
// =============================================================================

#[derive(Debug, Serialize)]
struct LbSubmission<'a> {
    listen_type: &'static str,
    payload: [LbListen<'a>; 1],
}

#[derive(Debug, Serialize)]
struct LbListen<'a> {
    listened_at: i64,
    track_metadata: LbTrackMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct LbTrackMetadata<'a> {
    additional_info: LbAdditionalInfo,
    artist_name: &'a str,
    track_name: &'a str,
}

#[derive(Debug, Serialize)]
struct LbAdditionalInfo {
    submission_client: &'static str,
    submission_client_version: &'static str,
}

impl<'a> From<&'a Listen> for LbSubmission<'a> {
    fn from(listen: &'a Listen) -> Self {
        LbSubmission {
            listen_type: "single",
            payload: [LbListen {
                listened_at: listen.listened_at,
                track_metadata: LbTrackMetadata {
                    additional_info: LbAdditionalInfo {
                        submission_client: NAME,
                        submission_client_version: VERSION,
                    },
                    artist_name: &listen.track.artist,
                    track_name: &listen.track.track,
                },
            }],
        }
    }
}

// =============================================================================
// ListenBrainzSubmitter
// =============================================================================

/// Submits single listens to a ListenBrainz-compatible server
pub struct ListenBrainzSubmitter {
    client: HttpClient,
    endpoint: String,
    authorization: String,
}

impl ListenBrainzSubmitter {
    /// Create a submitter for `api_url` authenticating with `token`
    pub fn new(api_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::Config("ListenBrainz token is empty".to_string()));
        }

        Ok(Self {
            client: HttpClient::new(timeout)?,
            endpoint: format!("{}{}", api_url.trim_end_matches('/'), SUBMIT_PATH),
            authorization: format!("Token {token}"),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ListenSubmitter for ListenBrainzSubmitter {
    fn name(&self) -> &'static str {
        "ListenBrainz"
    }

    fn submit(&self, listen: &Listen) -> Result<()> {
        let body = LbSubmission::from(listen);
        debug!(endpoint = %self.endpoint, payload = ?body, "submitting listen");

        let resp = self
            .client
            .post_json(&self.endpoint, &self.authorization, &body)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().unwrap_or_default();
        Err(AppError::Submission {
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }
}
