//! Shared HTTP client wrapper
//!
//! Thin wrapper around `reqwest::blocking::Client` that centralizes
//! USER_AGENT and timeout configuration.

use std::time::Duration;

use serde::Serialize;

use crate::config::network::USER_AGENT;
use crate::error::Result;

/// Shared HTTP client with standard configuration
pub struct HttpClient {
    inner: reqwest::blocking::Client,
}

impl HttpClient {
    /// Create a client whose connect and read operations are bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let inner = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self { inner })
    }

    /// POST a JSON body with an `Authorization` header.
    ///
    /// The response is returned whatever its status; callers decide what
    /// counts as success.
    pub fn post_json<T: Serialize>(
        &self,
        url: &str,
        authorization: &str,
        body: &T,
    ) -> Result<reqwest::blocking::Response> {
        let resp = self
            .inner
            .post(url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(body)
            .send()?;
        Ok(resp)
    }
}
