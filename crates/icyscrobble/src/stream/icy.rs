//! ICY stream session
//!
//! Negotiates an Icecast/Shoutcast connection with in-band metadata
//! enabled and decodes the metadata frames interleaved with the audio.

use std::fmt;
use std::io::{self, Read};
use std::time::Duration;

use reqwest::header::HeaderMap;
use tracing::{debug, trace};

use crate::config::icy::BLOCK_LENGTH_FACTOR;
use crate::config::network::{ICY_METADATA_HEADER, USER_AGENT};
use crate::error::{FrameStage, IcyError, Result};

/// Headers parsed from an ICY stream response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IcyHeaders {
    /// Audio bytes between two metadata frames (`icy-metaint`)
    pub metaint: Option<usize>,
    pub station_name: Option<String>,
    pub content_type: Option<String>,
    pub bitrate: Option<u32>,
}

impl IcyHeaders {
    /// Parse the ICY-related headers of a response.
    ///
    /// A missing, non-numeric or zero `icy-metaint` means the stream carries
    /// no in-band metadata.
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        Self {
            metaint: header_text(headers, "icy-metaint")
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|&n| n > 0),
            station_name: header_text(headers, "icy-name").map(str::to_string),
            content_type: header_text(headers, "content-type").map(str::to_string),
            bitrate: header_text(headers, "icy-br").and_then(|v| v.parse::<u32>().ok()),
        }
    }

    /// True if the session can produce anything at all: frames or a station name
    pub fn is_usable(&self) -> bool {
        self.metaint.is_some() || self.station_name.is_some()
    }
}

/// Raw text of one ICY metadata frame.
///
/// Empty means the server repeated nothing since the previous frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataBlock(String);

impl MetadataBlock {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MetadataBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One open connection to an ICY stream.
///
/// Generic over the byte cursor so frames can be decoded from any `Read`.
/// After any error from [`next_block`](Self::next_block) the cursor position
/// inside the frame is unknown; drop the session and open a new one.
pub struct StreamSession<R> {
    reader: R,
    headers: IcyHeaders,
    frames_read: u64,
}

impl StreamSession<reqwest::blocking::Response> {
    /// Connect to `url` asking for in-band metadata.
    ///
    /// `timeout` bounds the connection and every subsequent body read.
    pub fn open(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        let response = client
            .get(url)
            .header(ICY_METADATA_HEADER, "1")
            .send()?
            .error_for_status()?;

        let headers = IcyHeaders::from_header_map(response.headers());
        debug!(
            url,
            metaint = ?headers.metaint,
            station = ?headers.station_name,
            content_type = ?headers.content_type,
            bitrate = ?headers.bitrate,
            "stream opened"
        );

        if !headers.is_usable() {
            return Err(IcyError::NoMetadata);
        }

        Ok(Self::from_parts(headers, response))
    }
}

impl<R: Read> StreamSession<R> {
    /// Build a session from already-negotiated headers and a body cursor
    pub fn from_parts(headers: IcyHeaders, reader: R) -> Self {
        Self {
            reader,
            headers,
            frames_read: 0,
        }
    }

    pub fn headers(&self) -> &IcyHeaders {
        &self.headers
    }

    pub fn metaint(&self) -> Option<usize> {
        self.headers.metaint
    }

    pub fn station_name(&self) -> Option<&str> {
        self.headers.station_name.as_deref()
    }

    /// Number of metadata frames decoded on this session
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Skip one audio window and decode the metadata frame that follows it.
    ///
    /// A zero length byte yields an empty block. Any short read surfaces
    /// [`IcyError::StreamEnded`]; truncated data is never returned.
    pub fn next_block(&mut self) -> Result<MetadataBlock> {
        let metaint = self.headers.metaint.ok_or(IcyError::NoMetadata)?;

        self.skip_audio(metaint)?;

        let mut len_byte = [0u8; 1];
        read_frame_part(&mut self.reader, &mut len_byte, FrameStage::LengthByte)?;

        let meta_len = len_byte[0] as usize * BLOCK_LENGTH_FACTOR;
        self.frames_read += 1;
        if meta_len == 0 {
            trace!(frame = self.frames_read, "empty metadata block");
            return Ok(MetadataBlock::empty());
        }

        let mut meta_buf = vec![0u8; meta_len];
        read_frame_part(&mut self.reader, &mut meta_buf, FrameStage::Metadata)?;

        let block = MetadataBlock::new(String::from_utf8_lossy(&meta_buf));
        debug!(
            frame = self.frames_read,
            len = meta_len,
            block = %block.as_str().trim_end_matches('\0'),
            "metadata block"
        );
        Ok(block)
    }

    fn skip_audio(&mut self, count: usize) -> Result<()> {
        let wanted = count as u64;
        let skipped = io::copy(&mut (&mut self.reader).take(wanted), &mut io::sink())
            .map_err(|source| IcyError::StreamEnded {
                stage: FrameStage::Audio,
                source,
            })?;

        if skipped < wanted {
            return Err(IcyError::StreamEnded {
                stage: FrameStage::Audio,
                source: io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("got {skipped} of {wanted} audio bytes"),
                ),
            });
        }
        Ok(())
    }
}

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn read_frame_part<R: Read>(reader: &mut R, buf: &mut [u8], stage: FrameStage) -> Result<()> {
    reader
        .read_exact(buf)
        .map_err(|source| IcyError::StreamEnded { stage, source })
}
