//! Now-playing normalization
//!
//! Pure parsing functions turning a raw ICY metadata block into an
//! artist/track pair.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::icy::{
    ARTIST_SEPARATOR, STATION_FALLBACK_TRACK, STREAM_TITLE_KEY, UNKNOWN_ARTIST,
};
use crate::stream::icy::{IcyHeaders, MetadataBlock};

/// Normalized now-playing record.
///
/// Both fields are always set; a title without an artist carries
/// [`UNKNOWN_ARTIST`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackInfo {
    pub artist: String,
    pub track: String,
}

impl TrackInfo {
    pub fn new(artist: impl Into<String>, track: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            track: track.into(),
        }
    }

    /// Split an ICY title into artist and track.
    ///
    /// Splits on the first ` - `: "Artist - Title" → artist="Artist", track="Title".
    /// Without a separator (or when either half is blank) the whole title is the
    /// track. Returns `None` for a blank title.
    pub fn from_icy_title(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        if let Some((artist, track)) = raw.split_once(ARTIST_SEPARATOR) {
            let (artist, track) = (artist.trim(), track.trim());
            if !artist.is_empty() && !track.is_empty() {
                return Some(Self::new(artist, track));
            }
        }

        Some(Self::new(UNKNOWN_ARTIST, raw))
    }
}

impl fmt::Display for TrackInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.artist, ARTIST_SEPARATOR, self.track)
    }
}

/// Turn a decoded metadata block into a track.
///
/// `None` covers both "nothing new this frame" (empty block) and metadata
/// without a usable `StreamTitle`; neither is an error.
pub fn normalize(block: &MetadataBlock, headers: &IcyHeaders) -> Option<TrackInfo> {
    if block.is_empty() {
        return None;
    }
    if headers.metaint.is_none() {
        return station_fallback(headers);
    }

    let title = parse_stream_title(block.as_str())?;
    TrackInfo::from_icy_title(&title)
}

/// Placeholder track for stations that announce a name but no metadata
pub fn station_fallback(headers: &IcyHeaders) -> Option<TrackInfo> {
    if headers.metaint.is_some() {
        return None;
    }
    headers
        .station_name
        .as_deref()
        .map(|name| TrackInfo::new(name, STATION_FALLBACK_TRACK))
}

/// Extract the `StreamTitle` value from ICY metadata text.
///
/// ICY metadata format: `StreamTitle='Artist - Song';StreamUrl='...';`, padded
/// with NUL bytes to a multiple of 16. A quoted value ends at the first `';`
/// so titles containing quotes survive; otherwise it ends at the first `;`.
pub fn parse_stream_title(metadata: &str) -> Option<String> {
    let metadata = metadata.trim_end_matches('\0');
    let start = metadata.find(STREAM_TITLE_KEY)? + STREAM_TITLE_KEY.len();
    let rest = &metadata[start..];

    let value = match rest.strip_prefix('\'') {
        Some(quoted) => match quoted.find("';") {
            Some(end) => &quoted[..end],
            None => until_semicolon(quoted),
        },
        None => until_semicolon(rest),
    };
    let value = value.strip_suffix('\'').unwrap_or(value).trim();

    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn until_semicolon(s: &str) -> &str {
    s.split(';').next().unwrap_or(s)
}
