//! Submitter that only logs

use tracing::info;

use crate::error::Result;

use super::{Listen, ListenSubmitter};

/// Accepts every listen without sending it anywhere
#[derive(Debug, Default)]
pub struct DryRunSubmitter;

impl ListenSubmitter for DryRunSubmitter {
    fn name(&self) -> &'static str {
        "dry run"
    }

    fn submit(&self, listen: &Listen) -> Result<()> {
        info!(
            artist = %listen.track.artist,
            track = %listen.track.track,
            listened_at = listen.listened_at,
            "dry run, listen not submitted"
        );
        Ok(())
    }
}
