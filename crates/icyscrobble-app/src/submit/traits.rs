//! Listen submitter trait
//!
//! Defines the interface every listen-tracking backend implements.

use crate::error::Result;

use super::Listen;

/// A destination for newly observed tracks
pub trait ListenSubmitter: Send {
    /// Display name for logs (e.g., "ListenBrainz")
    fn name(&self) -> &'static str;

    /// Submit a single listen. `Ok` means the service accepted it.
    fn submit(&self, listen: &Listen) -> Result<()>;
}

impl<S: ListenSubmitter + ?Sized> ListenSubmitter for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn submit(&self, listen: &Listen) -> Result<()> {
        (**self).submit(listen)
    }
}
