//! Media-extraction seam.

use crate::relay::RelaySink;
use anyhow::Result;
use async_trait::async_trait;

/// The slice of source media one round plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipWindow {
    pub start_secs: u64,
    /// `None` plays to the natural end; the session clips the round by
    /// wall clock either way.
    pub play_secs: Option<u64>,
}

/// The contract for the external tool that locates and transcodes remote
/// media into a raw byte stream.
///
/// `extract` must resolve the locator before returning: an unresolvable
/// locator is an `Err` with no byte written, never a silently empty
/// stream. After a successful return the implementation keeps feeding the
/// sink from its own task and finishes (or drops) it at end of media.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn extract(&self, locator: &str, window: ClipWindow, sink: RelaySink) -> Result<()>;
}
