//! Test doubles for the collaborator seams.

use crate::{
    announce::Announcement,
    gateway::RoomGateway,
    media::{ClipWindow, MediaSource},
    relay::{RelaySink, RelayStream},
};
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashSet;
use std::sync::Mutex;

/// A gateway that records every announcement and accepts everything else.
#[derive(Default)]
pub(crate) struct RecordingGateway {
    announcements: Mutex<Vec<Announcement>>,
}

impl RecordingGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn announcements(&self) -> Vec<Announcement> {
        self.announcements.lock().unwrap().clone()
    }
}

#[async_trait]
impl RoomGateway for RecordingGateway {
    async fn announce(&self, _room: &str, message: Announcement) -> Result<()> {
        self.announcements.lock().unwrap().push(message);
        Ok(())
    }

    async fn join_voice(&self, _room: &str, _target: &str) -> Result<()> {
        Ok(())
    }

    async fn leave_voice(&self, _room: &str) -> Result<()> {
        Ok(())
    }

    async fn play(&self, _room: &str, stream: RelayStream) -> Result<()> {
        drop(stream);
        Ok(())
    }

    async fn stop_playback(&self, _room: &str) -> Result<()> {
        Ok(())
    }
}

/// A media source that serves a short canned clip, or fails for locators
/// listed in `fail_locators`.
#[derive(Default)]
pub(crate) struct StubMedia {
    pub(crate) fail_locators: HashSet<String>,
}

impl StubMedia {
    pub(crate) fn failing_for(locator: &str) -> Self {
        Self {
            fail_locators: HashSet::from([locator.to_string()]),
        }
    }
}

#[async_trait]
impl MediaSource for StubMedia {
    async fn extract(&self, locator: &str, _window: ClipWindow, sink: RelaySink) -> Result<()> {
        if self.fail_locators.contains(locator) {
            anyhow::bail!("cannot resolve media locator '{locator}'");
        }
        sink.write(Bytes::from_static(&[0u8; 16]));
        sink.finish();
        Ok(())
    }
}
