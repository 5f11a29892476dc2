//! Chat/voice platform seam.

use crate::{announce::Announcement, relay::RelayStream};
use anyhow::Result;
use async_trait::async_trait;

/// The contract the chat/voice platform adapter implements for one bot.
///
/// The platform side also feeds room messages into
/// [`SessionRegistry::submit_message`](crate::session::SessionRegistry::submit_message)
/// and calls [`SessionRegistry::end`](crate::session::SessionRegistry::end)
/// when its presence tracking sees the bot left alone in the voice target.
#[async_trait]
pub trait RoomGateway: Send + Sync {
    /// Sends a text announcement to the room's text channel.
    async fn announce(&self, room: &str, message: Announcement) -> Result<()>;

    /// Connects the bot to the room's voice target.
    async fn join_voice(&self, room: &str, target: &str) -> Result<()>;

    /// Disconnects the bot from the room's voice target.
    async fn leave_voice(&self, room: &str) -> Result<()>;

    /// Starts playing the given byte stream in the room's voice target.
    ///
    /// The gateway owns the stream from here on; it pulls at playback pace
    /// and stops at end-of-stream or on [`stop_playback`](Self::stop_playback).
    async fn play(&self, room: &str, stream: RelayStream) -> Result<()>;

    /// Tears down the room's current playback pipeline, if any.
    async fn stop_playback(&self, room: &str) -> Result<()>;
}
