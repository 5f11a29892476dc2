//! The room-keyed session registry.
//!
//! The registry is an explicit, injected service that exclusively owns
//! session lifetimes: `start` is the only way a session comes to exist and
//! a finished session task prunes its own map entry. At most one live
//! session per room, ever.

use crate::{
    catalog::Catalog,
    config::Config,
    gateway::RoomGateway,
    media::MediaSource,
    session::game::{GameSession, SessionCommand, SessionDeps},
};
use blindtest_core::score::ScoreEntry;
use std::{
    collections::HashMap,
    sync::{Arc, Weak},
};
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{Instrument, info, warn};
use uuid::Uuid;

/// Why a start command was rejected. Setup errors are synchronous and
/// mutate nothing.
#[derive(Debug, thiserror::Error)]
pub enum StartError {
    #[error("a quiz session is already running in this room")]
    AlreadyActive,
    #[error("pack '{0}' was not found in the catalog")]
    PackNotFound(String),
    #[error("pack '{0}' has no playable entries")]
    EmptyPack(String),
    #[error("catalog lookup failed: {0:#}")]
    Catalog(anyhow::Error),
}

struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
}

/// One registry per bot process, shared with every command handler.
pub struct SessionRegistry {
    rooms: Mutex<HashMap<String, SessionHandle>>,
    gateway: Arc<dyn RoomGateway>,
    media: Arc<dyn MediaSource>,
    catalog: Arc<dyn Catalog>,
    config: Arc<Config>,
}

impl SessionRegistry {
    pub fn new(
        gateway: Arc<dyn RoomGateway>,
        media: Arc<dyn MediaSource>,
        catalog: Arc<dyn Catalog>,
        config: Config,
    ) -> Arc<Self> {
        Arc::new(Self {
            rooms: Mutex::new(HashMap::new()),
            gateway,
            media,
            catalog,
            config: Arc::new(config),
        })
    }

    /// Starts a session in `room` against the named pack.
    ///
    /// The moderator is registered as the first participant. The pack's
    /// entries are copied and shuffled once; the catalog is not consulted
    /// again for the lifetime of the session.
    pub async fn start(
        self: &Arc<Self>,
        room: &str,
        pack_name: &str,
        moderator: &str,
        voice_target: &str,
    ) -> Result<(), StartError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(room) {
            return Err(StartError::AlreadyActive);
        }

        let pack = self
            .catalog
            .get_pack(pack_name)
            .await
            .map_err(StartError::Catalog)?
            .ok_or_else(|| StartError::PackNotFound(pack_name.to_string()))?;
        if pack.entries.is_empty() {
            return Err(StartError::EmptyPack(pack_name.to_string()));
        }
        // Play-count bookkeeping must never block a session from starting.
        if let Err(error) = self.catalog.increment_play_count(pack.id).await {
            warn!(?error, pack = %pack.name, "failed to bump the pack play count");
        }

        let entries = pack.shuffled_entries();
        let (tx, rx) = mpsc::channel(64);
        let session = GameSession::new(
            room.to_string(),
            voice_target.to_string(),
            pack.name.clone(),
            moderator.to_string(),
            entries,
            SessionDeps {
                gateway: self.gateway.clone(),
                media: self.media.clone(),
                config: self.config.clone(),
            },
            rx,
        );

        let session_id = Uuid::new_v4();
        info!(%room, pack = %pack.name, %moderator, %session_id, "starting quiz session");
        // Insert while still holding the lock: the session task prunes its
        // own entry on exit and must find it there.
        rooms.insert(room.to_string(), SessionHandle { tx });
        drop(rooms);

        let registry: Weak<Self> = Arc::downgrade(self);
        let room_key = room.to_string();
        let span = tracing::info_span!("quiz_session", room = %room, %session_id);
        tokio::spawn(
            async move {
                session.run().await;
                if let Some(registry) = registry.upgrade() {
                    registry.rooms.lock().await.remove(&room_key);
                }
            }
            .instrument(span),
        );
        Ok(())
    }

    /// Stops the room's session. Only honored for the moderator.
    pub async fn stop(&self, room: &str, requester: &str) {
        self.send(
            room,
            SessionCommand::Stop {
                requester: requester.to_string(),
            },
        )
        .await;
    }

    pub async fn join(&self, room: &str, user: &str) {
        self.send(
            room,
            SessionCommand::Join {
                user: user.to_string(),
            },
        )
        .await;
    }

    pub async fn leave(&self, room: &str, user: &str) {
        self.send(
            room,
            SessionCommand::Leave {
                user: user.to_string(),
            },
        )
        .await;
    }

    /// Routes a room message to the session. A no-op when the room has no
    /// session; the session itself ignores non-participants.
    pub async fn submit_message(&self, room: &str, user: &str, text: &str) {
        self.send(
            room,
            SessionCommand::Message {
                user: user.to_string(),
                text: text.to_string(),
            },
        )
        .await;
    }

    /// Ends the room's session unconditionally. Idempotent: ending a room
    /// with no session is a no-op, so external cleanup (e.g. a presence
    /// watcher seeing the bot alone in voice) can call it freely.
    pub async fn end(&self, room: &str) {
        self.send(room, SessionCommand::End).await;
    }

    /// Whether the room currently has a live session.
    pub async fn is_active(&self, room: &str) -> bool {
        self.rooms.lock().await.contains_key(room)
    }

    /// A snapshot of the room's current leaderboard, if a session is live.
    pub async fn leaderboard(&self, room: &str) -> Option<Vec<ScoreEntry>> {
        let tx = self.sender(room).await?;
        let (reply, rx) = oneshot::channel();
        tx.send(SessionCommand::Leaderboard { reply }).await.ok()?;
        rx.await.ok()
    }

    async fn sender(&self, room: &str) -> Option<mpsc::Sender<SessionCommand>> {
        self.rooms.lock().await.get(room).map(|h| h.tx.clone())
    }

    async fn send(&self, room: &str, command: SessionCommand) {
        if let Some(tx) = self.sender(room).await {
            // A closed channel means the session just ended; nothing to do.
            let _ = tx.send(command).await;
        }
    }
}
