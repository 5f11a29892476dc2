//! The per-room quiz session actor.
//!
//! One tokio task owns all of a session's mutable state: the shuffled
//! entry list, the participant roster, skip votes, scores, and the round
//! gate. Commands arrive on an mpsc channel and the round timer is a
//! branch of the same `select!`, so every resolution path goes through a
//! single logical thread of control. The [`RoundGate`] generation is still
//! checked on every resolution attempt so a callback from a previous
//! round can never resolve the current one.

use crate::{
    announce::{Announcement, Reveal},
    config::Config,
    gateway::RoomGateway,
    media::{ClipWindow, MediaSource},
    relay::relay,
};
use blindtest_core::{
    answer::AnswerMatcher,
    pack::PackEntry,
    round::{classify, skip_consensus, Resolution, RoomMessage, RoundGate},
    score::{ScoreEntry, ScoreLedger},
};
use chrono::{DateTime, Utc};
use std::{collections::HashSet, sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, oneshot},
    time::{self, Instant},
};
use tracing::{debug, info, warn};

/// Commands routed to a session by the registry.
#[derive(Debug)]
pub(crate) enum SessionCommand {
    Join { user: String },
    Leave { user: String },
    Message { user: String, text: String },
    Stop { requester: String },
    End,
    Leaderboard { reply: oneshot::Sender<Vec<ScoreEntry>> },
}

/// Shared collaborators and tunables handed to every session.
#[derive(Clone)]
pub(crate) struct SessionDeps {
    pub gateway: Arc<dyn RoomGateway>,
    pub media: Arc<dyn MediaSource>,
    pub config: Arc<Config>,
}

#[derive(Debug)]
struct Participant {
    id: String,
    joined_at: DateTime<Utc>,
}

/// How one round (or the whole session) ended.
enum RoundEnd {
    Advance,
    Halt,
}

pub(crate) struct GameSession {
    room: String,
    voice_target: String,
    pack_name: String,
    moderator: String,
    entries: Vec<PackEntry>,
    round: usize,
    participants: Vec<Participant>,
    skip_votes: HashSet<String>,
    scores: ScoreLedger,
    gate: RoundGate,
    playback_live: bool,
    deps: SessionDeps,
    rx: mpsc::Receiver<SessionCommand>,
}

impl GameSession {
    pub(crate) fn new(
        room: String,
        voice_target: String,
        pack_name: String,
        moderator: String,
        entries: Vec<PackEntry>,
        deps: SessionDeps,
        rx: mpsc::Receiver<SessionCommand>,
    ) -> Self {
        let mut session = Self {
            room,
            voice_target,
            pack_name,
            moderator: moderator.clone(),
            entries,
            round: 0,
            participants: Vec::new(),
            skip_votes: HashSet::new(),
            scores: ScoreLedger::new(),
            gate: RoundGate::new(),
            playback_live: false,
            deps,
            rx,
        };
        // The moderator plays too.
        session.participants.push(Participant {
            id: moderator,
            joined_at: Utc::now(),
        });
        session
    }

    /// Runs the session to completion.
    pub(crate) async fn run(mut self) {
        if let Err(error) = self
            .deps
            .gateway
            .join_voice(&self.room, &self.voice_target)
            .await
        {
            warn!(?error, "could not join the voice target; session abandoned");
            return;
        }

        self.announce(Announcement::Rules {
            pack: self.pack_name.clone(),
            rounds: self.entries.len(),
            skip_keyword: self.deps.config.skip_keyword.clone(),
        })
        .await;

        while self.round < self.entries.len() {
            match self.play_round().await {
                RoundEnd::Advance => self.round += 1,
                RoundEnd::Halt => break,
            }
        }

        self.stop_playback().await;
        self.announce(Announcement::FinalLeaderboard(self.scores.rank()))
            .await;
        if let Err(error) = self.deps.gateway.leave_voice(&self.room).await {
            warn!(?error, "failed to leave the voice target");
        }
        info!(rounds_played = self.round, "quiz session ended");
    }

    /// Drives one round from `Preparing` to its resolution and the
    /// advance window that follows.
    async fn play_round(&mut self) -> RoundEnd {
        let entry = self.entries[self.round].clone();
        let generation = self.gate.arm();
        self.skip_votes.clear();
        let matcher = AnswerMatcher::new(&entry.title, &entry.alternates);
        debug!(round = self.round, generation, "round preparing");

        // Materialize playback. Media failures skip this round only; the
        // session itself survives (auto-skip, never fatal).
        let (sink, stream) = relay();
        let window = ClipWindow {
            start_secs: entry.start_secs,
            play_secs: entry.play_secs,
        };
        if let Err(error) = self.deps.media.extract(&entry.locator, window, sink).await {
            warn!(?error, locator = %entry.locator, "media extraction failed; skipping round");
            self.announce(Announcement::EntrySkippedOnError).await;
            return RoundEnd::Advance;
        }
        if let Err(error) = self.deps.gateway.play(&self.room, stream).await {
            warn!(?error, "playback start failed; skipping round");
            self.announce(Announcement::EntrySkippedOnError).await;
            return RoundEnd::Advance;
        }
        self.playback_live = true;
        self.gate.begin_playing(generation);
        debug!(round = self.round, "round playing");

        let clip = Duration::from_secs(entry.clip_secs(self.deps.config.max_round_secs));
        let timeout = time::sleep_until(Instant::now() + clip);
        tokio::pin!(timeout);

        let resolution = loop {
            tokio::select! {
                () = &mut timeout => {
                    if self.gate.try_resolve(generation) {
                        break Resolution::Timeout;
                    }
                }
                command = self.rx.recv() => match command {
                    None => return RoundEnd::Halt,
                    Some(SessionCommand::Join { user }) => self.add_participant(user).await,
                    Some(SessionCommand::Leave { user }) => {
                        self.remove_participant(&user).await;
                        // Fewer participants can tip an existing vote count
                        // over the threshold.
                        if self.consensus_reached() && self.gate.try_resolve(generation) {
                            break Resolution::Skipped;
                        }
                    }
                    Some(SessionCommand::Message { user, text }) => {
                        if !self.is_participant(&user) {
                            continue;
                        }
                        match classify(&text, &self.deps.config.skip_keyword) {
                            RoomMessage::SkipVote => {
                                self.skip_votes.insert(user);
                                if self.consensus_reached() && self.gate.try_resolve(generation) {
                                    break Resolution::Skipped;
                                }
                            }
                            RoomMessage::AnswerAttempt(guess) => {
                                if matcher.matches(&guess) && self.gate.try_resolve(generation) {
                                    break Resolution::Correct { winner: user };
                                }
                            }
                        }
                    }
                    Some(SessionCommand::Stop { requester }) => {
                        if self.handle_stop(&requester, generation).await {
                            return RoundEnd::Halt;
                        }
                    }
                    Some(SessionCommand::End) => {
                        self.gate.try_resolve(generation);
                        return RoundEnd::Halt;
                    }
                    Some(SessionCommand::Leaderboard { reply }) => {
                        let _ = reply.send(self.scores.rank());
                    }
                }
            }
        };

        self.finish_round(resolution, &entry).await
    }

    /// Applies a resolution's side effects and waits out the advance
    /// window before the next round starts.
    async fn finish_round(&mut self, resolution: Resolution, entry: &PackEntry) -> RoundEnd {
        info!(round = self.round, ?resolution, "round resolved");
        let reveal = Reveal {
            performer: entry.performer.clone(),
            title: entry.title.clone(),
        };
        let fast_forward = matches!(resolution, Resolution::Correct { .. });
        match resolution {
            Resolution::Correct { winner } => {
                self.scores.credit(&winner);
                self.announce(Announcement::Correct { winner, reveal }).await;
                // Playback keeps running; the room can vote to cut it short.
                self.announce(Announcement::FastForwardHint {
                    skip_keyword: self.deps.config.skip_keyword.clone(),
                })
                .await;
            }
            Resolution::Skipped => {
                self.stop_playback().await;
                self.announce(Announcement::Skipped {
                    reveal: Some(reveal),
                })
                .await;
            }
            Resolution::Timeout => {
                self.stop_playback().await;
                self.announce(Announcement::Timeout { reveal }).await;
            }
        }

        let end = self.advance_window(fast_forward).await;
        // Round n's pipeline is fully torn down before round n+1 starts.
        self.stop_playback().await;
        end
    }

    /// The fixed short delay between a resolution and the next round.
    ///
    /// Roster commands keep working; after a correct answer a fresh skip
    /// consensus cuts the window short.
    async fn advance_window(&mut self, fast_forward: bool) -> RoundEnd {
        self.skip_votes.clear();
        let delay = time::sleep_until(Instant::now() + self.deps.config.advance_delay());
        tokio::pin!(delay);

        loop {
            tokio::select! {
                () = &mut delay => return RoundEnd::Advance,
                command = self.rx.recv() => match command {
                    None => return RoundEnd::Halt,
                    Some(SessionCommand::Join { user }) => self.add_participant(user).await,
                    Some(SessionCommand::Leave { user }) => self.remove_participant(&user).await,
                    Some(SessionCommand::Message { user, text }) => {
                        if fast_forward
                            && self.is_participant(&user)
                            && classify(&text, &self.deps.config.skip_keyword)
                                == RoomMessage::SkipVote
                        {
                            self.skip_votes.insert(user);
                            if self.consensus_reached() {
                                self.announce(Announcement::Skipped { reveal: None }).await;
                                return RoundEnd::Advance;
                            }
                        }
                        // Guesses between rounds are not evaluated.
                    }
                    Some(SessionCommand::Stop { requester }) => {
                        if requester == self.moderator {
                            self.announce(Announcement::SessionStopped).await;
                            return RoundEnd::Halt;
                        }
                        debug!(%requester, "ignoring stop request from a non-moderator");
                    }
                    Some(SessionCommand::End) => return RoundEnd::Halt,
                    Some(SessionCommand::Leaderboard { reply }) => {
                        let _ = reply.send(self.scores.rank());
                    }
                }
            }
        }
    }

    /// Moderator-only stop. Returns `true` when the session must halt.
    async fn handle_stop(&mut self, requester: &str, generation: u64) -> bool {
        if requester != self.moderator {
            debug!(%requester, "ignoring stop request from a non-moderator");
            return false;
        }
        self.gate.try_resolve(generation);
        self.announce(Announcement::SessionStopped).await;
        true
    }

    async fn add_participant(&mut self, user: String) {
        if self.is_participant(&user) {
            return;
        }
        self.participants.push(Participant {
            id: user.clone(),
            joined_at: Utc::now(),
        });
        self.announce(Announcement::ParticipantJoined(user)).await;
    }

    async fn remove_participant(&mut self, user: &str) {
        let Some(index) = self.participants.iter().position(|p| p.id == user) else {
            return;
        };
        let participant = self.participants.remove(index);
        self.skip_votes.remove(user);
        debug!(user = %participant.id, joined_at = %participant.joined_at, "participant left");
        // Accumulated score stays on the ledger.
        self.announce(Announcement::ParticipantLeft(participant.id))
            .await;
    }

    fn is_participant(&self, user: &str) -> bool {
        self.participants.iter().any(|p| p.id == user)
    }

    fn consensus_reached(&self) -> bool {
        skip_consensus(self.skip_votes.len(), self.participants.len())
    }

    async fn announce(&self, message: Announcement) {
        if let Err(error) = self.deps.gateway.announce(&self.room, message).await {
            warn!(?error, "failed to deliver a room announcement");
        }
    }

    async fn stop_playback(&mut self) {
        if !self.playback_live {
            return;
        }
        self.playback_live = false;
        if let Err(error) = self.deps.gateway.stop_playback(&self.room).await {
            warn!(?error, "failed to stop playback");
        }
    }
}
