use crate::libgame::config::GameConfig;
use crate::libgame::display::{Camera, Cue, Display};
use crate::libgame::gesture::{classify, Landmark, Move};
use crate::libgame::outcome::{resolve, Opponent, Outcome, Scoreboard};
use crate::libgame::round::{Phase, Round, RoundEvent};
use crate::libgame::stability::Stability;
use crate::libpeer::link::{LinkEvent, PeerLink};
use crate::libpeer::payload::Payload;
use crate::libpeer::relay::PeerRelay;
use log::{debug, info};
use serde_json::Value;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub local: Move,
    pub opponent: Move,
    pub outcome: Outcome,
    /// Scores after this round was recorded.
    pub scores: Scoreboard,
}

/// Hooks run on round transitions.
pub trait RoundObserver {
    fn locked(&mut self, _local: Move) {}
    fn resolved(&mut self, _resolution: &Resolution) {}
}

/// One player's game: all mutable state between frames lives here.
pub struct Session {
    stability: Stability,
    round: Round,
    scores: Scoreboard,
    display: Display,
    link: PeerLink,
    opponent: Box<dyn Opponent>,
    observers: Vec<Box<dyn RoundObserver>>,
    /// Peer move received ahead of the local lock, with its arrival time.
    remote_move: Option<(Move, Instant)>,
    cues: Vec<Cue>,
}

impl Session {
    /// A session whose opponent is the peer behind `link` when it is open,
    /// and `opponent` otherwise.
    pub fn new(config: GameConfig, link: PeerLink, opponent: Box<dyn Opponent>) -> Session {
        let mut session = Session {
            stability: Stability::new(config.stable_frames),
            round: Round::new(&config),
            scores: Scoreboard::default(),
            display: Display::default(),
            link: link.clone(),
            opponent,
            observers: Vec::new(),
            remote_move: None,
            cues: Vec::new(),
        };
        session.observe(Box::new(PeerRelay::new(link)));
        session
    }

    pub fn solo(config: GameConfig, opponent: Box<dyn Opponent>) -> Session {
        Session::new(config, PeerLink::detached(), opponent)
    }

    pub fn observe(&mut self, observer: Box<dyn RoundObserver>) {
        self.observers.push(observer);
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn scores(&self) -> Scoreboard {
        self.scores
    }

    pub fn phase(&self) -> &Phase {
        self.round.phase()
    }

    pub fn stability(&self) -> &Stability {
        &self.stability
    }

    pub fn link(&self) -> &PeerLink {
        &self.link
    }

    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    /// Handles one tracker result. `None` means no hand was detected.
    pub fn on_frame(&mut self, landmarks: Option<&[Landmark]>, now: Instant) {
        self.advance(now);

        let gesture = classify(landmarks);
        self.display.detected = gesture;

        if let Some(mv) = self.stability.observe(gesture, self.round.locked()) {
            debug!("committed {}", mv);
            if let Some(event) = self.round.commit(mv, now) {
                self.apply(event, now);
            }
        }
    }

    /// Runs every round timer due at `now`.
    pub fn advance(&mut self, now: Instant) {
        for event in self.round.advance(now) {
            self.apply(event, now);
        }
    }

    fn apply(&mut self, event: RoundEvent, now: Instant) {
        match event {
            RoundEvent::Started(n) => self.display.countdown = Some(n),
            RoundEvent::Tick(n) => {
                self.display.countdown = Some(n);
                self.cues.push(Cue::Tick);
            }
            RoundEvent::Locked(local) => self.lock(local, now),
            RoundEvent::Reset => {
                debug!("round reset");
                self.clear_round();
            }
        }
    }

    fn lock(&mut self, local: Move, now: Instant) {
        info!("locked {}", local);
        self.display.your_move = Some(local);
        for observer in self.observers.iter_mut() {
            observer.locked(local);
        }

        let opponent = if self.link.is_open() {
            self.buffered_move(now)
        } else {
            Some(self.opponent.pick())
        };

        match opponent {
            Some(opponent) => self.finish(local, opponent),
            None => debug!("waiting for peer move"),
        }
    }

    /// The buffered peer move, unless the peer's round it came from has
    /// already been reset.
    fn buffered_move(&mut self, now: Instant) -> Option<Move> {
        let (mv, at) = self.remote_move.take()?;
        if now.saturating_duration_since(at) > self.round.reset_after() {
            debug!("dropping stale peer move {}", mv);
            self.display.opponent_move = None;
            return None;
        }
        Some(mv)
    }

    fn finish(&mut self, local: Move, opponent: Move) {
        let outcome = resolve(local, opponent);
        if !self.round.resolve(opponent, outcome) {
            return;
        }
        info!("{} vs {}: {}", local, opponent, outcome);

        self.scores.record(outcome);
        self.display.opponent_move = Some(opponent);
        self.display.result = Some(outcome);
        self.sync_scores();
        self.cues.push(outcome.cue());

        let resolution = Resolution {
            local,
            opponent,
            outcome,
            scores: self.scores,
        };
        for observer in self.observers.iter_mut() {
            observer.resolved(&resolution);
        }
    }

    fn clear_round(&mut self) {
        self.stability.reset();
        self.display.clear_round();
        self.remote_move = None;
    }

    fn sync_scores(&mut self) {
        self.display.player_score = self.scores.player;
        self.display.opponent_score = self.scores.opponent;
    }

    /// Applies a payload received from the peer at `now`. Malformed payloads
    /// are dropped.
    pub fn receive(&mut self, value: &Value, now: Instant) {
        let payload = match Payload::parse(value) {
            Some(payload) => payload,
            None => {
                debug!("ignoring malformed payload {}", value);
                return;
            }
        };

        let phase = *self.round.phase();
        match payload {
            Payload::Gesture { gesture } => match phase {
                Phase::Locked { local } => self.finish(local, gesture),
                Phase::Resolved { .. } => debug!("round already resolved, ignoring {}", gesture),
                Phase::Idle | Phase::Countdown { .. } => {
                    self.remote_move = Some((gesture, now));
                    self.display.opponent_move = Some(gesture);
                }
            },
            Payload::Score { score } => {
                self.scores.report_opponent(score);
                self.sync_scores();
            }
        }
    }

    pub fn link_event(&mut self, event: LinkEvent) {
        self.link.apply(event);
        self.sync_link();

        if self.link.is_open() {
            return;
        }
        if self.remote_move.take().is_some() {
            self.display.opponent_move = None;
        }
        if let Phase::Locked { local } = *self.round.phase() {
            info!("peer gone before answering, playing the computer");
            let opponent = self.opponent.pick();
            self.finish(local, opponent);
        }
    }

    /// Requests a link to another session through the broker.
    pub fn connect(&mut self, target: &str) -> bool {
        let sent = self.link.connect(target);
        self.sync_link();
        sent
    }

    fn sync_link(&mut self) {
        self.display.session_id = self.link.id();
        self.display.link = self.link.status();
    }

    /// Zeroes both scores and abandons the current round.
    pub fn restart(&mut self) {
        info!("restart");
        self.scores.reset();
        self.round.restart();
        self.clear_round();
        self.sync_scores();
    }

    pub fn set_cameras(&mut self, cameras: Vec<Camera>) {
        self.display.cameras = cameras;
    }

    pub fn set_active_camera(&mut self, id: Option<String>) {
        self.display.active_camera = id;
    }
}
