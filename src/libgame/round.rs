use crate::libgame::config::GameConfig;
use crate::libgame::gesture::Move;
use crate::libgame::outcome::Outcome;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Countdown { remaining: u8, gesture: Move },
    /// Local move is final, opponent move not known yet.
    Locked { local: Move },
    Resolved {
        local: Move,
        opponent: Move,
        outcome: Outcome,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    Started(u8),
    Tick(u8),
    Locked(Move),
    Reset,
}

/// Lifecycle of a single round. Time only moves when the caller passes a
/// later `Instant` to `commit` or `advance`.
#[derive(Debug, Clone)]
pub struct Round {
    phase: Phase,
    deadline: Option<Instant>,
    countdown_from: u8,
    tick: Duration,
    reset_after: Duration,
}

impl Round {
    pub fn new(config: &GameConfig) -> Round {
        Round {
            phase: Phase::Idle,
            deadline: None,
            countdown_from: config.countdown_from.max(1),
            tick: config.tick,
            reset_after: config.reset_after,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// How long a finished round stays on screen.
    pub fn reset_after(&self) -> Duration {
        self.reset_after
    }

    pub fn locked(&self) -> bool {
        matches!(self.phase, Phase::Locked { .. } | Phase::Resolved { .. })
    }

    pub fn counting(&self) -> bool {
        matches!(self.phase, Phase::Countdown { .. })
    }

    /// Starts a countdown for a committed gesture. Ignored unless idle.
    pub fn commit(&mut self, gesture: Move, now: Instant) -> Option<RoundEvent> {
        if self.phase != Phase::Idle {
            return None;
        }
        self.phase = Phase::Countdown {
            remaining: self.countdown_from,
            gesture,
        };
        self.deadline = Some(now + self.tick);
        Some(RoundEvent::Started(self.countdown_from))
    }

    /// Fires every deadline that is due at `now`, oldest first.
    pub fn advance(&mut self, now: Instant) -> Vec<RoundEvent> {
        let mut events = Vec::new();

        loop {
            let due = match self.deadline {
                Some(due) if due <= now => due,
                _ => break,
            };

            match self.phase {
                Phase::Countdown { remaining, gesture } => {
                    let remaining = remaining.saturating_sub(1);
                    events.push(RoundEvent::Tick(remaining));
                    if remaining == 0 {
                        self.phase = Phase::Locked { local: gesture };
                        self.deadline = Some(due + self.reset_after);
                        events.push(RoundEvent::Locked(gesture));
                    } else {
                        self.phase = Phase::Countdown { remaining, gesture };
                        self.deadline = Some(due + self.tick);
                    }
                }
                Phase::Locked { .. } | Phase::Resolved { .. } => {
                    self.phase = Phase::Idle;
                    self.deadline = None;
                    events.push(RoundEvent::Reset);
                }
                Phase::Idle => self.deadline = None,
            }
        }

        events
    }

    /// Records the opponent move for a locked round. Returns false when the
    /// round is not waiting for one.
    pub fn resolve(&mut self, opponent: Move, outcome: Outcome) -> bool {
        match self.phase {
            Phase::Locked { local } => {
                self.phase = Phase::Resolved {
                    local,
                    opponent,
                    outcome,
                };
                true
            }
            _ => false,
        }
    }

    pub fn restart(&mut self) {
        self.phase = Phase::Idle;
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn millis(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn test_full_lifecycle() {
        let t0 = Instant::now();
        let mut round = Round::new(&GameConfig::default());

        assert_eq!(round.commit(Move::Rock, t0), Some(RoundEvent::Started(3)));
        assert!(round.advance(t0 + millis(999)).is_empty());
        assert_eq!(round.advance(t0 + secs(1)), vec![RoundEvent::Tick(2)]);
        assert_eq!(round.advance(t0 + secs(2)), vec![RoundEvent::Tick(1)]);
        assert_eq!(
            round.advance(t0 + secs(3)),
            vec![RoundEvent::Tick(0), RoundEvent::Locked(Move::Rock)]
        );
        assert!(round.locked());
        assert!(round.resolve(Move::Scissors, Outcome::Win));
        assert!(round.advance(t0 + millis(5999)).is_empty());
        assert_eq!(round.advance(t0 + secs(6)), vec![RoundEvent::Reset]);
        assert_eq!(*round.phase(), Phase::Idle);
        assert_eq!(round.deadline(), None);
    }

    #[test]
    fn test_commit_is_noop_unless_idle() {
        let t0 = Instant::now();
        let mut round = Round::new(&GameConfig::default());
        round.commit(Move::Rock, t0);
        assert_eq!(round.commit(Move::Paper, t0 + millis(500)), None);
        assert_eq!(
            *round.phase(),
            Phase::Countdown {
                remaining: 3,
                gesture: Move::Rock
            }
        );
        assert_eq!(round.deadline(), Some(t0 + secs(1)));

        round.advance(t0 + secs(3));
        assert!(round.locked());
        assert_eq!(round.commit(Move::Paper, t0 + secs(4)), None);
        assert_eq!(*round.phase(), Phase::Locked { local: Move::Rock });
    }

    #[test]
    fn test_catches_up_on_late_advance() {
        let t0 = Instant::now();
        let mut round = Round::new(&GameConfig::default());
        round.commit(Move::Paper, t0);
        assert_eq!(
            round.advance(t0 + secs(10)),
            vec![
                RoundEvent::Tick(2),
                RoundEvent::Tick(1),
                RoundEvent::Tick(0),
                RoundEvent::Locked(Move::Paper),
                RoundEvent::Reset,
            ]
        );
        assert_eq!(*round.phase(), Phase::Idle);
    }

    #[test]
    fn test_unresolved_round_still_resets() {
        let t0 = Instant::now();
        let mut round = Round::new(&GameConfig::default());
        round.commit(Move::Scissors, t0);
        round.advance(t0 + secs(3));
        assert_eq!(round.advance(t0 + secs(6)), vec![RoundEvent::Reset]);
        assert!(!round.resolve(Move::Rock, Outcome::Lose));
    }

    #[test]
    fn test_resolve_only_once() {
        let t0 = Instant::now();
        let mut round = Round::new(&GameConfig::default());
        assert!(!round.resolve(Move::Rock, Outcome::Draw));
        round.commit(Move::Rock, t0);
        round.advance(t0 + secs(3));
        assert!(round.resolve(Move::Rock, Outcome::Draw));
        assert!(!round.resolve(Move::Paper, Outcome::Lose));
    }

    #[test]
    fn test_restart_from_any_phase() {
        let t0 = Instant::now();
        let mut round = Round::new(&GameConfig::default());
        round.commit(Move::Rock, t0);
        round.restart();
        assert_eq!(*round.phase(), Phase::Idle);
        assert!(round.advance(t0 + secs(5)).is_empty());
        assert_eq!(round.commit(Move::Rock, t0 + secs(5)), Some(RoundEvent::Started(3)));
    }

    #[test]
    fn test_custom_timing() {
        let config = GameConfig {
            countdown_from: 1,
            tick: millis(100),
            reset_after: millis(200),
            ..GameConfig::default()
        };
        let t0 = Instant::now();
        let mut round = Round::new(&config);
        assert_eq!(round.commit(Move::Rock, t0), Some(RoundEvent::Started(1)));
        assert_eq!(
            round.advance(t0 + millis(100)),
            vec![RoundEvent::Tick(0), RoundEvent::Locked(Move::Rock)]
        );
        assert_eq!(round.advance(t0 + millis(300)), vec![RoundEvent::Reset]);
    }
}
