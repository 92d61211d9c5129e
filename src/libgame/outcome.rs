use crate::libgame::display::Cue;
use crate::libgame::gesture::{Move, MOVES};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Lose,
    Draw,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Win => "You Win 🏆",
            Outcome::Lose => "You Lose 😢",
            Outcome::Draw => "Draw 🤝",
        }
    }

    pub fn cue(self) -> Cue {
        match self {
            Outcome::Win => Cue::Win,
            Outcome::Lose => Cue::Lose,
            Outcome::Draw => Cue::Draw,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Move {
    /// The move this one defeats.
    pub fn beats(self) -> Move {
        match self {
            Move::Rock => Move::Scissors,
            Move::Paper => Move::Rock,
            Move::Scissors => Move::Paper,
        }
    }
}

/// Outcome from the local player's point of view.
pub fn resolve(local: Move, opponent: Move) -> Outcome {
    if local == opponent {
        Outcome::Draw
    } else if local.beats() == opponent {
        Outcome::Win
    } else {
        Outcome::Lose
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub player: u32,
    pub opponent: u32,
}

impl Scoreboard {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.player += 1,
            Outcome::Lose => self.opponent += 1,
            Outcome::Draw => (),
        }
    }

    /// Raises the opponent score to a value reported by the peer. Older or
    /// repeated reports leave it unchanged.
    pub fn report_opponent(&mut self, score: u32) {
        self.opponent = self.opponent.max(score);
    }

    pub fn reset(&mut self) {
        *self = Scoreboard::default();
    }
}

/// Source of the opponent's move when no peer is connected.
pub trait Opponent {
    fn pick(&mut self) -> Move;
}

pub struct RandomOpponent<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomOpponent<R> {
    pub fn new(rng: R) -> Self {
        RandomOpponent { rng }
    }
}

impl RandomOpponent<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        RandomOpponent::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        RandomOpponent::new(StdRng::from_entropy())
    }
}

impl<R: Rng> Opponent for RandomOpponent<R> {
    fn pick(&mut self) -> Move {
        *MOVES.choose(&mut self.rng).unwrap_or(&Move::Rock)
    }
}

/// Plays a fixed sequence of moves, cycling.
#[cfg(test)]
pub struct ScriptedOpponent {
    moves: Vec<Move>,
    next: usize,
}

#[cfg(test)]
impl ScriptedOpponent {
    pub fn new(moves: Vec<Move>) -> Self {
        ScriptedOpponent { moves, next: 0 }
    }
}

#[cfg(test)]
impl Opponent for ScriptedOpponent {
    fn pick(&mut self) -> Move {
        if self.moves.is_empty() {
            return Move::Rock;
        }
        let mv = self.moves[self.next % self.moves.len()];
        self.next += 1;
        mv
    }
}
