use crate::libgame::gesture::{Gesture, Move};
use crate::libgame::outcome::Outcome;
use crate::libpeer::link::LinkStatus;
use std::fmt;

/// Discrete audio triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Tick,
    Win,
    Lose,
    Draw,
}

impl Cue {
    pub fn name(self) -> &'static str {
        match self {
            Cue::Tick => "countdown",
            Cue::Win => "win",
            Cue::Lose => "lose",
            Cue::Draw => "draw",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Camera {
    pub id: String,
    pub label: String,
}

/// Everything a front end shows. Per-round fields are `None` between rounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Display {
    pub detected: Gesture,
    pub countdown: Option<u8>,
    pub your_move: Option<Move>,
    pub opponent_move: Option<Move>,
    pub result: Option<Outcome>,
    pub player_score: u32,
    pub opponent_score: u32,
    pub session_id: Option<String>,
    pub link: LinkStatus,
    pub cameras: Vec<Camera>,
    pub active_camera: Option<String>,
}

impl Default for Display {
    fn default() -> Self {
        Display {
            detected: Gesture::Unknown,
            countdown: None,
            your_move: None,
            opponent_move: None,
            result: None,
            player_score: 0,
            opponent_score: 0,
            session_id: None,
            link: LinkStatus::Absent,
            cameras: Vec::new(),
            active_camera: None,
        }
    }
}

fn dash<T: fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

impl Display {
    pub fn clear_round(&mut self) {
        self.detected = Gesture::Unknown;
        self.countdown = None;
        self.your_move = None;
        self.opponent_move = None;
        self.result = None;
    }

    pub fn countdown_text(&self) -> String {
        dash(&self.countdown)
    }

    pub fn your_move_text(&self) -> String {
        dash(&self.your_move)
    }

    pub fn opponent_move_text(&self) -> String {
        dash(&self.opponent_move)
    }

    pub fn result_text(&self) -> String {
        dash(&self.result)
    }

    pub fn camera_label(&self) -> String {
        self.active_camera
            .as_ref()
            .and_then(|id| self.cameras.iter().find(|c| &c.id == id))
            .map(|c| c.label.clone())
            .unwrap_or_else(|| "-".to_string())
    }
}

impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "detected: {} | countdown: {} | you: {} | opponent: {} | {} | score {}/{}",
            self.detected,
            self.countdown_text(),
            self.your_move_text(),
            self.opponent_move_text(),
            self.result_text(),
            self.player_score,
            self.opponent_score,
        )
    }
}
