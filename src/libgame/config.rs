use crate::libgame::display::Cue;
use std::time::Duration;

pub const STABLE_FRAMES: u32 = 30;
pub const COUNTDOWN_FROM: u8 = 3;
pub const TICK: Duration = Duration::from_secs(1);
pub const RESET_AFTER: Duration = Duration::from_secs(3);

/// Timing and debounce settings for one game session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    /// Consecutive identical frames needed to commit a gesture.
    pub stable_frames: u32,
    /// First value shown by the countdown.
    pub countdown_from: u8,
    /// Interval between countdown ticks.
    pub tick: Duration,
    /// Delay between locking a move and resetting the round.
    pub reset_after: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            stable_frames: STABLE_FRAMES,
            countdown_from: COUNTDOWN_FROM,
            tick: TICK,
            reset_after: RESET_AFTER,
        }
    }
}

/// Sound assets played for each cue by front ends that have audio.
#[derive(Debug, Clone, PartialEq)]
pub struct CueSet {
    pub countdown: String,
    pub win: String,
    pub lose: String,
    pub draw: String,
}

impl CueSet {
    pub fn asset(&self, cue: Cue) -> &str {
        match cue {
            Cue::Tick => &self.countdown,
            Cue::Win => &self.win,
            Cue::Lose => &self.lose,
            Cue::Draw => &self.draw,
        }
    }
}

impl Default for CueSet {
    fn default() -> Self {
        let sound = |name: &str| format!("https://actions.google.com/sounds/v1/cartoon/{}.ogg", name);
        CueSet {
            countdown: sound("wood_plank_flicks"),
            win: sound("concussive_hit_guitar_boing"),
            lose: sound("clang_and_wobble"),
            draw: sound("pop"),
        }
    }
}
