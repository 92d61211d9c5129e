pub mod config;
pub mod display;
pub mod gesture;
pub mod outcome;
pub mod round;
pub mod session;
pub mod stability;

pub use config::{CueSet, GameConfig};
pub use display::{Camera, Cue, Display};
pub use gesture::{classify, Gesture, Landmark, Move};
pub use outcome::{resolve, Opponent, Outcome, RandomOpponent, Scoreboard};
pub use round::{Phase, Round, RoundEvent};
pub use session::{Resolution, RoundObserver, Session};
pub use stability::Stability;
