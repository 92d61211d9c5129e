//! Camera-driven rock-paper-scissors.
//!
//! Hand landmarks go through a classifier and a stability filter, a committed
//! gesture starts a round countdown, and the locked move is scored against a
//! random opponent or a connected peer.

pub mod libgame;
pub mod libpeer;

pub use libgame::{
    classify, Cue, Display, GameConfig, Gesture, Landmark, Move, Outcome, Phase, RandomOpponent,
    RoundObserver, Scoreboard, Session,
};
pub use libpeer::{FromBroker, LinkEvent, LinkStatus, Payload, PeerLink, ToBroker};
