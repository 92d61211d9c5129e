use crate::libgame::gesture::Move;
use crate::libgame::session::{Resolution, RoundObserver};
use crate::libpeer::link::PeerLink;
use crate::libpeer::payload::Payload;
use log::debug;

/// Forwards the local side of each round to the peer.
pub struct PeerRelay {
    link: PeerLink,
}

impl PeerRelay {
    pub fn new(link: PeerLink) -> PeerRelay {
        PeerRelay { link }
    }
}

impl RoundObserver for PeerRelay {
    fn locked(&mut self, local: Move) {
        if self.link.send(Payload::Gesture { gesture: local }) {
            debug!("sent move {} to peer", local);
        }
    }

    fn resolved(&mut self, resolution: &Resolution) {
        let score = resolution.scores.player;
        if self.link.send(Payload::Score { score }) {
            debug!("sent score {} to peer", score);
        }
    }
}
