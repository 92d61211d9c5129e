use crate::libpeer::payload::{Payload, ToBroker};
use futures_channel::mpsc::UnboundedSender;
use log::{debug, info, warn};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub type Tx = UnboundedSender<ToBroker<Payload>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    Absent,
    Pending { target: String },
    Open { peer: String },
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LinkStatus::Absent => write!(f, "offline"),
            LinkStatus::Pending { target } => write!(f, "connecting to {}", target),
            LinkStatus::Open { peer } => write!(f, "playing {}", peer),
        }
    }
}

/// Broker notifications that change the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Opened { id: String },
    Connected { peer: String },
    Closed { peer: String },
    Refused { reason: String },
    /// The broker itself went away.
    Lost,
}

#[derive(Debug)]
struct LinkState {
    id: Option<String>,
    status: LinkStatus,
}

/// Handle to the single peer connection of this process. Clones share state.
#[derive(Debug, Clone)]
pub struct PeerLink {
    state: Arc<Mutex<LinkState>>,
    tx: Option<Tx>,
}

impl PeerLink {
    pub fn new(tx: Tx) -> PeerLink {
        PeerLink {
            state: Arc::new(Mutex::new(LinkState {
                id: None,
                status: LinkStatus::Absent,
            })),
            tx: Some(tx),
        }
    }

    /// A link with no broker behind it. It never opens.
    pub fn detached() -> PeerLink {
        PeerLink {
            state: Arc::new(Mutex::new(LinkState {
                id: None,
                status: LinkStatus::Absent,
            })),
            tx: None,
        }
    }

    fn state(&self) -> MutexGuard<'_, LinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> Option<String> {
        self.state().id.clone()
    }

    pub fn status(&self) -> LinkStatus {
        self.state().status.clone()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state().status, LinkStatus::Open { .. })
    }

    /// Asks the broker for a link to `target`. Only allowed while no link
    /// exists or is pending.
    pub fn connect(&self, target: &str) -> bool {
        let tx = match &self.tx {
            Some(tx) => tx,
            None => {
                warn!("no broker configured, cannot connect to {}", target);
                return false;
            }
        };

        let mut state = self.state();
        if state.status != LinkStatus::Absent {
            debug!("link already {}, ignoring connect to {}", state.status, target);
            return false;
        }

        let request = ToBroker::Connect {
            peer: target.to_string(),
        };
        if tx.unbounded_send(request).is_err() {
            warn!("broker connection is gone");
            return false;
        }
        state.status = LinkStatus::Pending {
            target: target.to_string(),
        };
        true
    }

    /// Sends a payload to the peer. Does nothing unless the link is open.
    pub fn send(&self, payload: Payload) -> bool {
        if !self.is_open() {
            return false;
        }
        match &self.tx {
            Some(tx) => tx.unbounded_send(ToBroker::Data { payload }).is_ok(),
            None => false,
        }
    }

    pub fn apply(&self, event: LinkEvent) {
        let mut state = self.state();
        match event {
            LinkEvent::Opened { id } => {
                info!("session id {}", id);
                state.id = Some(id);
            }
            LinkEvent::Connected { peer } => {
                if let LinkStatus::Open { peer: current } = &state.status {
                    debug!("already linked to {}, ignoring {}", current, peer);
                } else {
                    info!("linked to {}", peer);
                    state.status = LinkStatus::Open { peer };
                }
            }
            LinkEvent::Closed { peer } => {
                if state.status == (LinkStatus::Open { peer: peer.clone() }) {
                    info!("{} left", peer);
                    state.status = LinkStatus::Absent;
                }
            }
            LinkEvent::Refused { reason } => {
                if let LinkStatus::Pending { target } = &state.status {
                    warn!("connection to {} refused: {}", target, reason);
                    state.status = LinkStatus::Absent;
                }
            }
            LinkEvent::Lost => {
                warn!("lost the broker connection");
                state.id = None;
                state.status = LinkStatus::Absent;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libgame::gesture::Move;
    use futures_channel::mpsc::{unbounded, UnboundedReceiver};

    fn drain(rx: &mut UnboundedReceiver<ToBroker<Payload>>) -> Vec<ToBroker<Payload>> {
        let mut out = Vec::new();
        while let Ok(Some(msg)) = rx.try_next() {
            out.push(msg);
        }
        out
    }

    #[test]
    fn test_send_requires_open_link() {
        let (tx, mut rx) = unbounded();
        let link = PeerLink::new(tx);
        assert!(!link.send(Payload::Score { score: 1 }));
        assert!(drain(&mut rx).is_empty());

        link.apply(LinkEvent::Connected {
            peer: "p2".to_string(),
        });
        assert!(link.send(Payload::Score { score: 1 }));
        assert_eq!(
            drain(&mut rx),
            vec![ToBroker::Data {
                payload: Payload::Score { score: 1 }
            }]
        );
    }

    #[test]
    fn test_connect_moves_to_pending() {
        let (tx, mut rx) = unbounded();
        let link = PeerLink::new(tx);
        assert!(link.connect("p2"));
        assert!(!link.connect("p3"));
        assert_eq!(
            link.status(),
            LinkStatus::Pending {
                target: "p2".to_string()
            }
        );
        assert_eq!(
            drain(&mut rx),
            vec![ToBroker::Connect {
                peer: "p2".to_string()
            }]
        );

        link.apply(LinkEvent::Refused {
            reason: "unknown peer".to_string(),
        });
        assert_eq!(link.status(), LinkStatus::Absent);
    }

    #[test]
    fn test_first_link_wins() {
        let (tx, _rx) = unbounded();
        let link = PeerLink::new(tx);
        link.apply(LinkEvent::Connected {
            peer: "a".to_string(),
        });
        link.apply(LinkEvent::Connected {
            peer: "b".to_string(),
        });
        assert_eq!(
            link.status(),
            LinkStatus::Open {
                peer: "a".to_string()
            }
        );

        link.apply(LinkEvent::Closed {
            peer: "b".to_string(),
        });
        assert!(link.is_open());
        link.apply(LinkEvent::Closed {
            peer: "a".to_string(),
        });
        assert!(!link.is_open());
    }

    #[test]
    fn test_clones_share_state() {
        let (tx, _rx) = unbounded();
        let link = PeerLink::new(tx);
        let other = link.clone();
        link.apply(LinkEvent::Opened {
            id: "me".to_string(),
        });
        other.apply(LinkEvent::Connected {
            peer: "you".to_string(),
        });
        assert_eq!(link.id(), Some("me".to_string()));
        assert!(link.is_open());
    }

    #[test]
    fn test_lost_broker_drops_link() {
        let (tx, _rx) = unbounded();
        let link = PeerLink::new(tx);
        link.apply(LinkEvent::Opened {
            id: "me".to_string(),
        });
        link.apply(LinkEvent::Connected {
            peer: "you".to_string(),
        });
        link.apply(LinkEvent::Lost);
        assert_eq!(link.status(), LinkStatus::Absent);
        assert_eq!(link.id(), None);
    }

    #[test]
    fn test_detached_never_sends() {
        let link = PeerLink::detached();
        assert!(!link.connect("x"));
        link.apply(LinkEvent::Connected {
            peer: "x".to_string(),
        });
        assert!(!link.send(Payload::Gesture {
            gesture: Move::Rock
        }));
    }
}
