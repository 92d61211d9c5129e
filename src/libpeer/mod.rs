pub mod link;
pub mod payload;
pub mod relay;

pub use link::{LinkEvent, LinkStatus, PeerLink};
pub use payload::{FromBroker, Payload, ToBroker};
pub use relay::PeerRelay;
