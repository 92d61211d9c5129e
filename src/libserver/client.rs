use futures_channel::mpsc::UnboundedSender;
use log::warn;
use rpscam::FromBroker;
use std::net::SocketAddr;
use tungstenite::protocol::Message;

pub type Tx = UnboundedSender<Message>;

pub struct Client {
    pub id: String,
    pub addr: SocketAddr,
    pub tx: Tx,
    pub partner: Option<String>,
}

impl Client {
    pub fn new(id: String, addr: SocketAddr, tx: Tx) -> Client {
        Client {
            id,
            addr,
            tx,
            partner: None,
        }
    }

    pub fn send(&self, msg: &FromBroker) {
        let text = match msg.to_text() {
            Ok(text) => text,
            Err(e) => {
                warn!("cannot encode message for {}: {}", self.id, e);
                return;
            }
        };
        if self.tx.unbounded_send(Message::Text(text)).is_err() {
            warn!("{} ({}) is no longer reachable", self.id, self.addr);
        }
    }
}
