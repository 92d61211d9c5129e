use crate::libserver::client::{Client, Tx};
use crate::libserver::utils::session_id;
use log::{debug, info};
use rpscam::FromBroker;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;

/// Every connected client, keyed by session id. Clients are paired two by
/// two and a pairing is never renegotiated.
#[derive(Default)]
pub struct Clients {
    clients: HashMap<String, Client>,
}

impl Clients {
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn partner(&self, id: &str) -> Option<&str> {
        self.clients.get(id).and_then(|c| c.partner.as_deref())
    }

    /// Registers a new connection and tells it its session id.
    pub fn add(&mut self, addr: SocketAddr, tx: Tx) -> String {
        let mut rng = rand::thread_rng();
        let mut id = session_id(&mut rng);
        while self.clients.contains_key(&id) {
            id = session_id(&mut rng);
        }

        let client = Client::new(id.clone(), addr, tx);
        client.send(&FromBroker::Open { id: id.clone() });
        info!("{} joined as {}", addr, id);
        self.clients.insert(id.clone(), client);
        id
    }

    pub fn connect(&mut self, from: &str, target: &str) {
        if let Err(reason) = self.pair(from, target) {
            debug!("{} -> {} refused: {}", from, target, reason);
            self.send_msg(from, &FromBroker::Error { reason });
            return;
        }

        info!("paired {} with {}", from, target);
        self.send_msg(
            from,
            &FromBroker::Connection {
                peer: target.to_string(),
            },
        );
        self.send_msg(
            target,
            &FromBroker::Connection {
                peer: from.to_string(),
            },
        );
    }

    fn pair(&mut self, from: &str, target: &str) -> Result<(), String> {
        if from == target {
            return Err("cannot connect to yourself".to_string());
        }
        let caller = self
            .clients
            .get(from)
            .ok_or_else(|| format!("unknown session {}", from))?;
        if caller.partner.is_some() {
            return Err("already connected".to_string());
        }
        let callee = self
            .clients
            .get(target)
            .ok_or_else(|| format!("unknown peer {}", target))?;
        if callee.partner.is_some() {
            return Err(format!("{} is already playing", target));
        }

        if let Some(c) = self.clients.get_mut(from) {
            c.partner = Some(target.to_string());
        }
        if let Some(c) = self.clients.get_mut(target) {
            c.partner = Some(from.to_string());
        }
        Ok(())
    }

    /// Passes a payload on to the sender's partner, untouched.
    pub fn forward(&self, from: &str, payload: Value) {
        match self.partner(from) {
            Some(partner) => self.send_msg(partner, &FromBroker::Data { payload }),
            None => debug!("{} has no partner, dropping payload", from),
        }
    }

    pub fn remove(&mut self, id: &str) {
        let client = match self.clients.remove(id) {
            Some(client) => client,
            None => return,
        };
        info!("{} ({}) left", id, client.addr);

        if let Some(partner) = client.partner {
            if let Some(p) = self.clients.get_mut(&partner) {
                p.partner = None;
                p.send(&FromBroker::Closed {
                    peer: id.to_string(),
                });
            }
        }
    }

    pub fn send_msg(&self, id: &str, msg: &FromBroker) {
        if let Some(client) = self.clients.get(id) {
            client.send(msg);
        }
    }
}
