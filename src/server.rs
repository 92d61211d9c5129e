//! accepts websocket connections and hands each one a session id
//! pairs two sessions when one asks to connect to the other
//! forwards game payloads between paired sessions
//! tells the remaining session when its partner leaves

mod libserver;

use crate::libserver::{
    clients::Clients,
    utils::{parse, Action},
};
use anyhow::Context;
use clap::Parser;
use futures_channel::mpsc::unbounded;
use futures_util::{future, pin_mut, stream::TryStreamExt, StreamExt};
use log::{debug, info, warn};
use rpscam::ToBroker;
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::net::{TcpListener, TcpStream};

type ClientsArc = Arc<Mutex<Clients>>;

#[derive(Parser)]
#[command(name = "server", about = "Peer broker for rock-paper-scissors sessions")]
struct Args {
    /// Address to listen on.
    #[arg(default_value = "127.0.0.1:8080")]
    addr: String,
}

fn lock(clients: &ClientsArc) -> MutexGuard<'_, Clients> {
    clients.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn handle_connection(clients: ClientsArc, raw_stream: TcpStream, addr: SocketAddr) {
    info!("Incoming TCP connection from: {}", addr);

    let ws_stream = match tokio_tungstenite::accept_async(raw_stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("websocket handshake with {} failed: {}", addr, e);
            return;
        }
    };

    let (tx, rx) = unbounded();
    let id = lock(&clients).add(addr, tx);

    let (outgoing, incoming) = ws_stream.split();

    let handle_incoming = incoming.try_for_each(|msg| {
        debug!("Received a message from {}: {}", id, msg);

        match parse(&msg) {
            Action::Request(ToBroker::Connect { peer }) => lock(&clients).connect(&id, &peer),
            Action::Request(ToBroker::Data { payload }) => lock(&clients).forward(&id, payload),
            Action::Ignore => (),
            Action::Error(reason) => {
                debug!("{}: {}", id, reason);
                lock(&clients).send_msg(&id, &rpscam::FromBroker::Error { reason });
            }
        }

        future::ok(())
    });

    let receive_from_others = rx.map(Ok).forward(outgoing);

    pin_mut!(handle_incoming, receive_from_others);
    future::select(handle_incoming, receive_from_others).await;

    let mut c = lock(&clients);
    c.remove(&id);
    info!("{} disconnected, {} sessions left", &addr, c.len());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let clients = ClientsArc::new(Mutex::new(Clients::default()));

    let listener = TcpListener::bind(&args.addr)
        .await
        .with_context(|| format!("failed to bind {}", args.addr))?;
    info!("listening on {}", args.addr);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                tokio::spawn(handle_connection(clients.clone(), stream, addr));
            }
            Err(e) => warn!("accept failed: {}", e),
        }
    }
}
