use rand::{distributions::Alphanumeric, Rng};
use rpscam::ToBroker;
use tungstenite::protocol::Message;

pub const SESSION_ID_LEN: usize = 8;

pub enum Action {
    Request(ToBroker),
    Ignore,
    Error(String),
}

pub fn session_id<R: Rng>(rng: &mut R) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

pub fn parse(msg: &Message) -> Action {
    match msg {
        Message::Text(text) => match ToBroker::parse(text) {
            Ok(request) => Action::Request(request),
            Err(e) => Action::Error(format!("bad request: {}", e)),
        },
        Message::Binary(_) => Action::Error("binary messages are not supported".to_string()),
        _ => Action::Ignore,
    }
}
