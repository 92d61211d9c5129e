/// What the player can ask the front end to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Restart,
    Cameras,
    Camera(String),
    NextCamera,
    Connect(String),
    Fullscreen,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.trim().splitn(2, ' ');
    let verb = parts.next().unwrap_or("");
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

    match (verb, arg) {
        ("restart", None) | ("r", None) => Ok(Command::Restart),
        ("cameras", None) => Ok(Command::Cameras),
        ("camera", Some(id)) => Ok(Command::Camera(id.to_string())),
        ("next", None) | ("c", None) => Ok(Command::NextCamera),
        ("connect", Some(peer)) => Ok(Command::Connect(peer.to_string())),
        ("fullscreen", None) | ("f", None) => Ok(Command::Fullscreen),
        ("quit", None) | ("q", None) => Ok(Command::Quit),
        ("camera", None) | ("connect", None) => Err(format!("{} needs an argument", verb)),
        _ => Err(format!("unknown command {:?}", line.trim())),
    }
}

/// The device after `active` in `ids`, wrapping around.
pub fn next_camera<'a>(ids: &'a [String], active: Option<&str>) -> Option<&'a str> {
    let position = active.and_then(|a| ids.iter().position(|id| id == a));
    let next = match position {
        Some(i) => (i + 1) % ids.len(),
        None => 0,
    };
    ids.get(next).map(String::as_str)
}
