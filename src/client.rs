mod libclient;

use crate::libclient::{
    camera::{Detector, DetectorConfig, FrameEvent, FrameGate, FrameSource, FrameTx, ReplayCamera},
    state::{next_camera, parse_command, Command},
    surface::{Surface, TerminalSurface},
};
use anyhow::{bail, Context};
use clap::Parser;
use futures_channel::{
    mpsc,
    mpsc::{UnboundedReceiver, UnboundedSender},
};
use futures::{future, StreamExt};
use log::{debug, info, warn};
use rpscam::libgame::config::STABLE_FRAMES;
use rpscam::libgame::{CueSet, Opponent};
use rpscam::{
    FromBroker, GameConfig, LinkEvent, Payload, PeerLink, RandomOpponent, Session, ToBroker,
};
use std::{path::PathBuf, time::Duration, time::Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::spawn;
use tokio_tungstenite::tungstenite::Error as TungsteniteError;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

type ReadRx = UnboundedReceiver<Result<Message, TungsteniteError>>;
type ReadTx = UnboundedSender<Result<Message, TungsteniteError>>;

const REDRAW: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(name = "client", about = "Camera-driven rock-paper-scissors")]
struct Args {
    /// Directory of recorded tracker output, one `.jsonl` file per camera.
    #[arg(long, default_value = "frames")]
    frames: PathBuf,
    /// Camera to start with (defaults to the first one found).
    #[arg(long)]
    camera: Option<String>,
    #[arg(long, default_value_t = 30)]
    fps: u32,
    /// Peer broker, e.g. ws://127.0.0.1:8080/
    #[arg(long)]
    server: Option<String>,
    /// Session id of the player to link up with.
    #[arg(long, requires = "server")]
    connect: Option<String>,
    #[arg(long, default_value_t = STABLE_FRAMES)]
    stable_frames: u32,
    #[arg(long, default_value_t = 0.7)]
    min_detection_confidence: f32,
    #[arg(long, default_value_t = 0.7)]
    min_tracking_confidence: f32,
    /// Seed for the computer opponent.
    #[arg(long)]
    seed: Option<u64>,
    /// Open a window instead of printing to the terminal.
    #[cfg(feature = "gui")]
    #[arg(long)]
    gui: bool,
}

/// Everything the event loop mutates.
struct Game {
    session: Session,
    camera: ReplayCamera,
    frame_tx: FrameTx,
    gate: FrameGate,
    detector: Detector,
}

impl Game {
    fn on_frame(&mut self, event: FrameEvent) {
        if let Some(frame) = self.gate.admit(&event) {
            let landmarks = self.detector.detect(frame);
            self.session.on_frame(landmarks, Instant::now());
        }
    }

    fn switch_camera(&mut self, id: &str) -> anyhow::Result<()> {
        let generation = self.camera.start(id, self.frame_tx.clone())?;
        self.gate.switch(generation);
        self.detector.reset();
        self.session.set_active_camera(Some(id.to_string()));
        Ok(())
    }

    /// Returns false when the player asked to quit.
    fn run(&mut self, command: Command, surface: &mut dyn Surface) -> bool {
        match command {
            Command::Restart => self.session.restart(),
            Command::Cameras => {
                for camera in self.session.display().cameras.iter() {
                    println!("{}  {}", camera.id, camera.label);
                }
            }
            Command::Camera(id) => {
                if let Err(e) = self.switch_camera(&id) {
                    warn!("{:#}", e);
                }
            }
            Command::NextCamera => {
                let ids: Vec<String> = self
                    .session
                    .display()
                    .cameras
                    .iter()
                    .map(|c| c.id.clone())
                    .collect();
                let next = next_camera(&ids, self.camera.active()).map(str::to_string);
                if let Some(id) = next {
                    if let Err(e) = self.switch_camera(&id) {
                        warn!("{:#}", e);
                    }
                }
            }
            Command::Connect(peer) => {
                self.session.connect(&peer);
            }
            Command::Fullscreen => surface.toggle_fullscreen(),
            Command::Quit => return false,
        }
        true
    }

    fn on_broker_message(&mut self, msg: Message) {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => {
                self.session.link_event(LinkEvent::Lost);
                return;
            }
            _ => return,
        };

        match FromBroker::parse(&text) {
            Ok(FromBroker::Open { id }) => {
                println!("Your Multiplayer ID: {}", id);
                println!("Share this with your friend");
                self.session.link_event(LinkEvent::Opened { id });
            }
            Ok(FromBroker::Connection { peer }) => {
                self.session.link_event(LinkEvent::Connected { peer })
            }
            Ok(FromBroker::Data { payload }) => self.session.receive(&payload, Instant::now()),
            Ok(FromBroker::Closed { peer }) => self.session.link_event(LinkEvent::Closed { peer }),
            Ok(FromBroker::Error { reason }) => {
                self.session.link_event(LinkEvent::Refused { reason })
            }
            Err(e) => debug!("ignoring broker message {:?}: {}", text, e),
        }
    }
}

/// Connects to the broker. Outgoing messages go through the returned link,
/// incoming ones are forwarded into `read_tx`.
async fn join_broker(addr: &str, read_tx: ReadTx) -> anyhow::Result<PeerLink> {
    let url = url::Url::parse(addr).with_context(|| format!("bad broker address {}", addr))?;
    let (ws, _) = connect_async(url)
        .await
        .with_context(|| format!("cannot reach broker at {}", addr))?;
    info!("connected to broker {}", addr);
    let (write, read) = ws.split();

    let (write_tx, write_rx) = mpsc::unbounded::<ToBroker<Payload>>();
    let write_handle = write_rx
        .filter_map(|msg| {
            future::ready(match msg.to_text() {
                Ok(text) => Some(Ok(Message::Text(text))),
                Err(e) => {
                    warn!("cannot encode {:?}: {}", msg, e);
                    None
                }
            })
        })
        .forward(write);
    let read_handle = read.map(Ok).forward(read_tx);

    spawn(async move {
        if let Err(e) = write_handle.await {
            warn!("broker write failed: {}", e);
        }
    });
    spawn(async move {
        if read_handle.await.is_err() {
            debug!("event loop gone, stopped reading from broker");
        }
    });

    Ok(PeerLink::new(write_tx))
}

#[cfg_attr(not(feature = "gui"), allow(unused_variables))]
fn make_surface(args: &Args) -> Box<dyn Surface> {
    #[cfg(feature = "gui")]
    {
        if args.gui {
            return Box::new(crate::libclient::drawing::WindowSurface::new());
        }
    }
    Box::new(TerminalSurface::new(CueSet::default()))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = GameConfig {
        stable_frames: args.stable_frames,
        ..GameConfig::default()
    };
    let opponent: Box<dyn Opponent> = match args.seed {
        Some(seed) => Box::new(RandomOpponent::seeded(seed)),
        None => Box::new(RandomOpponent::from_entropy()),
    };

    let (read_tx, mut read_rx): (ReadTx, ReadRx) = mpsc::unbounded();
    let link = match &args.server {
        Some(addr) => join_broker(addr, read_tx).await?,
        None => {
            drop(read_tx);
            PeerLink::detached()
        }
    };

    let mut session = Session::new(config, link, opponent);
    if let Some(peer) = &args.connect {
        session.connect(peer);
    }

    let mut camera = ReplayCamera::new(&args.frames, args.fps);
    let devices = camera.devices()?;
    let first = match (&args.camera, devices.first()) {
        (Some(id), _) => id.clone(),
        (None, Some(device)) => device.id.clone(),
        (None, None) => bail!("no cameras found in {}", args.frames.display()),
    };
    session.set_cameras(devices);

    let (frame_tx, mut frame_rx) = mpsc::unbounded();
    let generation = camera.start(&first, frame_tx.clone())?;
    session.set_active_camera(Some(first));

    let mut game = Game {
        session,
        camera,
        frame_tx,
        gate: FrameGate::new(generation),
        detector: Detector::new(DetectorConfig {
            min_detection_confidence: args.min_detection_confidence,
            min_tracking_confidence: args.min_tracking_confidence,
            ..DetectorConfig::default()
        }),
    };

    let mut surface = make_surface(&args);
    let mut ticker = tokio::time::interval(REDRAW);
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut broker_open = args.server.is_some();

    loop {
        let mut commands = Vec::new();

        tokio::select! {
            Some(event) = frame_rx.next() => game.on_frame(event),
            msg = read_rx.next(), if broker_open => match msg {
                Some(Ok(msg)) => game.on_broker_message(msg),
                Some(Err(e)) => debug!("broker read error: {}", e),
                None => {
                    broker_open = false;
                    game.session.link_event(LinkEvent::Lost);
                }
            },
            _ = ticker.tick() => game.session.advance(Instant::now()),
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => (),
                Ok(Some(line)) => match parse_command(&line) {
                    Ok(command) => commands.push(command),
                    Err(e) => println!("{}", e),
                },
                Ok(None) | Err(_) => stdin_open = false,
            },
        }

        commands.extend(surface.poll());
        let mut quit = false;
        for command in commands {
            quit |= !game.run(command, surface.as_mut());
        }

        let cues = game.session.drain_cues();
        surface.present(game.session.display(), &cues);

        if quit || surface.closed() {
            break;
        }
    }

    game.camera.stop();
    println!("done");
    Ok(())
}
