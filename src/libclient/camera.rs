use anyhow::{bail, Context};
use futures_channel::mpsc::UnboundedSender;
use log::{debug, info, warn};
use rpscam::libgame::Camera;
use rpscam::Landmark;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;

pub type FrameTx = UnboundedSender<FrameEvent>;

fn full_confidence() -> f32 {
    1.0
}

/// One tracked hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    #[serde(default = "full_confidence")]
    pub score: f32,
    pub landmarks: Vec<Landmark>,
}

/// Tracker output for one video frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub hands: Vec<Hand>,
}

impl Frame {
    /// Lines that do not parse are frames without a hand.
    pub fn parse(line: &str) -> Frame {
        serde_json::from_str(line).unwrap_or_else(|e| {
            debug!("unreadable frame: {}", e);
            Frame::default()
        })
    }
}

/// A frame tagged with the source run that produced it.
#[derive(Debug, Clone)]
pub struct FrameEvent {
    pub generation: u64,
    pub frame: Frame,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    pub max_hands: usize,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            max_hands: 1,
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.7,
        }
    }
}

/// Picks the hand to classify. A hand must clear the detection threshold to
/// be picked up and the tracking threshold to stay picked up.
#[derive(Debug, Clone)]
pub struct Detector {
    config: DetectorConfig,
    tracking: bool,
}

impl Detector {
    pub fn new(config: DetectorConfig) -> Detector {
        Detector {
            config,
            tracking: false,
        }
    }

    pub fn detect<'a>(&mut self, frame: &'a Frame) -> Option<&'a [Landmark]> {
        let threshold = if self.tracking {
            self.config.min_tracking_confidence
        } else {
            self.config.min_detection_confidence
        };

        let hand = frame
            .hands
            .iter()
            .take(self.config.max_hands)
            .find(|h| h.score >= threshold);
        self.tracking = hand.is_some();
        hand.map(|h| h.landmarks.as_slice())
    }

    pub fn reset(&mut self) {
        self.tracking = false;
    }
}

/// Lets through only frames from the source run started last. Frames a
/// stopped run queued before it was aborted are dropped here.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameGate {
    generation: u64,
}

impl FrameGate {
    pub fn new(generation: u64) -> FrameGate {
        FrameGate { generation }
    }

    pub fn switch(&mut self, generation: u64) {
        self.generation = generation;
    }

    pub fn admit<'a>(&self, event: &'a FrameEvent) -> Option<&'a Frame> {
        if event.generation != self.generation {
            debug!(
                "dropping frame from run {}, current is {}",
                event.generation, self.generation
            );
            return None;
        }
        Some(&event.frame)
    }
}

/// A device that produces frames.
pub trait FrameSource {
    fn devices(&self) -> anyhow::Result<Vec<Camera>>;

    /// Stops whatever is running, then streams `device` into `tx`. Returns
    /// the generation stamped on the new frames.
    fn start(&mut self, device: &str, tx: FrameTx) -> anyhow::Result<u64>;

    fn stop(&mut self);

    fn active(&self) -> Option<&str>;
}

/// Replays recorded tracker output. Every `*.jsonl` file in a directory is
/// one device, each line of it one frame.
pub struct ReplayCamera {
    dir: PathBuf,
    interval: Duration,
    task: Option<JoinHandle<()>>,
    active: Option<String>,
    generation: u64,
}

impl ReplayCamera {
    pub fn new(dir: impl Into<PathBuf>, fps: u32) -> ReplayCamera {
        ReplayCamera {
            dir: dir.into(),
            interval: Duration::from_secs(1) / fps.max(1),
            task: None,
            active: None,
            generation: 0,
        }
    }

    fn load(path: &Path) -> anyhow::Result<Vec<Frame>> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read frames from {}", path.display()))?;
        let frames: Vec<Frame> = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(Frame::parse)
            .collect();
        if frames.is_empty() {
            bail!("{} has no frames", path.display());
        }
        Ok(frames)
    }
}

impl FrameSource for ReplayCamera {
    fn devices(&self) -> anyhow::Result<Vec<Camera>> {
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("cannot list cameras in {}", self.dir.display()))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().map(|x| x == "jsonl").unwrap_or(false))
            .collect();
        paths.sort();

        Ok(paths
            .iter()
            .enumerate()
            .map(|(i, p)| Camera {
                id: p.display().to_string(),
                label: p
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| format!("Camera {}", i + 1)),
            })
            .collect())
    }

    fn start(&mut self, device: &str, tx: FrameTx) -> anyhow::Result<u64> {
        self.stop();

        let frames = ReplayCamera::load(Path::new(device))?;
        self.generation += 1;
        let generation = self.generation;
        let interval = self.interval;
        info!("camera {} started ({} frames)", device, frames.len());

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            for frame in frames.iter().cycle() {
                ticker.tick().await;
                let event = FrameEvent {
                    generation,
                    frame: frame.clone(),
                };
                if tx.unbounded_send(event).is_err() {
                    warn!("frame consumer gone, stopping camera");
                    break;
                }
            }
        }));
        self.active = Some(device.to_string());
        Ok(generation)
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let Some(device) = self.active.take() {
            info!("camera {} stopped", device);
        }
    }

    fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }
}

impl Drop for ReplayCamera {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_channel::mpsc::unbounded;
    use futures_util::StreamExt;
    use std::fs;

    fn hand(score: f32, y: f32) -> Hand {
        Hand {
            score,
            landmarks: vec![Landmark { x: 0.0, y, z: 0.0 }; 21],
        }
    }

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rpscam-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_frames(dir: &Path, name: &str, frames: &[Frame]) -> String {
        let path = dir.join(name);
        let lines: Vec<String> = frames
            .iter()
            .map(|f| serde_json::to_string(f).unwrap())
            .collect();
        fs::write(&path, lines.join("\n")).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_frame_parse() {
        let frame = Frame::parse(r#"{"hands":[{"landmarks":[{"x":0.1,"y":0.2}]}]}"#);
        assert_eq!(frame.hands.len(), 1);
        assert_eq!(frame.hands[0].score, 1.0);
        assert_eq!(frame.hands[0].landmarks[0].z, 0.0);

        assert_eq!(Frame::parse("not json"), Frame::default());
        assert_eq!(Frame::parse("{}"), Frame::default());
    }

    #[test]
    fn test_detector_thresholds() {
        let mut detector = Detector::new(DetectorConfig {
            max_hands: 1,
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.4,
        });
        let weak = Frame {
            hands: vec![hand(0.5, 0.1)],
        };
        let strong = Frame {
            hands: vec![hand(0.9, 0.1)],
        };

        assert!(detector.detect(&weak).is_none());
        assert!(detector.detect(&strong).is_some());
        assert!(detector.detect(&weak).is_some());
        assert!(detector.detect(&Frame::default()).is_none());
        assert!(detector.detect(&weak).is_none());
    }

    #[test]
    fn test_detector_only_looks_at_max_hands() {
        let mut detector = Detector::new(DetectorConfig::default());
        let frame = Frame {
            hands: vec![hand(0.1, 0.1), hand(0.9, 0.2)],
        };
        assert!(detector.detect(&frame).is_none());

        let mut two = Detector::new(DetectorConfig {
            max_hands: 2,
            ..DetectorConfig::default()
        });
        assert_eq!(two.detect(&frame).map(|l| l[0].y), Some(0.2));
    }

    #[test]
    fn test_devices_listing() {
        let dir = scratch("devices");
        write_frames(&dir, "b-side.jsonl", &[Frame::default()]);
        write_frames(&dir, "a-front.jsonl", &[Frame::default()]);
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let camera = ReplayCamera::new(&dir, 30);
        let devices = camera.devices().unwrap();
        let labels: Vec<&str> = devices.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["a-front", "b-side"]);

        assert!(ReplayCamera::new(dir.join("missing"), 30).devices().is_err());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_switching_stops_previous_source() {
        let dir = scratch("switch");
        let first = write_frames(
            &dir,
            "first.jsonl",
            &[Frame {
                hands: vec![hand(1.0, 0.1)],
            }],
        );
        let second = write_frames(
            &dir,
            "second.jsonl",
            &[Frame {
                hands: vec![hand(1.0, 0.9)],
            }],
        );

        let (tx, mut rx) = unbounded();
        let mut camera = ReplayCamera::new(&dir, 500);
        let g1 = camera.start(&first, tx.clone()).unwrap();
        let event = rx.next().await.unwrap();
        assert_eq!(event.generation, g1);

        let g2 = camera.start(&second, tx).unwrap();
        assert!(g2 > g1);
        assert_eq!(camera.active(), Some(second.as_str()));

        let mut fresh = 0;
        while fresh < 3 {
            let event = rx.next().await.unwrap();
            if event.generation == g2 {
                assert_eq!(event.frame.hands[0].landmarks[0].y, 0.9);
                fresh += 1;
            } else {
                assert_eq!(fresh, 0, "stale frame after switching");
            }
        }

        camera.stop();
        assert_eq!(camera.active(), None);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_gate_keeps_queued_frames_from_reaching_session() {
        use rpscam::libgame::config::GameConfig;
        use rpscam::libgame::outcome::RandomOpponent;
        use rpscam::{Gesture, Session};
        use std::time::Instant;

        let dir = scratch("gate");
        let rock = Frame {
            hands: vec![hand(1.0, 0.1)],
        };
        let first = write_frames(&dir, "first.jsonl", &[rock.clone()]);
        let second = write_frames(&dir, "second.jsonl", &[Frame::default()]);

        let (tx, mut rx) = unbounded();
        let mut camera = ReplayCamera::new(&dir, 500);
        let mut gate = FrameGate::new(camera.start(&first, tx.clone()).unwrap());
        let stale = gate.generation;
        // a frame of the old run still sitting in the channel
        tx.unbounded_send(FrameEvent {
            generation: stale,
            frame: rock,
        })
        .unwrap();
        gate.switch(camera.start(&second, tx).unwrap());

        let config = GameConfig {
            stable_frames: 1,
            ..GameConfig::default()
        };
        let mut session = Session::solo(config, Box::new(RandomOpponent::seeded(1)));
        let mut detector = Detector::new(DetectorConfig::default());
        let mut fresh = 0;
        while fresh < 3 {
            let event = rx.next().await.unwrap();
            if let Some(frame) = gate.admit(&event) {
                assert_ne!(event.generation, stale);
                session.on_frame(detector.detect(frame), Instant::now());
                fresh += 1;
            }
        }
        assert_eq!(session.display().detected, Gesture::Unknown);
        assert_eq!(session.display().countdown, None);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_empty_device_is_an_error() {
        let dir = scratch("empty");
        let path = write_frames(&dir, "empty.jsonl", &[]);
        let (tx, _rx) = unbounded();
        let mut camera = ReplayCamera::new(&dir, 30);
        assert!(camera.start(&path, tx).is_err());
        assert_eq!(camera.active(), None);
        fs::remove_dir_all(&dir).unwrap();
    }
}
