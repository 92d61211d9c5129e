use crate::libclient::state::Command;
use log::info;
use rpscam::libgame::CueSet;
use rpscam::{Cue, Display};

/// Where the read model ends up.
pub trait Surface {
    fn present(&mut self, display: &Display, cues: &[Cue]);

    /// Commands entered on the surface itself since the last call.
    fn poll(&mut self) -> Vec<Command> {
        Vec::new()
    }

    fn toggle_fullscreen(&mut self) {
        info!("fullscreen is not available here");
    }

    fn closed(&self) -> bool {
        false
    }
}

/// Prints a status line whenever something visible changes.
pub struct TerminalSurface {
    last: Option<Display>,
    sounds: CueSet,
}

impl TerminalSurface {
    pub fn new(sounds: CueSet) -> TerminalSurface {
        TerminalSurface { last: None, sounds }
    }

    fn lines(&self, display: &Display) -> Vec<String> {
        let mut lines = Vec::new();
        let last = self.last.as_ref();

        if display.session_id != last.and_then(|d| d.session_id.clone()) {
            if let Some(id) = &display.session_id {
                lines.push(format!("Your Multiplayer ID: {} (share this with your friend)", id));
            }
        }
        if last.map(|d| &d.link) != Some(&display.link) {
            lines.push(format!("peer: {}", display.link));
        }
        if last.and_then(|d| d.active_camera.as_ref()) != display.active_camera.as_ref() {
            lines.push(format!("camera: {}", display.camera_label()));
        }
        if last.map(|d| d.to_string()) != Some(display.to_string()) {
            lines.push(display.to_string());
        }
        lines
    }
}

impl Surface for TerminalSurface {
    fn present(&mut self, display: &Display, cues: &[Cue]) {
        for cue in cues {
            info!("cue {} ({})", cue.name(), self.sounds.asset(*cue));
        }
        if self.last.as_ref() == Some(display) {
            return;
        }
        for line in self.lines(display) {
            println!("{}", line);
        }
        self.last = Some(display.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpscam::{Gesture, LinkStatus};

    #[test]
    fn test_first_present_shows_id_and_status() {
        let surface = TerminalSurface::new(CueSet::default());
        let display = Display {
            session_id: Some("abc".to_string()),
            ..Display::default()
        };
        let lines = surface.lines(&display);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("abc"));
        assert_eq!(lines[1], "peer: offline");
    }

    #[test]
    fn test_only_changes_are_printed() {
        let mut surface = TerminalSurface::new(CueSet::default());
        let mut display = Display::default();
        surface.present(&display, &[]);

        display.detected = Gesture::Rock;
        assert_eq!(
            surface.lines(&display),
            vec!["detected: Rock | countdown: - | you: - | opponent: - | - | score 0/0".to_string()]
        );

        display.link = LinkStatus::Open {
            peer: "p".to_string(),
        };
        surface.present(&display, &[Cue::Tick]);
        assert!(surface.lines(&display).is_empty());
    }
}
