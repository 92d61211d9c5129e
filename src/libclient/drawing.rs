use crate::libclient::state::Command;
use crate::libclient::surface::Surface;
use raylib::prelude::*;
use rpscam::{Cue, Display, Outcome};

const WIDTH: i32 = 480;
const HEIGHT: i32 = 640;

/// Frames a cue stays highlighted for.
const FLASH_FRAMES: u32 = 20;

pub struct WindowSurface {
    handle: RaylibHandle,
    thread: RaylibThread,
    flash: Option<(Cue, u32)>,
}

impl WindowSurface {
    pub fn new() -> WindowSurface {
        set_trace_log(TraceLogType::LOG_FATAL);
        let (mut handle, thread) = raylib::init()
            .size(WIDTH, HEIGHT)
            .title("Rock Paper Scissors")
            .build();
        handle.set_target_fps(60);
        WindowSurface {
            handle,
            thread,
            flash: None,
        }
    }
}

fn outcome_color(outcome: Option<Outcome>) -> Color {
    match outcome {
        Some(Outcome::Win) => Color::DARKGREEN,
        Some(Outcome::Lose) => Color::MAROON,
        _ => Color::BLACK,
    }
}

fn draw_header(draw_handle: &mut RaylibDrawHandle, display: &Display) {
    draw_handle.draw_text(
        &format!("Detected: {}", display.detected),
        10,
        10,
        20,
        Color::BLACK,
    );
    draw_handle.draw_text(
        &format!("{}/{}", display.player_score, display.opponent_score),
        WIDTH - 60,
        10,
        20,
        Color::BLACK,
    );
    draw_handle.draw_text(
        &format!("Camera: {}", display.camera_label()),
        10,
        40,
        10,
        Color::GRAY,
    );
    let peer = match &display.session_id {
        Some(id) => format!("ID {} - {}", id, display.link),
        None => display.link.to_string(),
    };
    draw_handle.draw_text(&peer, 10, 55, 10, Color::GRAY);
}

fn draw_round(draw_handle: &mut RaylibDrawHandle, display: &Display) {
    draw_handle.draw_text(&display.countdown_text(), WIDTH / 2 - 20, 180, 80, Color::BLACK);
    draw_handle.draw_text(
        &format!("You: {}", display.your_move_text()),
        40,
        320,
        24,
        Color::BLACK,
    );
    draw_handle.draw_text(
        &format!("Opponent: {}", display.opponent_move_text()),
        40,
        360,
        24,
        Color::BLACK,
    );
    draw_handle.draw_text(
        &display.result_text(),
        40,
        420,
        32,
        outcome_color(display.result),
    );
}

impl Surface for WindowSurface {
    fn present(&mut self, display: &Display, cues: &[Cue]) {
        if let Some(cue) = cues.last() {
            self.flash = Some((*cue, FLASH_FRAMES));
        }

        let flash = self.flash;
        let mut draw_handle = self.handle.begin_drawing(&self.thread);
        draw_handle.clear_background(Color::WHITE);
        draw_header(&mut draw_handle, display);
        draw_round(&mut draw_handle, display);
        if let Some((cue, _)) = flash {
            draw_handle.draw_text(cue.name(), 10, HEIGHT - 30, 20, Color::ORANGE);
        }
        draw_handle.draw_text(
            "R restart  C camera  F fullscreen",
            10,
            HEIGHT - 50,
            10,
            Color::GRAY,
        );
        drop(draw_handle);

        self.flash = match self.flash {
            Some((cue, n)) if n > 1 => Some((cue, n - 1)),
            _ => None,
        };
    }

    fn poll(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.handle.is_key_pressed(KeyboardKey::KEY_R) {
            commands.push(Command::Restart);
        }
        if self.handle.is_key_pressed(KeyboardKey::KEY_C) {
            commands.push(Command::NextCamera);
        }
        if self.handle.is_key_pressed(KeyboardKey::KEY_F) {
            commands.push(Command::Fullscreen);
        }
        commands
    }

    fn toggle_fullscreen(&mut self) {
        self.handle.toggle_fullscreen();
    }

    fn closed(&self) -> bool {
        self.handle.window_should_close()
    }
}
