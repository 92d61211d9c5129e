use crate::libgame::gesture::{Gesture, Move};

/// Debounces the per-frame gesture stream. A gesture is committed once it has
/// been seen on `threshold` consecutive frames.
#[derive(Debug, Clone)]
pub struct Stability {
    last: Gesture,
    count: u32,
    threshold: u32,
}

impl Stability {
    pub fn new(threshold: u32) -> Stability {
        Stability {
            last: Gesture::Unknown,
            count: 0,
            threshold: threshold.max(1),
        }
    }

    /// Feeds one frame. Returns the committed move on the frame the run
    /// reaches the threshold, and only on that frame.
    pub fn observe(&mut self, gesture: Gesture, locked: bool) -> Option<Move> {
        if locked {
            return None;
        }

        let mv = match gesture.to_move() {
            Some(mv) => mv,
            None => {
                self.reset();
                return None;
            }
        };

        if gesture == self.last {
            self.count = self.count.saturating_add(1);
        } else {
            self.last = gesture;
            self.count = 1;
        }

        if self.count == self.threshold {
            Some(mv)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.last = Gesture::Unknown;
        self.count = 0;
    }

    pub fn last(&self) -> Gesture {
        self.last
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

impl Default for Stability {
    fn default() -> Self {
        Stability::new(crate::libgame::config::STABLE_FRAMES)
    }
}
