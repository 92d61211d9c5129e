use serde::{Deserialize, Serialize};
use std::fmt;

/// Landmarks per hand delivered by the tracker.
pub const HAND_LANDMARKS: usize = 21;

/// (tip, pip) indices of the index, middle, ring and pinky fingers.
const FINGERS: [(usize, usize); 4] = [(8, 6), (12, 10), (16, 14), (20, 18)];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    Rock,
    Paper,
    Scissors,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

pub const MOVES: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

impl Gesture {
    pub fn to_move(self) -> Option<Move> {
        match self {
            Gesture::Rock => Some(Move::Rock),
            Gesture::Paper => Some(Move::Paper),
            Gesture::Scissors => Some(Move::Scissors),
            Gesture::Unknown => None,
        }
    }
}

impl From<Move> for Gesture {
    fn from(m: Move) -> Self {
        match m {
            Move::Rock => Gesture::Rock,
            Move::Paper => Gesture::Paper,
            Move::Scissors => Gesture::Scissors,
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_move() {
            Some(m) => write!(f, "{}", m),
            None => write!(f, "-"),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Move::Rock => "Rock",
            Move::Paper => "Paper",
            Move::Scissors => "Scissors",
        };
        write!(f, "{}", name)
    }
}

/// Classifies one hand by counting extended fingers. A finger is extended
/// when its tip sits above its proximal joint (smaller image `y`).
pub fn classify(landmarks: Option<&[Landmark]>) -> Gesture {
    let landmarks = match landmarks {
        Some(l) if l.len() >= HAND_LANDMARKS => l,
        _ => return Gesture::Unknown,
    };

    let extended = FINGERS
        .iter()
        .filter(|(tip, pip)| landmarks[*tip].y < landmarks[*pip].y)
        .count();

    match extended {
        0 => Gesture::Rock,
        2 => Gesture::Scissors,
        4 => Gesture::Paper,
        _ => Gesture::Unknown,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a hand where the listed fingers (0 = index .. 3 = pinky) are
    /// extended and the others curled.
    pub(crate) fn hand(extended: &[usize]) -> Vec<Landmark> {
        let mut points = vec![Landmark { x: 0.5, y: 0.5, z: 0.0 }; HAND_LANDMARKS];
        for (finger, (tip, pip)) in FINGERS.iter().enumerate() {
            points[*pip].y = 0.5;
            points[*tip].y = if extended.contains(&finger) { 0.2 } else { 0.7 };
        }
        points
    }

    #[test]
    fn test_classify_counts() {
        assert_eq!(classify(Some(&hand(&[]))), Gesture::Rock);
        assert_eq!(classify(Some(&hand(&[0, 1]))), Gesture::Scissors);
        assert_eq!(classify(Some(&hand(&[0, 1, 2, 3]))), Gesture::Paper);
        assert_eq!(classify(Some(&hand(&[0]))), Gesture::Unknown);
        assert_eq!(classify(Some(&hand(&[0, 1, 2]))), Gesture::Unknown);
    }

    #[test]
    fn test_classify_any_two_fingers_is_scissors() {
        assert_eq!(classify(Some(&hand(&[2, 3]))), Gesture::Scissors);
        assert_eq!(classify(Some(&hand(&[0, 3]))), Gesture::Scissors);
    }

    #[test]
    fn test_classify_short_or_absent() {
        assert_eq!(classify(None), Gesture::Unknown);
        assert_eq!(classify(Some(&[])), Gesture::Unknown);
        for len in 0..HAND_LANDMARKS {
            let mut points = hand(&[]);
            points.truncate(len);
            assert_eq!(classify(Some(&points)), Gesture::Unknown);
        }
    }

    #[test]
    fn test_classify_is_pure() {
        let points = hand(&[0, 1]);
        let first = classify(Some(&points));
        for _ in 0..10 {
            assert_eq!(classify(Some(&points)), first);
        }
    }

    #[test]
    fn test_equal_height_is_not_extended() {
        let mut points = hand(&[0, 1, 2, 3]);
        points[8].y = points[6].y;
        assert_eq!(classify(Some(&points)), Gesture::Unknown);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Gesture::Unknown.to_string(), "-");
        assert_eq!(Gesture::Scissors.to_string(), "Scissors");
        assert_eq!(Gesture::from(Move::Paper), Gesture::Paper);
        assert_eq!(Gesture::Rock.to_move(), Some(Move::Rock));
    }
}
