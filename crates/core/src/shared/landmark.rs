//! Normalized body landmarks and their pixel-space projection.
//!
//! Landmarks are produced fresh each frame by a detector and carry no
//! cross-frame identity; everything here is a value type.

use serde::{Deserialize, Serialize};

/// Body side a landmark belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Anatomical identity of a landmark, restricted to the points the
/// posture rule consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LandmarkKind {
    Ear,
    Shoulder,
    Hip,
}

/// A named anatomical point in normalized image coordinates.
///
/// `(x, y)` nominally lie in `[0, 1]²`; detectors may emit slightly
/// out-of-range values at frame edges, which pixel projection clamps.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmark {
    pub kind: LandmarkKind,
    pub side: Side,
    pub x: f64,
    pub y: f64,
}

impl Landmark {
    pub fn new(kind: LandmarkKind, side: Side, x: f64, y: f64) -> Self {
        Self { kind, side, x, y }
    }
}

/// One frame's worth of detected landmarks.
///
/// May be partial: a detector that loses track of a point simply omits it,
/// and consumers degrade to their no-detection behavior.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LandmarkSet {
    landmarks: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    /// First landmark matching the given identity, if detected this frame.
    pub fn get(&self, kind: LandmarkKind, side: Side) -> Option<&Landmark> {
        self.landmarks
            .iter()
            .find(|lm| lm.kind == kind && lm.side == side)
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }
}

/// Integer pixel coordinates derived from a normalized landmark.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    /// Projects a normalized landmark into the pixel grid of a
    /// `width` × `height` frame: round, then clamp into the frame
    /// rectangle so out-of-range coordinates stay drawable.
    pub fn from_normalized(landmark: &Landmark, width: u32, height: u32) -> Self {
        let x = (landmark.x * width as f64).round() as i64;
        let y = (landmark.y * height as f64).round() as i64;
        Self {
            x: x.clamp(0, width as i64 - 1) as i32,
            y: y.clamp(0, height as i64 - 1) as i32,
        }
    }
}
