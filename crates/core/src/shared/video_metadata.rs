use std::path::PathBuf;

/// Description of an opened capture source.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Total frame count when known; 0 for live sources.
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}
