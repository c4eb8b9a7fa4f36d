use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Pulls frames from a capture device or video source.
///
/// Implementations handle the acquisition details (device API, codec,
/// pixel format) while the monitor loop works with the abstract `Frame`.
pub trait FrameSource: Send {
    /// Opens the source and returns its metadata.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Acquires the next frame.
    ///
    /// `Ok(None)` means the source is exhausted (end of stream);
    /// `Err` means this acquisition failed and the caller should skip
    /// the current tick without any state change.
    fn grab(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    /// Releases the capture resource. Must be safe to call more than
    /// once; the monitor loop calls it on every exit path.
    fn close(&mut self);
}
