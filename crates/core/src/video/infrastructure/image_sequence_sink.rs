use std::path::PathBuf;

use crate::shared::frame::Frame;
use crate::video::domain::display_sink::DisplaySink;

/// Presents annotated frames as numbered image files using the `image`
/// crate.
///
/// Doubles as a headless "display": the monitor writes
/// `frame_000123.png`-style files into the target directory, optionally
/// resized to a presentation size.
pub struct ImageSequenceSink {
    dir: PathBuf,
    size: Option<(u32, u32)>,
}

impl ImageSequenceSink {
    pub fn new(dir: PathBuf, size: Option<(u32, u32)>) -> Self {
        Self { dir, size }
    }

    fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{index:06}.png"))
    }
}

impl DisplaySink for ImageSequenceSink {
    fn present(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::create_dir_all(&self.dir)?;

        let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or("failed to create image from frame data")?;

        let img = if let Some((w, h)) = self.size {
            image::imageops::resize(&img, w, h, image::imageops::FilterType::Triangle)
        } else {
            img
        };

        img.save(self.frame_path(frame.index()))?;
        Ok(())
    }
}
