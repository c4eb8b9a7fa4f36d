use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::frame_source::FrameSource;

/// Decodes frames via ffmpeg-next (libavformat + libavcodec).
///
/// Each grab pulls packets until one frame decodes, converts it to RGB24
/// and wraps it in a [`Frame`]. Works for video files and for anything
/// else libavformat can open (pipes, capture device URLs on platforms
/// where ffmpeg supports them).
pub struct FfmpegFrameSource {
    input: Option<ffmpeg_next::format::context::Input>,
    decoder: Option<ffmpeg_next::decoder::Video>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    stream_index: usize,
    width: u32,
    height: u32,
    next_index: u64,
    flushing: bool,
    finished: bool,
}

// Safety: FfmpegFrameSource is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegFrameSource {}

impl FfmpegFrameSource {
    pub fn new() -> Self {
        Self {
            input: None,
            decoder: None,
            scaler: None,
            stream_index: 0,
            width: 0,
            height: 0,
            next_index: 0,
            flushing: false,
            finished: false,
        }
    }

    /// Converts a decoded frame to a tightly packed RGB24 [`Frame`],
    /// dropping any row padding the scaler output carries.
    fn to_frame(
        &mut self,
        decoded: &ffmpeg_next::frame::Video,
    ) -> Result<Frame, Box<dyn std::error::Error>> {
        let scaler = self.scaler.as_mut().ok_or("FfmpegFrameSource: not opened")?;

        let mut rgb = ffmpeg_next::frame::Video::empty();
        scaler.run(decoded, &mut rgb)?;

        let row_len = (self.width as usize) * 3;
        let stride = rgb.stride(0);
        let data = rgb.data(0);

        let mut buf = Vec::with_capacity(row_len * self.height as usize);
        for y in 0..self.height as usize {
            let start = y * stride;
            buf.extend_from_slice(&data[start..start + row_len]);
        }

        let frame = Frame::new(buf, self.width, self.height, self.next_index);
        self.next_index += 1;
        Ok(frame)
    }
}

impl Default for FfmpegFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for FfmpegFrameSource {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("no video stream found")?;

        let stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let width = decoder.width();
        let height = decoder.height();

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let metadata = VideoMetadata {
            width,
            height,
            fps,
            total_frames: stream.frames().max(0) as usize,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };

        self.stream_index = stream_index;
        self.width = width;
        self.height = height;
        self.next_index = 0;
        self.flushing = false;
        self.finished = false;
        self.decoder = Some(decoder);
        self.scaler = Some(scaler);
        self.input = Some(ictx);

        Ok(metadata)
    }

    fn grab(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        if self.finished {
            return Ok(None);
        }
        if self.input.is_none() {
            return Err("FfmpegFrameSource: not opened".into());
        }

        loop {
            // Drain the decoder before feeding more packets
            let mut decoded = ffmpeg_next::frame::Video::empty();
            let received = self
                .decoder
                .as_mut()
                .expect("decoder present while input is open")
                .receive_frame(&mut decoded)
                .is_ok();
            if received {
                return Ok(Some(self.to_frame(&decoded)?));
            }

            if self.flushing {
                // send_eof already issued; the decoder had nothing left
                self.finished = true;
                return Ok(None);
            }

            let input = self.input.as_mut().expect("input checked above");
            let decoder = self.decoder.as_mut().expect("decoder present");
            match input.packets().next() {
                Some((stream, packet)) if stream.index() == self.stream_index => {
                    decoder.send_packet(&packet)?;
                }
                Some(_) => {} // non-video packet, keep reading
                None => {
                    decoder.send_eof()?;
                    self.flushing = true;
                }
            }
        }
    }

    fn close(&mut self) {
        self.input = None;
        self.decoder = None;
        self.scaler = None;
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grab_before_open_is_an_error() {
        let mut source = FfmpegFrameSource::new();
        assert!(source.grab().is_err());
    }

    #[test]
    fn test_close_is_idempotent_and_finishes_the_source() {
        let mut source = FfmpegFrameSource::new();
        source.close();
        source.close();
        // A closed source reports end-of-stream rather than erroring
        assert!(source.grab().unwrap().is_none());
    }

    #[test]
    fn test_open_missing_file_fails() {
        let mut source = FfmpegFrameSource::new();
        assert!(source.open(Path::new("/nonexistent/capture.mp4")).is_err());
    }
}
