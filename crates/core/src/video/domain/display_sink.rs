use crate::shared::frame::Frame;

/// Receives annotated frames for presentation.
///
/// The pipeline hands over frames at native capture resolution; any
/// presentation scaling is the sink's business.
pub trait DisplaySink: Send {
    fn present(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;
}

/// Sink that discards frames; used for alert-only (headless) sessions.
pub struct NullDisplaySink;

impl DisplaySink for NullDisplaySink {
    fn present(&mut self, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}
