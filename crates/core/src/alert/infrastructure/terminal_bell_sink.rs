use std::io::Write;

use crate::alert::domain::alert_sink::{AlertSink, AlertTone};

/// Rings the terminal bell and logs the requested tone.
///
/// The terminal has no notion of frequency or duration, so the tone
/// parameters only appear in the log line; a platform beep API plugs in
/// behind the same port where available.
pub struct TerminalBellSink;

impl AlertSink for TerminalBellSink {
    fn alert(&mut self, tone: AlertTone) {
        log::info!(
            "posture alert ({} Hz, {} ms)",
            tone.frequency_hz,
            tone.duration_ms
        );
        let mut stderr = std::io::stderr();
        // A write failure here is not actionable; the alert is best-effort.
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }
}
