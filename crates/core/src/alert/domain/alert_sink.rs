/// Tone parameters handed to the alert primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlertTone {
    pub frequency_hz: u32,
    pub duration_ms: u64,
}

impl Default for AlertTone {
    fn default() -> Self {
        Self {
            frequency_hz: 1000,
            duration_ms: 500,
        }
    }
}

/// Fire-and-forget boundary to the platform's audible alert.
///
/// The pipeline never waits for the sound to finish and never observes
/// whether it played, so there is no return value.
pub trait AlertSink: Send {
    fn alert(&mut self, tone: AlertTone);
}

/// Sink that swallows alerts; used in tests and silent sessions.
pub struct NullAlertSink;

impl AlertSink for NullAlertSink {
    fn alert(&mut self, _tone: AlertTone) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tone() {
        let tone = AlertTone::default();
        assert_eq!(tone.frequency_hz, 1000);
        assert_eq!(tone.duration_ms, 500);
    }
}
