use std::collections::HashMap;
use std::time::Instant;

use crate::alert::domain::alert_sink::AlertTone;

/// Cross-cutting logger for monitor-session events.
///
/// Decouples the frame loop from specific output mechanisms (stdout, GUI
/// signals, log crate) so each caller can observe session behavior
/// without changing the orchestration code.
pub trait MonitorLogger: Send {
    /// One completed tick, identified by its frame index.
    fn tick(&mut self, frame_index: u64);

    /// Record how long a named pipeline stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// The good/bad classification flipped.
    fn posture_changed(&mut self, is_good: bool);

    /// An alert passed the throttle and was handed to the sink.
    fn alert_fired(&mut self, tone: AlertTone);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events; used by tests and by embedders
/// with their own observability.
pub struct NullMonitorLogger;

impl MonitorLogger for NullMonitorLogger {
    fn tick(&mut self, _frame_index: u64) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn posture_changed(&mut self, _is_good: bool) {}
    fn alert_fired(&mut self, _tone: AlertTone) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger: tracks per-stage timing and session counters and
/// prints a summary when the session ends.
///
/// Tick output is throttled to every `throttle_ticks` frames to avoid
/// drowning the terminal at frame-rate cadence.
pub struct StdoutMonitorLogger {
    throttle_ticks: u64,
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
    ticks: u64,
    alerts: u64,
    posture_flips: u64,
}

impl StdoutMonitorLogger {
    pub fn new(throttle_ticks: u64) -> Self {
        Self {
            throttle_ticks: throttle_ticks.max(1),
            timings: HashMap::new(),
            start_time: Instant::now(),
            ticks: 0,
            alerts: 0,
            posture_flips: 0,
        }
    }

    /// Returns the formatted summary string, or `None` if nothing ran.
    pub fn summary_string(&self) -> Option<String> {
        if self.ticks == 0 {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = Vec::new();

        lines.push(format!(
            "Session summary ({} frames, {:.1}s, {} alerts, {} posture changes):",
            self.ticks,
            elapsed_ms / 1000.0,
            self.alerts,
            self.posture_flips,
        ));

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = if durations.is_empty() {
                0.0
            } else {
                total_ms / durations.len() as f64
            };
            lines.push(format!(
                "  {stage:10}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms"
            ));
        }

        Some(lines.join("\n"))
    }
}

impl MonitorLogger for StdoutMonitorLogger {
    fn tick(&mut self, frame_index: u64) {
        self.ticks += 1;
        if frame_index % self.throttle_ticks == 0 {
            println!("frame {frame_index}");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn posture_changed(&mut self, is_good: bool) {
        self.posture_flips += 1;
        println!(
            "posture: {}",
            if is_good { "good" } else { "needs correction" }
        );
    }

    fn alert_fired(&mut self, tone: AlertTone) {
        self.alerts += 1;
        println!("alert ({} Hz, {} ms)", tone.frequency_hz, tone.duration_ms);
    }

    fn info(&mut self, message: &str) {
        println!("{message}");
    }

    fn summary(&self) {
        if let Some(summary) = self.summary_string() {
            println!("{summary}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_empty_without_ticks() {
        let logger = StdoutMonitorLogger::new(30);
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_summary_includes_counters_and_stages() {
        let mut logger = StdoutMonitorLogger::new(30);
        logger.tick(0);
        logger.tick(1);
        logger.timing("detect", 12.0);
        logger.timing("detect", 8.0);
        logger.alert_fired(AlertTone::default());
        logger.posture_changed(false);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("2 frames"));
        assert!(summary.contains("1 alerts"));
        assert!(summary.contains("detect"));
    }

    #[test]
    fn test_throttle_ticks_floor_is_one() {
        // Constructing with 0 must not panic on the modulo in tick()
        let mut logger = StdoutMonitorLogger::new(0);
        logger.tick(0);
    }
}
