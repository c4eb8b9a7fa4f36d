use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::alert::domain::alert_sink::{AlertSink, AlertTone};
use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::detection::domain::landmark_source::LandmarkSource;
use crate::pipeline::monitor_logger::MonitorLogger;
use crate::posture::domain::alert_throttle::AlertThrottle;
use crate::posture::domain::posture_evaluator::PostureEvaluator;
use crate::shared::clock::MonotonicClock;
use crate::video::domain::display_sink::DisplaySink;
use crate::video::domain::frame_source::FrameSource;

/// Outcome counters for a completed monitoring session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MonitorReport {
    pub frames_processed: u64,
    pub alerts_fired: u64,
}

/// The frame loop: on a fixed cadence, pull a frame, detect landmarks,
/// evaluate posture, debounce the alert, annotate, present.
///
/// Strictly sequential; each tick runs to completion before the next is
/// taken, so the throttle timestamp has a single writer by construction.
/// The capture source is closed on every exit path, including errors.
pub struct MonitorPostureUseCase {
    source: Box<dyn FrameSource>,
    detector: Box<dyn LandmarkSource>,
    evaluator: PostureEvaluator,
    throttle: AlertThrottle,
    annotator: Box<dyn FrameAnnotator>,
    alert_sink: Box<dyn AlertSink>,
    display: Box<dyn DisplaySink>,
    clock: Box<dyn MonotonicClock>,
    logger: Box<dyn MonitorLogger>,
    tone: AlertTone,
    tick_interval: Duration,
    max_frames: Option<u64>,
    cancelled: Arc<AtomicBool>,
}

impl MonitorPostureUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Box<dyn LandmarkSource>,
        evaluator: PostureEvaluator,
        throttle: AlertThrottle,
        annotator: Box<dyn FrameAnnotator>,
        alert_sink: Box<dyn AlertSink>,
        display: Box<dyn DisplaySink>,
        clock: Box<dyn MonotonicClock>,
        logger: Box<dyn MonitorLogger>,
        tone: AlertTone,
        tick_interval: Duration,
        max_frames: Option<u64>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            source,
            detector,
            evaluator,
            throttle,
            annotator,
            alert_sink,
            display,
            clock,
            logger,
            tone,
            tick_interval,
            max_frames,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    /// Runs the session until the source ends, the frame limit is
    /// reached, or cancellation is requested.
    pub fn execute(&mut self, input: &Path) -> Result<MonitorReport, Box<dyn std::error::Error>> {
        let metadata = self.source.open(input)?;
        self.logger.info(&format!(
            "monitoring {}x{} ({}), tracking {} side",
            metadata.width,
            metadata.height,
            metadata.codec,
            self.evaluator.tracked_side(),
        ));

        let result = self.run_loop();
        self.source.close();
        self.logger.summary();
        result
    }

    fn run_loop(&mut self) -> Result<MonitorReport, Box<dyn std::error::Error>> {
        let ticker = crossbeam_channel::tick(self.tick_interval);
        let mut report = MonitorReport::default();
        let mut previous_good: Option<bool> = None;

        loop {
            if self.cancelled.load(Ordering::Relaxed) {
                break;
            }
            if self
                .max_frames
                .is_some_and(|limit| report.frames_processed >= limit)
            {
                break;
            }

            ticker.recv()?;
            if self.cancelled.load(Ordering::Relaxed) {
                break;
            }

            // Acquisition failure skips this tick with no state change.
            let mut frame = match self.source.grab() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    log::warn!("frame acquisition failed: {e}");
                    continue;
                }
            };

            let started = Instant::now();
            let landmarks = self.detector.detect(&frame)?;
            self.logger.timing("detect", elapsed_ms(started));

            let started = Instant::now();
            let assessment =
                self.evaluator
                    .evaluate(landmarks.as_ref(), frame.width(), frame.height());
            if previous_good != Some(assessment.is_good) {
                self.logger.posture_changed(assessment.is_good);
                previous_good = Some(assessment.is_good);
            }

            if self.throttle.should_fire(assessment.is_good, self.clock.elapsed()) {
                self.alert_sink.alert(self.tone);
                self.logger.alert_fired(self.tone);
                report.alerts_fired += 1;
            }
            self.logger.timing("evaluate", elapsed_ms(started));

            let started = Instant::now();
            self.annotator.annotate(&mut frame, &assessment)?;
            self.display.present(&frame)?;
            self.logger.timing("render", elapsed_ms(started));

            self.logger.tick(frame.index());
            report.frames_processed += 1;
        }

        Ok(report)
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
