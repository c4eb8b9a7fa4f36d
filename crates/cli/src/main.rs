use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;

use slouchguard_core::alert::domain::alert_sink::AlertTone;
use slouchguard_core::alert::infrastructure::terminal_bell_sink::TerminalBellSink;
use slouchguard_core::annotation::infrastructure::font_resolver;
use slouchguard_core::annotation::infrastructure::overlay_annotator::OverlayAnnotator;
use slouchguard_core::detection::infrastructure::model_resolver;
use slouchguard_core::detection::infrastructure::onnx_pose_detector::OnnxPoseDetector;
use slouchguard_core::pipeline::monitor_logger::StdoutMonitorLogger;
use slouchguard_core::pipeline::monitor_posture_use_case::MonitorPostureUseCase;
use slouchguard_core::posture::domain::alert_throttle::AlertThrottle;
use slouchguard_core::posture::domain::posture_evaluator::PostureEvaluator;
use slouchguard_core::shared::clock::SessionClock;
use slouchguard_core::shared::constants::{POSE_MODEL_NAME, POSE_MODEL_URL};
use slouchguard_core::shared::landmark::Side;
use slouchguard_core::shared::monitor_config::MonitorConfig;
use slouchguard_core::video::domain::display_sink::{DisplaySink, NullDisplaySink};
use slouchguard_core::video::infrastructure::ffmpeg_source::FfmpegFrameSource;
use slouchguard_core::video::infrastructure::image_sequence_sink::ImageSequenceSink;

/// Webcam posture monitor: beeps when ear, shoulder and hip drift out of
/// vertical alignment.
#[derive(Parser)]
#[command(name = "slouchguard")]
struct Cli {
    /// Input video source (file, pipe, or any URL ffmpeg can open).
    input: PathBuf,

    /// Directory for annotated output frames (omit for alert-only runs).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Presentation size for output frames, e.g. 960x540.
    #[arg(long)]
    output_size: Option<String>,

    /// Tracked body side: left or right.
    #[arg(long)]
    side: Option<String>,

    /// Horizontal alignment tolerance in pixels.
    #[arg(long)]
    threshold_px: Option<i32>,

    /// Minimum seconds between audible alerts.
    #[arg(long)]
    alert_interval: Option<u64>,

    /// Frame-loop cadence in milliseconds.
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Person-detection confidence threshold (0.0-1.0).
    #[arg(long)]
    confidence: Option<f64>,

    /// Pose model path (skips cache lookup and download).
    #[arg(long)]
    model: Option<PathBuf>,

    /// Overlay font path (TTF/OTF).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<u64>,

    /// Persist the effective options as the new defaults.
    #[arg(long)]
    save_config: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = effective_config(&cli)?;

    if cli.save_config {
        config.save()?;
        log::info!("saved configuration");
    }

    let model_path = match &cli.model {
        Some(path) => path.clone(),
        None => {
            log::info!("resolving pose model {POSE_MODEL_NAME}");
            model_resolver::resolve(POSE_MODEL_NAME, POSE_MODEL_URL, None, None)?
        }
    };
    let detector = OnnxPoseDetector::new(&model_path, config.detection_confidence)?;

    // An explicit font that fails to load is an error; a failed automatic
    // lookup just disables overlay text.
    let font = if cli.font.is_some() {
        Some(font_resolver::resolve(cli.font.as_deref())?)
    } else {
        match font_resolver::resolve(None) {
            Ok(font) => Some(font),
            Err(e) => {
                log::warn!("overlay text disabled: {e}");
                None
            }
        }
    };

    let output_size = cli.output_size.as_deref().map(parse_size).transpose()?;
    let display: Box<dyn DisplaySink> = match &cli.output {
        Some(dir) => Box::new(ImageSequenceSink::new(dir.clone(), output_size)),
        None => Box::new(NullDisplaySink),
    };

    let mut use_case = MonitorPostureUseCase::new(
        Box::new(FfmpegFrameSource::new()),
        Box::new(detector),
        PostureEvaluator::new(config.threshold_px, config.tracked_side),
        AlertThrottle::new(Duration::from_secs(config.min_alert_interval_secs)),
        Box::new(OverlayAnnotator::new(font)),
        Box::new(TerminalBellSink),
        display,
        Box::new(SessionClock::new()),
        Box::new(StdoutMonitorLogger::new(30)),
        AlertTone::default(),
        Duration::from_millis(config.tick_interval_ms),
        cli.max_frames,
        None,
    );

    let report = use_case.execute(&cli.input)?;
    println!(
        "done: {} frames, {} alerts",
        report.frames_processed, report.alerts_fired
    );
    Ok(())
}

/// Stored configuration overridden by whatever flags were given.
fn effective_config(cli: &Cli) -> Result<MonitorConfig, Box<dyn std::error::Error>> {
    let mut config = MonitorConfig::load_or_default();
    if let Some(side) = &cli.side {
        config.tracked_side = parse_side(side)?;
    }
    if let Some(threshold) = cli.threshold_px {
        config.threshold_px = threshold;
    }
    if let Some(interval) = cli.alert_interval {
        config.min_alert_interval_secs = interval;
    }
    if let Some(tick) = cli.tick_ms {
        config.tick_interval_ms = tick;
    }
    if let Some(confidence) = cli.confidence {
        config.detection_confidence = confidence;
    }
    Ok(config)
}

fn parse_side(value: &str) -> Result<Side, Box<dyn std::error::Error>> {
    match value.to_ascii_lowercase().as_str() {
        "left" => Ok(Side::Left),
        "right" => Ok(Side::Right),
        other => Err(format!("unknown side '{other}' (expected left or right)").into()),
    }
}

fn parse_size(value: &str) -> Result<(u32, u32), Box<dyn std::error::Error>> {
    let (w, h) = value
        .split_once('x')
        .ok_or_else(|| format!("invalid size '{value}' (expected WIDTHxHEIGHT)"))?;
    Ok((w.parse()?, h.parse()?))
}
