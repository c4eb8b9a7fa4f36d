/// Pose landmark detector using a YOLO-pose ONNX model via `ort`.
///
/// Handles letterbox preprocessing, inference, and decoding of the
/// highest-confidence person into the posture domain's `LandmarkSet`.
/// Multi-person tracking is out of scope, so at most one detection
/// survives per frame.
use std::path::Path;

use crate::detection::domain::landmark_source::LandmarkSource;
use crate::shared::frame::Frame;
use crate::shared::landmark::{Landmark, LandmarkKind, LandmarkSet, Side};

/// Fallback model input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

/// Default confidence threshold for person detection.
pub const DEFAULT_CONFIDENCE: f64 = 0.25;

/// Minimum keypoint confidence to treat a landmark as detected.
const KEYPOINT_CONF_THRESH: f64 = 0.5;

/// COCO keypoint layout used by YOLO-pose models.
const NUM_KEYPOINTS: usize = 17;

/// (COCO keypoint index, landmark identity) for the points the posture
/// rule consumes; the other eleven keypoints are dropped at this boundary.
const TRACKED_KEYPOINTS: [(usize, LandmarkKind, Side); 6] = [
    (3, LandmarkKind::Ear, Side::Left),
    (4, LandmarkKind::Ear, Side::Right),
    (5, LandmarkKind::Shoulder, Side::Left),
    (6, LandmarkKind::Shoulder, Side::Right),
    (11, LandmarkKind::Hip, Side::Left),
    (12, LandmarkKind::Hip, Side::Right),
];

/// Landmark detector backed by an ONNX Runtime session.
pub struct OnnxPoseDetector {
    session: ort::session::Session,
    confidence: f64,
    input_size: u32,
}

impl OnnxPoseDetector {
    /// Load a YOLO-pose ONNX model and prepare for inference.
    ///
    /// The input resolution is read from the model's input shape
    /// (expecting NCHW). Falls back to 640 if the shape is dynamic or
    /// unreadable.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;

        // Try to read input size from model metadata (NCHW: [1, 3, H, W])
        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        Ok(Self {
            session,
            confidence,
            input_size,
        })
    }
}

impl LandmarkSource for OnnxPoseDetector {
    fn detect(
        &mut self,
        frame: &Frame,
    ) -> Result<Option<LandmarkSet>, Box<dyn std::error::Error>> {
        // 1. Preprocess: letterbox + normalize → NCHW float32
        let (input_tensor, scale, pad_x, pad_y) = letterbox(frame, self.input_size);

        // 2. Inference
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("pose model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape();

        // YOLO output is [1, num_features, num_detections] (transposed)
        // or [1, num_detections, num_features]. Handle both.
        let (num_dets, num_feats, transposed) = if shape.len() == 3 {
            if shape[1] < shape[2] {
                (shape[2], shape[1], true)
            } else {
                (shape[1], shape[2], false)
            }
        } else {
            return Err(format!("unexpected pose model output shape: {shape:?}").into());
        };

        let data = tensor.as_slice().ok_or("cannot get tensor slice")?;

        // 3. Decode: keep only the highest-confidence person
        let Some(pose) = best_pose(data, num_dets, num_feats, transposed, self.confidence)
        else {
            return Ok(None);
        };

        Ok(Some(to_landmark_set(
            &pose,
            scale,
            pad_x,
            pad_y,
            frame.width(),
            frame.height(),
        )))
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Letterbox-resize a frame to `target_size` × `target_size`.
///
/// Returns `(NCHW float32 tensor, scale, pad_x, pad_y)`.
fn letterbox(frame: &Frame, target_size: u32) -> (ndarray::Array4<f32>, f64, u32, u32) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = (fw * scale).round() as u32;
    let new_h = (fh * scale).round() as u32;
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    // Pad with 114/255 gray, the YOLO convention
    let gray = 114.0f32 / 255.0;
    let mut tensor =
        ndarray::Array4::<f32>::from_elem((1, 3, target_size as usize, target_size as usize), gray);

    let src = frame.as_ndarray(); // [H, W, C] u8
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    // Nearest-neighbor resize + copy into the padded region
    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    (tensor, scale, pad_x, pad_y)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// One decoded person: detection confidence plus keypoints in letterbox
/// pixel coordinates, each `(x, y, confidence)`.
#[derive(Clone, Debug)]
struct RawPose {
    confidence: f64,
    keypoints: [(f64, f64, f64); NUM_KEYPOINTS],
}

/// Scans all candidate detections and keeps the most confident person
/// at or above `min_confidence`.
///
/// Row format: `[cx, cy, w, h, conf, kp0_x, kp0_y, kp0_conf, ...]`.
fn best_pose(
    data: &[f32],
    num_dets: usize,
    num_feats: usize,
    transposed: bool,
    min_confidence: f64,
) -> Option<RawPose> {
    if num_feats < 5 + NUM_KEYPOINTS * 3 {
        return None;
    }

    let mut best: Option<RawPose> = None;
    for i in 0..num_dets {
        let at = |f: usize| -> f64 {
            if transposed {
                data[f * num_dets + i] as f64
            } else {
                data[i * num_feats + f] as f64
            }
        };

        let conf = at(4);
        if conf < min_confidence {
            continue;
        }
        if best.as_ref().is_some_and(|b| b.confidence >= conf) {
            continue;
        }

        let mut keypoints = [(0.0, 0.0, 0.0); NUM_KEYPOINTS];
        for (k, kp) in keypoints.iter_mut().enumerate() {
            *kp = (at(5 + k * 3), at(5 + k * 3 + 1), at(5 + k * 3 + 2));
        }
        best = Some(RawPose {
            confidence: conf,
            keypoints,
        });
    }
    best
}

/// Maps a decoded pose back through the letterbox transform and into
/// normalized frame coordinates, gating each keypoint on its confidence.
fn to_landmark_set(
    pose: &RawPose,
    scale: f64,
    pad_x: u32,
    pad_y: u32,
    frame_width: u32,
    frame_height: u32,
) -> LandmarkSet {
    let mut landmarks = Vec::with_capacity(TRACKED_KEYPOINTS.len());
    for (index, kind, side) in TRACKED_KEYPOINTS {
        let (kx, ky, kconf) = pose.keypoints[index];
        if kconf < KEYPOINT_CONF_THRESH {
            continue;
        }
        let x = (kx - pad_x as f64) / scale / frame_width as f64;
        let y = (ky - pad_y as f64) / scale / frame_height as f64;
        landmarks.push(Landmark::new(kind, side, x, y));
    }
    LandmarkSet::new(landmarks)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const NUM_FEATS: usize = 5 + NUM_KEYPOINTS * 3;

    /// Builds row-major (non-transposed) output data for the given
    /// detections: each `(confidence, keypoint_seed)`.
    fn rows(dets: &[(f32, f32)]) -> Vec<f32> {
        let mut data = vec![0.0; dets.len() * NUM_FEATS];
        for (i, (conf, seed)) in dets.iter().enumerate() {
            let row = &mut data[i * NUM_FEATS..(i + 1) * NUM_FEATS];
            row[4] = *conf;
            for k in 0..NUM_KEYPOINTS {
                row[5 + k * 3] = seed + k as f32;
                row[5 + k * 3 + 1] = seed + k as f32 + 100.0;
                row[5 + k * 3 + 2] = 0.9;
            }
        }
        data
    }

    // ── Letterbox ───────────────────────────────────────────────────

    #[test]
    fn test_letterbox_preserves_aspect_ratio() {
        // 200x100 frame → 640x640: scale = min(3.2, 6.4) = 3.2,
        // new_h = 320, vertical padding (640-320)/2 = 160
        let frame = Frame::blank(200, 100, 0);
        let (tensor, scale, pad_x, pad_y) = letterbox(&frame, 640);

        assert_relative_eq!(scale, 3.2);
        assert_eq!(pad_x, 0);
        assert_eq!(pad_y, 160);
        assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
    }

    #[test]
    fn test_letterbox_pads_with_yolo_gray() {
        let frame = Frame::blank(200, 100, 0);
        let (tensor, _, _, pad_y) = letterbox(&frame, 640);

        let gray = 114.0 / 255.0;
        // Inside the padding band
        assert_relative_eq!(tensor[[0, 0, (pad_y - 1) as usize, 320]], gray);
        // Inside the image region: source is black
        assert_relative_eq!(tensor[[0, 0, pad_y as usize, 0]], 0.0);
    }

    #[test]
    fn test_letterbox_square_input_has_no_padding() {
        let frame = Frame::blank(320, 320, 0);
        let (_, scale, pad_x, pad_y) = letterbox(&frame, 640);
        assert_relative_eq!(scale, 2.0);
        assert_eq!((pad_x, pad_y), (0, 0));
    }

    // ── Best-pose selection ─────────────────────────────────────────

    #[test]
    fn test_best_pose_picks_highest_confidence() {
        let data = rows(&[(0.4, 10.0), (0.8, 50.0), (0.6, 90.0)]);
        let pose = best_pose(&data, 3, NUM_FEATS, false, 0.25).unwrap();
        assert_relative_eq!(pose.confidence, 0.8, epsilon = 1e-6);
        assert_relative_eq!(pose.keypoints[0].0, 50.0, epsilon = 1e-4);
    }

    #[test]
    fn test_best_pose_none_below_threshold() {
        let data = rows(&[(0.1, 10.0), (0.2, 50.0)]);
        assert!(best_pose(&data, 2, NUM_FEATS, false, 0.25).is_none());
    }

    #[test]
    fn test_best_pose_reads_transposed_layout() {
        // Transpose rows() output into [features][detections]
        let row_major = rows(&[(0.3, 10.0), (0.7, 40.0)]);
        let mut transposed = vec![0.0; row_major.len()];
        for det in 0..2 {
            for feat in 0..NUM_FEATS {
                transposed[feat * 2 + det] = row_major[det * NUM_FEATS + feat];
            }
        }

        let pose = best_pose(&transposed, 2, NUM_FEATS, true, 0.25).unwrap();
        assert_relative_eq!(pose.confidence, 0.7, epsilon = 1e-6);
        assert_relative_eq!(pose.keypoints[2].1, 142.0, epsilon = 1e-4);
    }

    #[test]
    fn test_best_pose_rejects_truncated_rows() {
        let data = vec![0.9; 10];
        assert!(best_pose(&data, 2, 5, false, 0.25).is_none());
    }

    // ── Landmark mapping ────────────────────────────────────────────

    fn pose_with_keypoint(index: usize, x: f64, y: f64, conf: f64) -> RawPose {
        let mut keypoints = [(0.0, 0.0, 0.0); NUM_KEYPOINTS];
        keypoints[index] = (x, y, conf);
        RawPose {
            confidence: 0.9,
            keypoints,
        }
    }

    #[test]
    fn test_mapping_undoes_letterbox_and_normalizes() {
        // 640x640 letterbox of a 320x240 frame: scale = 2.0,
        // pad_x = 0, pad_y = (640 - 480) / 2 = 80.
        // Left shoulder at letterbox (320, 320) → frame (160, 120)
        // → normalized (0.5, 0.5).
        let pose = pose_with_keypoint(5, 320.0, 320.0, 0.9);
        let set = to_landmark_set(&pose, 2.0, 0, 80, 320, 240);

        let shoulder = set.get(LandmarkKind::Shoulder, Side::Left).unwrap();
        assert_relative_eq!(shoulder.x, 0.5);
        assert_relative_eq!(shoulder.y, 0.5);
    }

    #[test]
    fn test_mapping_drops_low_confidence_keypoints() {
        let mut pose = pose_with_keypoint(3, 100.0, 100.0, 0.9);
        pose.keypoints[11] = (200.0, 200.0, 0.2); // left hip, below gate

        let set = to_landmark_set(&pose, 1.0, 0, 0, 640, 480);
        assert!(set.get(LandmarkKind::Ear, Side::Left).is_some());
        assert!(set.get(LandmarkKind::Hip, Side::Left).is_none());
    }

    #[test]
    fn test_mapping_keeps_only_tracked_identities() {
        // All 17 keypoints confident → exactly the six tracked ones kept
        let mut keypoints = [(0.0, 0.0, 0.0); NUM_KEYPOINTS];
        for kp in keypoints.iter_mut() {
            *kp = (100.0, 100.0, 0.9);
        }
        let pose = RawPose {
            confidence: 0.9,
            keypoints,
        };
        let set = to_landmark_set(&pose, 1.0, 0, 0, 640, 480);
        assert_eq!(set.len(), 6);
    }
}
