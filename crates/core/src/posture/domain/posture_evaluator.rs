//! The posture rule: vertical alignment of ear, shoulder and hip on one
//! body side, measured as horizontal pixel deltas.

use crate::shared::landmark::{LandmarkKind, LandmarkSet, PixelPoint, Side};

pub const DEFAULT_THRESHOLD_PX: i32 = 40;

/// Overlay line shown when both alignment checks pass.
pub const ALL_CLEAR_LINE: &str = "posture looks good";

/// A way the current posture violates the alignment envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostureFault {
    /// Ear has drifted forward of the shoulder line.
    HeadForward,
    /// Shoulder and hip are not vertically stacked.
    ShoulderHipMisaligned,
}

impl PostureFault {
    pub fn message(&self) -> &'static str {
        match self {
            PostureFault::HeadForward => "don't let your head drop forward",
            PostureFault::ShoulderHipMisaligned => "shoulders and hips are not in line",
        }
    }
}

/// Pixel positions of the three tracked landmarks, kept for rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlignmentPoints {
    pub ear: PixelPoint,
    pub shoulder: PixelPoint,
    pub hip: PixelPoint,
}

/// Per-frame evaluation result. Recomputed every frame, never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct PostureAssessment {
    pub is_good: bool,
    pub faults: Vec<PostureFault>,
    /// Absent when nothing was detected this frame; the overlay then
    /// leaves the frame untouched.
    pub points: Option<AlignmentPoints>,
}

impl PostureAssessment {
    /// The fail-open result used whenever required input is unavailable:
    /// good posture, nothing to draw, no alert.
    fn fail_open() -> Self {
        Self {
            is_good: true,
            faults: Vec::new(),
            points: None,
        }
    }

    /// Text lines for the overlay, top to bottom: one warning per fault,
    /// or a single all-clear line. Empty when there is nothing to draw.
    pub fn overlay_lines(&self) -> Vec<&'static str> {
        if self.points.is_none() {
            return Vec::new();
        }
        if self.faults.is_empty() {
            vec![ALL_CLEAR_LINE]
        } else {
            self.faults.iter().map(|f| f.message()).collect()
        }
    }
}

/// Pure per-frame classifier. Deterministic in its inputs; all state
/// (throttle timestamps) lives elsewhere.
#[derive(Clone, Copy, Debug)]
pub struct PostureEvaluator {
    threshold_px: i32,
    tracked_side: Side,
}

impl PostureEvaluator {
    pub fn new(threshold_px: i32, tracked_side: Side) -> Self {
        Self {
            threshold_px,
            tracked_side,
        }
    }

    pub fn tracked_side(&self) -> Side {
        self.tracked_side
    }

    /// Classifies one frame's landmarks.
    ///
    /// `None` (no detection) and a set missing any required tracked-side
    /// landmark both produce the fail-open assessment; alarming on
    /// tracking dropout would make the monitor unusable.
    pub fn evaluate(
        &self,
        landmarks: Option<&LandmarkSet>,
        frame_width: u32,
        frame_height: u32,
    ) -> PostureAssessment {
        let Some(set) = landmarks else {
            return PostureAssessment::fail_open();
        };

        let side = self.tracked_side;
        let (Some(ear), Some(shoulder), Some(hip)) = (
            set.get(LandmarkKind::Ear, side),
            set.get(LandmarkKind::Shoulder, side),
            set.get(LandmarkKind::Hip, side),
        ) else {
            return PostureAssessment::fail_open();
        };

        let ear_px = PixelPoint::from_normalized(ear, frame_width, frame_height);
        let shoulder_px = PixelPoint::from_normalized(shoulder, frame_width, frame_height);
        let hip_px = PixelPoint::from_normalized(hip, frame_width, frame_height);

        let ear_shoulder_delta = (ear_px.x - shoulder_px.x).abs();
        let shoulder_hip_delta = (shoulder_px.x - hip_px.x).abs();

        // Aligned means strictly inside the tolerance.
        let head_aligned = ear_shoulder_delta < self.threshold_px;
        let torso_aligned = shoulder_hip_delta < self.threshold_px;

        let mut faults = Vec::new();
        if !head_aligned {
            faults.push(PostureFault::HeadForward);
        }
        if !torso_aligned {
            faults.push(PostureFault::ShoulderHipMisaligned);
        }

        PostureAssessment {
            is_good: head_aligned && torso_aligned,
            faults,
            points: Some(AlignmentPoints {
                ear: ear_px,
                shoulder: shoulder_px,
                hip: hip_px,
            }),
        }
    }
}

impl Default for PostureEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_PX, Side::Left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::landmark::Landmark;
    use rstest::rstest;

    const W: u32 = 640;
    const H: u32 = 480;

    /// Builds a left-side landmark set from pixel coordinates, so tests
    /// read in the same units the rule is defined in.
    fn left_side_set(ear: (i32, i32), shoulder: (i32, i32), hip: (i32, i32)) -> LandmarkSet {
        let norm = |(x, y): (i32, i32), kind| {
            Landmark::new(kind, Side::Left, x as f64 / W as f64, y as f64 / H as f64)
        };
        LandmarkSet::new(vec![
            norm(ear, LandmarkKind::Ear),
            norm(shoulder, LandmarkKind::Shoulder),
            norm(hip, LandmarkKind::Hip),
        ])
    }

    // ── Alignment rule ──────────────────────────────────────────────

    #[test]
    fn test_both_deltas_inside_threshold_is_good() {
        // Deltas 5 and 35, both < 40
        let set = left_side_set((300, 100), (305, 200), (340, 300));
        let assessment = PostureEvaluator::default().evaluate(Some(&set), W, H);

        assert!(assessment.is_good);
        assert!(assessment.faults.is_empty());
        let points = assessment.points.unwrap();
        assert_eq!(points.ear, PixelPoint { x: 300, y: 100 });
        assert_eq!(points.shoulder, PixelPoint { x: 305, y: 200 });
        assert_eq!(points.hip, PixelPoint { x: 340, y: 300 });
    }

    #[test]
    fn test_shoulder_hip_violation_alone() {
        // Ear-shoulder delta 5, shoulder-hip delta 95
        let set = left_side_set((300, 100), (305, 200), (400, 300));
        let assessment = PostureEvaluator::default().evaluate(Some(&set), W, H);

        assert!(!assessment.is_good);
        assert_eq!(assessment.faults, vec![PostureFault::ShoulderHipMisaligned]);
    }

    #[test]
    fn test_head_forward_violation_alone() {
        // Ear-shoulder delta 80, shoulder-hip delta 10
        let set = left_side_set((220, 100), (300, 200), (310, 300));
        let assessment = PostureEvaluator::default().evaluate(Some(&set), W, H);

        assert!(!assessment.is_good);
        assert_eq!(assessment.faults, vec![PostureFault::HeadForward]);
    }

    #[test]
    fn test_both_violations_reported_in_order() {
        let set = left_side_set((100, 100), (300, 200), (500, 300));
        let assessment = PostureEvaluator::default().evaluate(Some(&set), W, H);

        assert_eq!(
            assessment.faults,
            vec![
                PostureFault::HeadForward,
                PostureFault::ShoulderHipMisaligned
            ]
        );
    }

    #[rstest]
    #[case::just_inside(39, true)]
    #[case::exactly_at_threshold(40, false)]
    #[case::just_outside(41, false)]
    fn test_threshold_is_strict(#[case] delta: i32, #[case] good: bool) {
        let set = left_side_set((300, 100), (300 + delta, 200), (300 + delta, 300));
        let assessment = PostureEvaluator::default().evaluate(Some(&set), W, H);
        assert_eq!(assessment.is_good, good);
    }

    // ── Fail-open behavior ──────────────────────────────────────────

    #[test]
    fn test_no_detection_is_good_with_no_points() {
        let assessment = PostureEvaluator::default().evaluate(None, W, H);
        assert!(assessment.is_good);
        assert!(assessment.faults.is_empty());
        assert!(assessment.points.is_none());
        assert!(assessment.overlay_lines().is_empty());
    }

    #[test]
    fn test_missing_required_landmark_is_treated_as_no_detection() {
        // Hip missing on the tracked side
        let set = LandmarkSet::new(vec![
            Landmark::new(LandmarkKind::Ear, Side::Left, 0.5, 0.2),
            Landmark::new(LandmarkKind::Shoulder, Side::Left, 0.5, 0.4),
            Landmark::new(LandmarkKind::Hip, Side::Right, 0.5, 0.6),
        ]);
        let assessment = PostureEvaluator::default().evaluate(Some(&set), W, H);
        assert!(assessment.is_good);
        assert!(assessment.points.is_none());
    }

    #[test]
    fn test_tracked_side_selects_landmarks() {
        // Right side aligned, left side wildly off; a right-tracking
        // evaluator must report good posture.
        let set = LandmarkSet::new(vec![
            Landmark::new(LandmarkKind::Ear, Side::Left, 0.1, 0.2),
            Landmark::new(LandmarkKind::Shoulder, Side::Left, 0.5, 0.4),
            Landmark::new(LandmarkKind::Hip, Side::Left, 0.9, 0.6),
            Landmark::new(LandmarkKind::Ear, Side::Right, 0.70, 0.2),
            Landmark::new(LandmarkKind::Shoulder, Side::Right, 0.71, 0.4),
            Landmark::new(LandmarkKind::Hip, Side::Right, 0.72, 0.6),
        ]);

        let right = PostureEvaluator::new(DEFAULT_THRESHOLD_PX, Side::Right);
        assert!(right.evaluate(Some(&set), W, H).is_good);

        let left = PostureEvaluator::default();
        assert!(!left.evaluate(Some(&set), W, H).is_good);
    }

    // ── Overlay lines ───────────────────────────────────────────────

    #[test]
    fn test_overlay_lines_single_all_clear_when_good() {
        let set = left_side_set((300, 100), (305, 200), (340, 300));
        let assessment = PostureEvaluator::default().evaluate(Some(&set), W, H);
        assert_eq!(assessment.overlay_lines(), vec![ALL_CLEAR_LINE]);
    }

    #[test]
    fn test_overlay_lines_one_per_fault() {
        let set = left_side_set((100, 100), (300, 200), (500, 300));
        let assessment = PostureEvaluator::default().evaluate(Some(&set), W, H);
        assert_eq!(
            assessment.overlay_lines(),
            vec![
                PostureFault::HeadForward.message(),
                PostureFault::ShoulderHipMisaligned.message(),
            ]
        );
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let set = left_side_set((300, 100), (305, 200), (400, 300));
        let evaluator = PostureEvaluator::default();
        assert_eq!(
            evaluator.evaluate(Some(&set), W, H),
            evaluator.evaluate(Some(&set), W, H)
        );
    }
}
