//! Overlay rendering: landmark markers, alignment segments and warning
//! text drawn straight into the frame's pixel buffer.

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_text_mut};

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::posture::domain::posture_evaluator::PostureAssessment;
use crate::shared::frame::Frame;
use crate::shared::landmark::PixelPoint;

pub const GOOD_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const BAD_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

const EAR_MARKER: (i32, Rgb<u8>) = (6, Rgb([255, 255, 0]));
const SHOULDER_MARKER: (i32, Rgb<u8>) = (8, Rgb([0, 255, 0]));
const HIP_MARKER: (i32, Rgb<u8>) = (8, Rgb([0, 0, 255]));

/// Text block layout: first baseline at (50, 50), one line per entry.
const TEXT_ORIGIN: (i32, i32) = (50, 50);
const LINE_PITCH: i32 = 40;
const TEXT_SCALE: f32 = 28.0;

/// Draws posture feedback with `imageproc`.
///
/// Built with an optional font: without one (headless systems with no
/// resolvable TTF) the text block is skipped and markers/segments are
/// still drawn.
pub struct OverlayAnnotator {
    font: Option<FontArc>,
}

impl OverlayAnnotator {
    pub fn new(font: Option<FontArc>) -> Self {
        Self { font }
    }
}

impl FrameAnnotator for OverlayAnnotator {
    fn annotate(
        &self,
        frame: &mut Frame,
        assessment: &PostureAssessment,
    ) -> Result<(), Box<dyn std::error::Error>> {
        // No detection this frame: the overlay stays off entirely.
        let Some(points) = &assessment.points else {
            return Ok(());
        };

        let mut canvas =
            RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
                .ok_or("frame buffer does not match its dimensions")?;

        let posture_color = if assessment.is_good {
            GOOD_COLOR
        } else {
            BAD_COLOR
        };

        // Alignment segments under the markers, one shared color policy.
        draw_line_segment_mut(
            &mut canvas,
            as_f32(points.ear),
            as_f32(points.shoulder),
            posture_color,
        );
        draw_line_segment_mut(
            &mut canvas,
            as_f32(points.shoulder),
            as_f32(points.hip),
            posture_color,
        );

        let (ear_radius, ear_color) = EAR_MARKER;
        let (shoulder_radius, shoulder_color) = SHOULDER_MARKER;
        let (hip_radius, hip_color) = HIP_MARKER;
        draw_filled_circle_mut(&mut canvas, (points.ear.x, points.ear.y), ear_radius, ear_color);
        draw_filled_circle_mut(
            &mut canvas,
            (points.shoulder.x, points.shoulder.y),
            shoulder_radius,
            shoulder_color,
        );
        draw_filled_circle_mut(&mut canvas, (points.hip.x, points.hip.y), hip_radius, hip_color);

        if let Some(font) = &self.font {
            let scale = PxScale::from(TEXT_SCALE);
            let (x, mut y) = TEXT_ORIGIN;
            for line in assessment.overlay_lines() {
                draw_text_mut(&mut canvas, posture_color, x, y, scale, font, line);
                y += LINE_PITCH;
            }
        }

        frame.data_mut().copy_from_slice(canvas.as_raw());
        Ok(())
    }
}

fn as_f32(p: PixelPoint) -> (f32, f32) {
    (p.x as f32, p.y as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posture::domain::posture_evaluator::{AlignmentPoints, PostureFault};

    fn assessment(is_good: bool, points: Option<AlignmentPoints>) -> PostureAssessment {
        PostureAssessment {
            is_good,
            faults: if is_good {
                vec![]
            } else {
                vec![PostureFault::ShoulderHipMisaligned]
            },
            points,
        }
    }

    fn upright_points() -> AlignmentPoints {
        AlignmentPoints {
            ear: PixelPoint { x: 30, y: 10 },
            shoulder: PixelPoint { x: 32, y: 40 },
            hip: PixelPoint { x: 35, y: 70 },
        }
    }

    fn annotator() -> OverlayAnnotator {
        // Geometry-only: tests never depend on a system font.
        OverlayAnnotator::new(None)
    }

    #[test]
    fn test_no_points_leaves_frame_untouched() {
        let mut frame = Frame::blank(80, 80, 0);
        let before = frame.clone();
        annotator()
            .annotate(&mut frame, &assessment(true, None))
            .unwrap();
        assert_eq!(frame, before);
    }

    #[test]
    fn test_markers_are_drawn_at_landmark_positions() {
        let mut frame = Frame::blank(80, 80, 0);
        let points = upright_points();
        annotator()
            .annotate(&mut frame, &assessment(true, Some(points)))
            .unwrap();

        assert_eq!(frame.pixel(30, 10), [255, 255, 0]); // ear: yellow
        assert_eq!(frame.pixel(32, 40), [0, 255, 0]); // shoulder: green
        assert_eq!(frame.pixel(35, 70), [0, 0, 255]); // hip: blue
    }

    #[test]
    fn test_segment_color_tracks_posture() {
        let points = AlignmentPoints {
            ear: PixelPoint { x: 10, y: 10 },
            shoulder: PixelPoint { x: 10, y: 60 },
            hip: PixelPoint { x: 10, y: 75 },
        };
        // Midpoint of the vertical ear-shoulder segment, outside both
        // marker radii.
        let probe = (10, 30);

        let mut good_frame = Frame::blank(80, 80, 0);
        annotator()
            .annotate(&mut good_frame, &assessment(true, Some(points)))
            .unwrap();
        assert_eq!(good_frame.pixel(probe.0, probe.1), [0, 255, 0]);

        let mut bad_frame = Frame::blank(80, 80, 0);
        annotator()
            .annotate(&mut bad_frame, &assessment(false, Some(points)))
            .unwrap();
        assert_eq!(bad_frame.pixel(probe.0, probe.1), [255, 0, 0]);
    }

    #[test]
    fn test_annotation_is_deterministic() {
        let a = assessment(false, Some(upright_points()));
        let mut first = Frame::blank(80, 80, 0);
        let mut second = Frame::blank(80, 80, 0);
        annotator().annotate(&mut first, &a).unwrap();
        annotator().annotate(&mut second, &a).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_annotation_is_idempotent_on_geometry() {
        let a = assessment(false, Some(upright_points()));
        let mut frame = Frame::blank(80, 80, 0);
        annotator().annotate(&mut frame, &a).unwrap();
        let once = frame.clone();
        annotator().annotate(&mut frame, &a).unwrap();
        assert_eq!(frame, once);
    }

    #[test]
    fn test_assessment_is_not_mutated() {
        let a = assessment(false, Some(upright_points()));
        let reference = a.clone();
        let mut frame = Frame::blank(80, 80, 0);
        annotator().annotate(&mut frame, &a).unwrap();
        assert_eq!(a, reference);
    }

    #[test]
    fn test_underlying_image_survives_outside_overlay() {
        let mut frame = Frame::blank(80, 80, 0);
        frame.put_pixel(79, 79, [9, 9, 9]);
        annotator()
            .annotate(&mut frame, &assessment(true, Some(upright_points())))
            .unwrap();
        assert_eq!(frame.pixel(79, 79), [9, 9, 9]);
    }
}
