use crate::posture::domain::posture_evaluator::PostureAssessment;
use crate::shared::frame::Frame;

/// Domain interface for drawing posture feedback onto a frame.
///
/// Implementations must be pure in the assessment: same assessment and
/// frame dimensions produce the same overlay geometry, and the assessment
/// itself is never mutated. A frame whose assessment carries no pixel
/// points is returned untouched.
pub trait FrameAnnotator: Send {
    fn annotate(
        &self,
        frame: &mut Frame,
        assessment: &PostureAssessment,
    ) -> Result<(), Box<dyn std::error::Error>>;
}

/// Annotator that draws nothing; used when the caller only wants alerts.
pub struct NullFrameAnnotator;

impl FrameAnnotator for NullFrameAnnotator {
    fn annotate(
        &self,
        _frame: &mut Frame,
        _assessment: &PostureAssessment,
    ) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}
