use crate::shared::frame::Frame;
use crate::shared::landmark::LandmarkSet;

/// Domain interface for the landmark model.
///
/// The model is an opaque collaborator: one frame in, either a set of
/// named normalized landmarks or `None` for "no detection". The returned
/// set may be partial; consumers degrade missing required points to the
/// no-detection behavior. Implementations may be stateful, hence
/// `&mut self`.
pub trait LandmarkSource: Send {
    fn detect(
        &mut self,
        frame: &Frame,
    ) -> Result<Option<LandmarkSet>, Box<dyn std::error::Error>>;
}
