//! Posture monitoring core: per-frame landmark geometry evaluation,
//! alert debouncing, and frame annotation.
//!
//! External collaborators (capture, landmark model, display, audio alert)
//! are consumed through domain ports; infrastructure modules provide the
//! shipped adapters.

pub mod alert;
pub mod annotation;
pub mod detection;
pub mod pipeline;
pub mod posture;
pub mod shared;
pub mod video;
