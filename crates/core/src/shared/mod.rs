pub mod clock;
pub mod constants;
pub mod frame;
pub mod landmark;
pub mod monitor_config;
pub mod video_metadata;
