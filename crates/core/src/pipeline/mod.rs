pub mod monitor_logger;
pub mod monitor_posture_use_case;
