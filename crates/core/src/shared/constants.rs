pub const POSE_MODEL_NAME: &str = "yolo11n-pose.onnx";
pub const POSE_MODEL_URL: &str =
    "https://github.com/ultralytics/assets/releases/download/v8.3.0/yolo11n-pose.onnx";

/// Preferred overlay font file name, looked up by the font resolver.
pub const OVERLAY_FONT_NAME: &str = "DejaVuSans.ttf";
