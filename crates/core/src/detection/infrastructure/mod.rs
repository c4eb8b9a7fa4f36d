pub mod model_resolver;
pub mod onnx_pose_detector;
