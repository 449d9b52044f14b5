//! 检测模块：技术检测核心逻辑
pub mod accumulator;
pub mod analyzer;
pub mod detector;

// 导出核心接口
pub use self::accumulator::{format_app_version, Accumulator};
pub use self::detector::{detect_technologies, TechDetector};
