//! rswebtech - 基于指纹规则库的网站技术栈识别引擎
//!
//! 给定一次HTTP响应的Header与Body，识别其使用的Web技术、
//! 可提取的版本号以及分类/CPE等元数据。指纹库在构建检测器时
//! 一次性编译，之后只读，可跨线程共享任意并发检测。

// 导出全局错误类型
pub use self::error::{RswebtechError, RwtResult};

// 导出配置模块
pub use self::config::{DetectorConfig, DetectorConfigBuilder};

// 导出指纹模块核心接口
pub use self::fingerprint::{
    AppInfo, CatalogLoader, CategoryItem, CatsInfo, Fingerprint, FingerprintCatalog,
};

// 导出编译模块核心接口
pub use self::compiler::{
    CatalogCompiler, CompiledCatalog, CompiledDomRule, CompiledFingerprint, CompiledPattern,
    ImpliedTech,
};

// 导出提取模块核心接口
pub use self::extractor::{HtmlExtractor, HtmlSurface};

// 导出工具模块核心接口
pub use self::utils::{HeaderConverter, VersionCompare, VersionExtractor};

// 导出检测模块核心接口
pub use self::detector::{detect_technologies, format_app_version, TechDetector};

// 声明所有子模块
pub mod compiler;
pub mod config;
pub mod detector;
pub mod error;
pub mod extractor;
pub mod fingerprint;
pub mod utils;
