//! 指纹模块：指纹库数据模型与加载
pub mod loader;
pub mod model;

// 导出核心接口
pub use self::loader::CatalogLoader;
pub use self::model::{AppInfo, CategoryItem, CatsInfo, Fingerprint, FingerprintCatalog};
