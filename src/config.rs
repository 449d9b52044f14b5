//! 全局配置管理,存储所有可配置项

use std::path::PathBuf;

/// 检测器配置
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    // 外部指纹库文件路径（None表示仅使用内置指纹库）
    pub catalog_path: Option<PathBuf>,
    // 是否加载内置指纹库
    pub load_embedded: bool,
    // 外部指纹与内置指纹同名时，是否以外部指纹为准
    pub supersede: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            load_embedded: true,
            supersede: true,
        }
    }
}

impl DetectorConfig {
    /// 自定义配置
    pub fn builder() -> DetectorConfigBuilder {
        DetectorConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct DetectorConfigBuilder {
    config: DetectorConfig,
}

impl DetectorConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: DetectorConfig::default(),
        }
    }

    pub fn catalog_path(mut self, path: PathBuf) -> Self {
        self.config.catalog_path = Some(path);
        self
    }

    pub fn load_embedded(mut self, load_embedded: bool) -> Self {
        self.config.load_embedded = load_embedded;
        self
    }

    pub fn supersede(mut self, supersede: bool) -> Self {
        self.config.supersede = supersede;
        self
    }

    pub fn build(self) -> DetectorConfig {
        self.config
    }
}
