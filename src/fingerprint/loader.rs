//! 指纹库加载管理器
//! 负责加载内置指纹库与外部指纹文件，并按策略合并

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::model::{CategoryItem, FingerprintCatalog};
use crate::config::DetectorConfig;
use crate::error::{RswebtechError, RwtResult};

// 内置指纹库与分类表（归一化JSON，构建期嵌入）
const EMBEDDED_FINGERPRINTS: &str = include_str!("fingerprints_data.json");
const EMBEDDED_CATEGORIES: &str = include_str!("categories_data.json");

/// 指纹库加载管理器
pub struct CatalogLoader;

impl CatalogLoader {
    /// 按配置加载有效指纹库
    ///
    /// 叠加模式下外部文件加载失败仅告警降级；
    /// 仅外部模式下文件加载失败直接报错。
    /// 有效指纹库为空视为错误。
    pub fn load(config: &DetectorConfig) -> RwtResult<FingerprintCatalog> {
        let catalog = match (&config.catalog_path, config.load_embedded) {
            (None, _) => Self::load_embedded()?,
            (Some(path), false) => Self::load_from_file(path)?,
            (Some(path), true) => {
                let mut catalog = Self::load_embedded()?;
                match Self::load_from_file(path) {
                    Ok(overlay) => {
                        let overlay_count = overlay.apps.len();
                        Self::merge(&mut catalog, overlay, config.supersede);
                        debug!("外部指纹库已叠加，共{}项", overlay_count);
                    }
                    Err(e) => {
                        warn!("外部指纹库加载失败，仅使用内置指纹库：{}", e);
                    }
                }
                catalog
            }
        };

        if catalog.apps.is_empty() {
            return Err(RswebtechError::CatalogEmptyError);
        }
        debug!("指纹库加载完成，共{}项技术", catalog.apps.len());
        Ok(catalog)
    }

    /// 加载内置指纹库
    pub fn load_embedded() -> RwtResult<FingerprintCatalog> {
        let catalog: FingerprintCatalog = serde_json::from_str(EMBEDDED_FINGERPRINTS)?;
        Ok(catalog)
    }

    /// 从外部文件加载指纹库
    pub fn load_from_file(path: &Path) -> RwtResult<FingerprintCatalog> {
        let raw = fs::read_to_string(path)?;
        let catalog: FingerprintCatalog = serde_json::from_str(&raw)?;
        if catalog.apps.is_empty() {
            return Err(RswebtechError::CatalogLoadError(format!(
                "文件 {} 中未找到任何指纹",
                path.display()
            )));
        }
        Ok(catalog)
    }

    /// 叠加外部指纹库
    ///
    /// supersede为真时同名条目以外部指纹为准，否则保留内置条目。
    fn merge(base: &mut FingerprintCatalog, overlay: FingerprintCatalog, supersede: bool) {
        for (name, fingerprint) in overlay.apps {
            match base.apps.entry(name) {
                Entry::Occupied(mut entry) => {
                    if supersede {
                        entry.insert(fingerprint);
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(fingerprint);
                }
            }
        }
    }

    /// 加载内置分类表（分类ID -> 分类条目）
    pub fn load_categories() -> RwtResult<BTreeMap<u32, CategoryItem>> {
        let raw: HashMap<String, CategoryItem> = serde_json::from_str(EMBEDDED_CATEGORIES)?;

        let mut categories = BTreeMap::new();
        for (key, item) in raw {
            match key.parse::<u32>() {
                Ok(id) => {
                    categories.insert(id, item);
                }
                Err(_) => debug!("忽略无效分类ID：{}", key),
            }
        }
        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp_catalog(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_embedded_catalog() {
        // 测试场景：内置指纹库可解析且非空
        let catalog = CatalogLoader::load_embedded().unwrap();
        assert!(!catalog.apps.is_empty());
        assert!(catalog.apps.contains_key("Apache HTTP Server"));
    }

    #[test]
    fn test_load_embedded_categories() {
        let categories = CatalogLoader::load_categories().unwrap();
        assert!(!categories.is_empty());
        assert_eq!(categories.get(&1).map(|c| c.name.as_str()), Some("CMS"));
    }

    #[test]
    fn test_load_from_file_rejects_empty() {
        let path = write_temp_catalog("rswebtech_empty_catalog.json", r#"{"apps": {}}"#);
        let result = CatalogLoader::load_from_file(&path);
        assert!(matches!(result, Err(RswebtechError::CatalogLoadError(_))));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_from_file_rejects_invalid_json() {
        let path = write_temp_catalog("rswebtech_bad_catalog.json", "{not json");
        let result = CatalogLoader::load_from_file(&path);
        assert!(matches!(result, Err(RswebtechError::JsonError(_))));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_overlay_file_failure_degrades_to_embedded() {
        // 测试场景：叠加模式下文件缺失仅降级，不报错
        let config = DetectorConfig::builder()
            .catalog_path(PathBuf::from("/nonexistent/rswebtech_rules.json"))
            .build();
        let catalog = CatalogLoader::load(&config).unwrap();
        assert!(catalog.apps.contains_key("Apache HTTP Server"));
    }

    #[test]
    fn test_file_only_failure_is_fatal() {
        let config = DetectorConfig::builder()
            .catalog_path(PathBuf::from("/nonexistent/rswebtech_rules.json"))
            .load_embedded(false)
            .build();
        assert!(CatalogLoader::load(&config).is_err());
    }

    #[test]
    fn test_merge_supersede_policy() {
        let overlay_json = r#"{"apps": {
            "Apache HTTP Server": {"cats": [99], "website": "https://example.com"},
            "Custom Tech": {"cats": [22]}
        }}"#;
        let path = write_temp_catalog("rswebtech_overlay_catalog.json", overlay_json);

        // supersede=true：外部条目覆盖内置条目
        let config = DetectorConfig::builder()
            .catalog_path(path.clone())
            .supersede(true)
            .build();
        let catalog = CatalogLoader::load(&config).unwrap();
        assert_eq!(catalog.apps["Apache HTTP Server"].cats, vec![99]);
        assert!(catalog.apps.contains_key("Custom Tech"));

        // supersede=false：同名条目保留内置指纹
        let config = DetectorConfig::builder()
            .catalog_path(path.clone())
            .supersede(false)
            .build();
        let catalog = CatalogLoader::load(&config).unwrap();
        assert_ne!(catalog.apps["Apache HTTP Server"].cats, vec![99]);
        assert!(catalog.apps.contains_key("Custom Tech"));

        let _ = fs::remove_file(&path);
    }
}
