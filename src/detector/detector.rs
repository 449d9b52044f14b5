//! 检测器核心：整合各检测面分析器，输出技术识别结果
//!
//! 检测路径无I/O、不可失败：畸形输入只产生空结果。

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::accumulator::Accumulator;
use super::analyzer::{CookieAnalyzer, HeaderAnalyzer, HtmlAnalyzer, MetaAnalyzer, ScriptAnalyzer};
use crate::compiler::{CatalogCompiler, CompiledCatalog};
use crate::config::DetectorConfig;
use crate::error::RwtResult;
use crate::extractor::HtmlExtractor;
use crate::fingerprint::{AppInfo, CatalogLoader, CatsInfo, FingerprintCatalog};
use crate::utils::HeaderConverter;

// Set-Cookie中的保留属性名，不作为Cookie名处理
const RESERVED_COOKIE_ATTRS: [&str; 7] = [
    "path", "expires", "domain", "secure", "httponly", "samesite", "max-age",
];

/// 技术检测器
///
/// 构建时一次性完成指纹库加载与编译，之后只读，
/// 可被任意数量的并发检测调用共享。
#[derive(Debug, Clone)]
pub struct TechDetector {
    compiled: Arc<CompiledCatalog>,
    raw: Arc<FingerprintCatalog>,
}

impl TechDetector {
    /// 创建检测器（内置指纹库）
    pub fn new() -> RwtResult<Self> {
        Self::with_config(&DetectorConfig::default())
    }

    /// 按配置创建检测器
    pub fn with_config(config: &DetectorConfig) -> RwtResult<Self> {
        let raw = CatalogLoader::load(config)?;
        let categories = CatalogLoader::load_categories()?;
        let compiled = CatalogCompiler::compile(&raw, categories)?;

        Ok(Self {
            compiled: Arc::new(compiled),
            raw: Arc::new(raw),
        })
    }

    /// 从外部指纹文件创建检测器
    ///
    /// `load_embedded`为真时外部指纹叠加在内置指纹库之上，
    /// `supersede`决定同名冲突的归属。
    pub fn new_from_file(
        path: impl Into<PathBuf>,
        load_embedded: bool,
        supersede: bool,
    ) -> RwtResult<Self> {
        let config = DetectorConfig {
            catalog_path: Some(path.into()),
            load_embedded,
            supersede,
        };
        Self::with_config(&config)
    }

    /// 编译后指纹库（含js/dom规则与分类表）
    pub fn catalog(&self) -> &CompiledCatalog {
        &self.compiled
    }

    /// 原始指纹库
    pub fn raw_catalog(&self) -> &FingerprintCatalog {
        &self.raw
    }

    /// 核心检测接口：返回 `名称[:版本]` 集合
    pub fn fingerprint(
        &self,
        headers: &HashMap<String, Vec<String>>,
        body: &[u8],
    ) -> HashSet<String> {
        self.run_detection(headers, body).emit()
    }

    /// 检测并附带页面标题
    ///
    /// 仅当Content-Type包含text/html时提取标题；
    /// 标题取自原始（未小写化）响应体，不做实体解码。
    pub fn fingerprint_with_title(
        &self,
        headers: &HashMap<String, Vec<String>>,
        body: &[u8],
    ) -> (HashSet<String>, String) {
        let technologies = self.fingerprint(headers, body);

        let is_html = headers.iter().any(|(name, values)| {
            name.eq_ignore_ascii_case("content-type")
                && values.iter().any(|v| v.to_lowercase().contains("text/html"))
        });
        let title = if is_html {
            HtmlExtractor::extract_title(&String::from_utf8_lossy(body))
        } else {
            String::new()
        };

        (technologies, title)
    }

    /// 检测并附带技术基础信息
    pub fn fingerprint_with_info(
        &self,
        headers: &HashMap<String, Vec<String>>,
        body: &[u8],
    ) -> HashMap<String, AppInfo> {
        let technologies = self.fingerprint(headers, body);
        let mut result = HashMap::with_capacity(technologies.len());

        for app in technologies {
            let Some(fingerprint) = self.compiled.apps.get(Self::strip_version(&app)) else {
                continue;
            };
            let info = self.compiled.app_info(fingerprint);
            result.insert(app, info);
        }
        result
    }

    /// 检测并附带分类ID
    pub fn fingerprint_with_cats(
        &self,
        headers: &HashMap<String, Vec<String>>,
        body: &[u8],
    ) -> HashMap<String, CatsInfo> {
        let technologies = self.fingerprint(headers, body);
        let mut result = HashMap::with_capacity(technologies.len());

        for app in technologies {
            let Some(fingerprint) = self.compiled.apps.get(Self::strip_version(&app)) else {
                continue;
            };
            let cats = CatsInfo {
                cats: fingerprint.cats.clone(),
            };
            result.insert(app, cats);
        }
        result
    }

    /// 类型化HeaderMap便捷入口
    pub fn fingerprint_header_map(
        &self,
        headers: &http::HeaderMap,
        body: &[u8],
    ) -> HashSet<String> {
        self.fingerprint(&HeaderConverter::to_hashmap(headers), body)
    }

    /// 执行完整检测流水线，返回聚合器
    fn run_detection(&self, headers: &HashMap<String, Vec<String>>, body: &[u8]) -> Accumulator {
        // 1. 归一化输入
        let normalized_headers = Self::normalize_headers(headers);
        let body_str = String::from_utf8_lossy(body);
        let normalized_body = body_str.to_lowercase();

        let mut detected = Accumulator::new();

        // 2. Header匹配
        HeaderAnalyzer::analyze(&self.compiled, &normalized_headers, &mut detected);

        // 3. Cookie匹配
        let cookies = Self::parse_set_cookie(&normalized_headers);
        if !cookies.is_empty() {
            CookieAnalyzer::analyze(&self.compiled, &cookies, &mut detected);
        }

        // 4. 响应体匹配（HTML/Script/ScriptSrc/Meta）
        let surface = HtmlExtractor::extract(&normalized_body);
        HtmlAnalyzer::analyze(&self.compiled, &normalized_body, &mut detected);
        ScriptAnalyzer::analyze(
            &self.compiled,
            &normalized_body,
            &surface.script_srcs,
            &mut detected,
        );
        MetaAnalyzer::analyze(&self.compiled, &surface.meta_tags, &mut detected);

        // 5. 关联推导展开（单轮，不追溯隐含的隐含）
        self.apply_implies(&mut detected);

        detected
    }

    /// 归一化Header：名称与值小写，多值以逗号拼接
    fn normalize_headers(headers: &HashMap<String, Vec<String>>) -> FxHashMap<String, String> {
        let mut normalized = FxHashMap::default();
        for (name, values) in headers {
            normalized.insert(name.to_lowercase(), values.join(", ").to_lowercase());
        }
        normalized
    }

    /// 解析set-cookie头为Cookie名值映射
    ///
    /// 以 `;`、`,` 与空白切分；保留属性（path/expires等）不算Cookie。
    fn parse_set_cookie(normalized_headers: &FxHashMap<String, String>) -> FxHashMap<String, String> {
        let mut cookies = FxHashMap::default();
        let Some(raw) = normalized_headers.get("set-cookie") else {
            return cookies;
        };

        for fragment in raw.split([';', ',']) {
            for token in fragment.split_whitespace() {
                let Some((name, value)) = token.split_once('=') else {
                    continue;
                };
                let name = name.trim();
                if name.is_empty() || RESERVED_COOKIE_ATTRS.contains(&name) {
                    continue;
                }
                cookies
                    .entry(name.to_string())
                    .or_insert_with(|| value.to_string());
            }
        }
        cookies
    }

    /// 展开implies：已命中技术的隐含技术同样记入结果
    ///
    /// 隐含条目自带confidence指令时用其值，否则继承触发方置信度；
    /// 指纹库中不存在的隐含名跳过。
    fn apply_implies(&self, detected: &mut Accumulator) {
        let matched = detected.snapshot();

        for (tech_name, confidence) in matched {
            let Some(fingerprint) = self.compiled.apps.get(&tech_name) else {
                continue;
            };

            for implied in &fingerprint.implies {
                if !self.compiled.apps.contains_key(&implied.name) {
                    debug!("忽略指纹库中不存在的隐含技术：{}", implied.name);
                    continue;
                }
                let implied_confidence = implied.confidence.unwrap_or(confidence);
                detected.set_if_not_exists(&implied.name, "", implied_confidence);
            }
        }
    }

    /// 去掉 `名称:版本` 中的版本后缀
    fn strip_version(app: &str) -> &str {
        app.split(':').next().unwrap_or(app)
    }
}

// 便捷函数：内置指纹库一次性检测（无全局单例，每次构建新检测器）
pub fn detect_technologies(
    headers: &HashMap<String, Vec<String>>,
    body: &[u8],
) -> RwtResult<HashSet<String>> {
    let detector = TechDetector::new()?;
    Ok(detector.fingerprint(headers, body))
}
