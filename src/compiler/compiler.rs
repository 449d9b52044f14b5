//! 指纹库编译器
//! 将原始指纹库编译为可执行的正则模式集合

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use serde_json::Value;
use tracing::debug;

use super::pattern::CompiledPattern;
use crate::error::RwtResult;
use crate::fingerprint::{AppInfo, CategoryItem, Fingerprint, FingerprintCatalog};

/// 隐含技术条目（implies解析结果）
///
/// confidence为None时，隐含技术继承触发方的置信度。
#[derive(Debug, Clone)]
pub struct ImpliedTech {
    pub name: String,
    pub confidence: Option<u8>,
}

/// 编译后的DOM规则（仅暴露给浏览器宿主调用方，核心不求值）
#[derive(Debug, Clone, Default)]
pub struct CompiledDomRule {
    // exists/text 规则
    pub main: Option<CompiledPattern>,
    // 属性名 -> 模式
    pub attributes: BTreeMap<String, CompiledPattern>,
}

/// 单个技术编译后的指纹
///
/// 键控映射使用BTreeMap，保证检测阶段按名称有序遍历。
#[derive(Debug, Clone)]
pub struct CompiledFingerprint {
    pub cats: Vec<u32>,
    pub cookies: BTreeMap<String, CompiledPattern>,
    pub headers: BTreeMap<String, CompiledPattern>,
    pub js: BTreeMap<String, CompiledPattern>,
    pub dom: BTreeMap<String, CompiledDomRule>,
    pub html: Vec<CompiledPattern>,
    pub script: Vec<CompiledPattern>,
    pub script_src: Vec<CompiledPattern>,
    pub meta: BTreeMap<String, Vec<CompiledPattern>>,
    pub implies: Vec<ImpliedTech>,
    pub description: String,
    pub website: String,
    pub cpe: String,
    pub icon: String,
}

impl CompiledFingerprint {
    /// JS全局路径规则（供宿主环境求值）
    pub fn js_rules(&self) -> &BTreeMap<String, CompiledPattern> {
        &self.js
    }

    /// DOM选择器规则（供宿主环境求值）
    pub fn dom_rules(&self) -> &BTreeMap<String, CompiledDomRule> {
        &self.dom
    }
}

/// 编译后的完整指纹库（构建后只读，可跨线程共享）
#[derive(Debug, Clone)]
pub struct CompiledCatalog {
    // 技术名 -> 编译后指纹（有序，保证检测遍历确定性）
    pub apps: BTreeMap<String, CompiledFingerprint>,
    // 分类ID -> 分类条目
    pub categories: BTreeMap<u32, CategoryItem>,
}

impl CompiledCatalog {
    /// 按分类ID查询分类名称
    pub fn category_name(&self, id: u32) -> Option<&str> {
        self.categories.get(&id).map(|item| item.name.as_str())
    }

    /// 构建指纹的元数据视图
    pub fn app_info(&self, fingerprint: &CompiledFingerprint) -> AppInfo {
        let categories = fingerprint
            .cats
            .iter()
            .filter_map(|id| self.category_name(*id).map(str::to_string))
            .collect();

        AppInfo {
            description: fingerprint.description.clone(),
            website: fingerprint.website.clone(),
            cpe: fingerprint.cpe.clone(),
            icon: fingerprint.icon.clone(),
            categories,
        }
    }
}

/// 指纹库编译器
pub struct CatalogCompiler;

impl CatalogCompiler {
    /// 编译整个原始指纹库
    ///
    /// 单个模式编译失败时静默丢弃，指纹其余部分保留。
    pub fn compile(
        catalog: &FingerprintCatalog,
        categories: BTreeMap<u32, CategoryItem>,
    ) -> RwtResult<CompiledCatalog> {
        let start = Instant::now();
        let mut stats = CompileStats::default();

        let mut apps = BTreeMap::new();
        for (name, fingerprint) in &catalog.apps {
            let compiled = Self::compile_fingerprint(fingerprint, &mut stats);
            apps.insert(name.clone(), compiled);
        }

        debug!(
            "指纹库编译完成，技术{}项，耗时{:?}",
            apps.len(),
            start.elapsed()
        );
        debug!(
            "编译统计：Header模式{}条、Cookie模式{}条、HTML模式{}条、Script模式{}条、ScriptSrc模式{}条、Meta模式{}条、JS模式{}条、DOM模式{}条、丢弃{}条",
            stats.header_count,
            stats.cookie_count,
            stats.html_count,
            stats.script_count,
            stats.script_src_count,
            stats.meta_count,
            stats.js_count,
            stats.dom_count,
            stats.dropped_count
        );

        Ok(CompiledCatalog { apps, categories })
    }

    /// 编译单个技术指纹
    fn compile_fingerprint(
        fingerprint: &Fingerprint,
        stats: &mut CompileStats,
    ) -> CompiledFingerprint {
        CompiledFingerprint {
            cats: fingerprint.cats.clone(),
            cookies: Self::compile_keyed(&fingerprint.cookies, stats, PatternKind::Cookie),
            headers: Self::compile_keyed(&fingerprint.headers, stats, PatternKind::Header),
            js: Self::compile_keyed(&fingerprint.js, stats, PatternKind::Js),
            dom: Self::compile_dom(&fingerprint.dom, stats),
            html: Self::compile_list(&fingerprint.html, stats, PatternKind::Html),
            script: Self::compile_list(&fingerprint.script, stats, PatternKind::Script),
            script_src: Self::compile_list(&fingerprint.script_src, stats, PatternKind::ScriptSrc),
            meta: Self::compile_meta(&fingerprint.meta, stats),
            implies: fingerprint.implies.iter().map(|s| Self::parse_implied(s)).collect(),
            description: fingerprint.description.clone(),
            website: fingerprint.website.clone(),
            cpe: fingerprint.cpe.clone(),
            icon: fingerprint.icon.clone(),
        }
    }

    /// 编译列表型模式（html/script/scriptSrc）
    fn compile_list(
        sources: &[String],
        stats: &mut CompileStats,
        kind: PatternKind,
    ) -> Vec<CompiledPattern> {
        sources
            .iter()
            .filter_map(|source| Self::try_compile(source, stats, kind))
            .collect()
    }

    /// 编译键值型模式（cookie/header/js），键统一小写
    fn compile_keyed(
        sources: &HashMap<String, String>,
        stats: &mut CompileStats,
        kind: PatternKind,
    ) -> BTreeMap<String, CompiledPattern> {
        let mut compiled = BTreeMap::new();
        for (key, source) in sources {
            if let Some(pattern) = Self::try_compile(source, stats, kind) {
                compiled.insert(key.to_lowercase(), pattern);
            }
        }
        compiled
    }

    /// 编译meta模式（键小写，值为模式列表）
    fn compile_meta(
        sources: &HashMap<String, Vec<String>>,
        stats: &mut CompileStats,
    ) -> BTreeMap<String, Vec<CompiledPattern>> {
        let mut compiled = BTreeMap::new();
        for (key, patterns) in sources {
            let list = Self::compile_list(patterns, stats, PatternKind::Meta);
            if !list.is_empty() {
                compiled.insert(key.to_lowercase(), list);
            }
        }
        compiled
    }

    /// 编译DOM规则（exists/text归入main，attributes逐属性编译）
    fn compile_dom(
        sources: &HashMap<String, HashMap<String, Value>>,
        stats: &mut CompileStats,
    ) -> BTreeMap<String, CompiledDomRule> {
        let mut compiled = BTreeMap::new();
        for (selector, rule_map) in sources {
            let mut rule = CompiledDomRule::default();

            for (rule_kind, value) in rule_map {
                match (rule_kind.as_str(), value) {
                    ("exists" | "text", Value::String(source)) => {
                        rule.main = Self::try_compile(source, stats, PatternKind::Dom);
                    }
                    ("attributes", Value::Object(attrs)) => {
                        for (attr_name, attr_value) in attrs {
                            if let Value::String(source) = attr_value {
                                if let Some(pattern) =
                                    Self::try_compile(source, stats, PatternKind::Dom)
                                {
                                    rule.attributes.insert(attr_name.clone(), pattern);
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }

            if rule.main.is_some() || !rule.attributes.is_empty() {
                compiled.insert(selector.clone(), rule);
            }
        }
        compiled
    }

    /// 解析implies条目：取名称与可选的confidence指令
    fn parse_implied(entry: &str) -> ImpliedTech {
        let mut parts = entry.split("\\;");
        let name = parts.next().unwrap_or("").trim().to_string();

        let mut confidence = None;
        for part in parts {
            if let Some((key, value)) = part.split_once(':') {
                if key == "confidence" {
                    confidence = value.parse::<u8>().ok();
                }
            }
        }

        ImpliedTech { name, confidence }
    }

    /// 编译单个模式，失败时记录调试日志并丢弃
    fn try_compile(
        source: &str,
        stats: &mut CompileStats,
        kind: PatternKind,
    ) -> Option<CompiledPattern> {
        match CompiledPattern::parse(source) {
            Ok(pattern) => {
                stats.count(kind);
                Some(pattern)
            }
            Err(e) => {
                stats.dropped_count += 1;
                debug!("{}模式编译失败已丢弃：{}（{}）", kind.as_str(), source, e);
                None
            }
        }
    }
}

/// 模式类别（仅用于编译统计与日志）
#[derive(Debug, Clone, Copy)]
enum PatternKind {
    Cookie,
    Header,
    Js,
    Dom,
    Html,
    Script,
    ScriptSrc,
    Meta,
}

impl PatternKind {
    fn as_str(self) -> &'static str {
        match self {
            PatternKind::Cookie => "Cookie",
            PatternKind::Header => "Header",
            PatternKind::Js => "JS",
            PatternKind::Dom => "DOM",
            PatternKind::Html => "HTML",
            PatternKind::Script => "Script",
            PatternKind::ScriptSrc => "ScriptSrc",
            PatternKind::Meta => "Meta",
        }
    }
}

/// 编译统计信息
#[derive(Debug, Clone, Default)]
struct CompileStats {
    cookie_count: usize,
    header_count: usize,
    js_count: usize,
    dom_count: usize,
    html_count: usize,
    script_count: usize,
    script_src_count: usize,
    meta_count: usize,
    dropped_count: usize,
}

impl CompileStats {
    fn count(&mut self, kind: PatternKind) {
        match kind {
            PatternKind::Cookie => self.cookie_count += 1,
            PatternKind::Header => self.header_count += 1,
            PatternKind::Js => self.js_count += 1,
            PatternKind::Dom => self.dom_count += 1,
            PatternKind::Html => self.html_count += 1,
            PatternKind::Script => self.script_count += 1,
            PatternKind::ScriptSrc => self.script_src_count += 1,
            PatternKind::Meta => self.meta_count += 1,
        }
    }
}
