//! 检测分析器：对Header/Cookie/HTML/Script/Meta各检测面执行模式匹配

use rustc_hash::FxHashMap;
use tracing::debug;

use super::accumulator::Accumulator;
use crate::compiler::CompiledCatalog;

/// Header分析器
pub struct HeaderAnalyzer;

impl HeaderAnalyzer {
    /// 对归一化Header执行匹配
    pub fn analyze(
        catalog: &CompiledCatalog,
        headers: &FxHashMap<String, String>,
        detected: &mut Accumulator,
    ) {
        for (tech_name, fingerprint) in &catalog.apps {
            for (header_name, pattern) in &fingerprint.headers {
                let Some(header_value) = headers.get(header_name) else {
                    continue;
                };

                let (matched, version) = pattern.evaluate(header_value);
                if matched {
                    debug!(
                        "Header匹配成功：技术={}，Header={}，版本={:?}",
                        tech_name, header_name, version
                    );
                    detected.set_if_not_exists(tech_name, &version, pattern.confidence);
                }
            }
        }
    }
}

/// Cookie分析器
pub struct CookieAnalyzer;

impl CookieAnalyzer {
    /// 对解析后的Cookie键值执行匹配
    pub fn analyze(
        catalog: &CompiledCatalog,
        cookies: &FxHashMap<String, String>,
        detected: &mut Accumulator,
    ) {
        for (tech_name, fingerprint) in &catalog.apps {
            for (cookie_name, pattern) in &fingerprint.cookies {
                let Some(cookie_value) = cookies.get(cookie_name) else {
                    continue;
                };

                let (matched, version) = pattern.evaluate(cookie_value);
                if matched {
                    debug!(
                        "Cookie匹配成功：技术={}，Cookie={}，版本={:?}",
                        tech_name, cookie_name, version
                    );
                    detected.set_if_not_exists(tech_name, &version, pattern.confidence);
                }
            }
        }
    }
}

/// HTML分析器
pub struct HtmlAnalyzer;

impl HtmlAnalyzer {
    /// 对小写化的完整响应体执行HTML模式匹配
    pub fn analyze(catalog: &CompiledCatalog, body: &str, detected: &mut Accumulator) {
        for (tech_name, fingerprint) in &catalog.apps {
            for pattern in &fingerprint.html {
                let (matched, version) = pattern.evaluate(body);
                if matched {
                    debug!("HTML匹配成功：技术={}，版本={:?}", tech_name, version);
                    detected.set_if_not_exists(tech_name, &version, pattern.confidence);
                }
            }
        }
    }
}

/// Script分析器
pub struct ScriptAnalyzer;

impl ScriptAnalyzer {
    /// script模式对完整响应体匹配，scriptSrc模式对提取到的脚本URL匹配
    pub fn analyze(
        catalog: &CompiledCatalog,
        body: &str,
        script_srcs: &[String],
        detected: &mut Accumulator,
    ) {
        for (tech_name, fingerprint) in &catalog.apps {
            for pattern in &fingerprint.script {
                let (matched, version) = pattern.evaluate(body);
                if matched {
                    debug!("Script匹配成功：技术={}，版本={:?}", tech_name, version);
                    detected.set_if_not_exists(tech_name, &version, pattern.confidence);
                }
            }

            for src in script_srcs {
                for pattern in &fingerprint.script_src {
                    let (matched, version) = pattern.evaluate(src);
                    if matched {
                        debug!(
                            "ScriptSrc匹配成功：技术={}，src={}，版本={:?}",
                            tech_name, src, version
                        );
                        detected.set_if_not_exists(tech_name, &version, pattern.confidence);
                    }
                }
            }
        }
    }
}

/// Meta分析器
pub struct MetaAnalyzer;

impl MetaAnalyzer {
    /// 对提取到的meta标签（名称已小写）执行匹配
    pub fn analyze(
        catalog: &CompiledCatalog,
        meta_tags: &[(String, String)],
        detected: &mut Accumulator,
    ) {
        for (tech_name, fingerprint) in &catalog.apps {
            for (meta_name, patterns) in &fingerprint.meta {
                for (tag_name, content) in meta_tags {
                    if tag_name != meta_name {
                        continue;
                    }

                    for pattern in patterns {
                        let (matched, version) = pattern.evaluate(content);
                        if matched {
                            debug!(
                                "Meta匹配成功：技术={}，meta={}，版本={:?}",
                                tech_name, meta_name, version
                            );
                            detected.set_if_not_exists(tech_name, &version, pattern.confidence);
                        }
                    }
                }
            }
        }
    }
}
