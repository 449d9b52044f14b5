//! 检测结果聚合器
//! 单次检测调用内去重、叠加置信度并保留版本

use std::collections::HashSet;

use rustc_hash::FxHashMap;

/// 最大累计置信度
const MAX_CONFIDENCE: u8 = 100;

/// 格式化输出条目：版本为空时仅输出名称
pub fn format_app_version(app: &str, version: &str) -> String {
    if version.is_empty() {
        app.to_string()
    } else {
        format!("{}:{}", app, version)
    }
}

/// 单项检测记录
#[derive(Debug, Clone)]
struct DetectedApp {
    confidence: u8,
    version: String,
}

/// 检测结果聚合器（调用级状态，单次检测后即丢弃）
#[derive(Debug, Default)]
pub struct Accumulator {
    values: FxHashMap<String, DetectedApp>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入一次部分匹配结果
    ///
    /// 同名条目置信度饱和叠加并封顶100；
    /// 已有版本为空且新版本非空时采纳新版本，否则保留原版本。
    pub fn set_if_not_exists(&mut self, name: &str, version: &str, confidence: u8) {
        if let Some(existing) = self.values.get_mut(name) {
            existing.confidence = existing
                .confidence
                .saturating_add(confidence)
                .min(MAX_CONFIDENCE);
            if existing.version.is_empty() && !version.is_empty() {
                existing.version = version.to_string();
            }
            return;
        }

        self.values.insert(
            name.to_string(),
            DetectedApp {
                confidence,
                version: version.to_string(),
            },
        );
    }

    /// 当前已记录的技术快照（名称与累计置信度），供implies展开使用
    pub fn snapshot(&self) -> Vec<(String, u8)> {
        self.values
            .iter()
            .map(|(name, app)| (name.clone(), app.confidence))
            .collect()
    }

    /// 输出最终结果集：累计置信度为0的条目不输出
    pub fn emit(self) -> HashSet<String> {
        self.values
            .into_iter()
            .filter(|(_, app)| app.confidence > 0)
            .map(|(name, app)| format_app_version(&name, &app.version))
            .collect()
    }
}
