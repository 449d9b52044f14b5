//! 指纹数据模型定义
//! 仅存储规则数据，无任何业务逻辑，支持序列化/反序列化

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 单个技术的原始指纹（归一化后的磁盘格式，见指纹库JSON）
///
/// 字符串或列表二义的字段在落盘前已统一为列表，
/// cookies/headers/meta 的键已统一为小写。
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Fingerprint {
    // 分类ID列表
    #[serde(default)]
    pub cats: Vec<u32>,

    // 检测规则
    #[serde(default)]
    pub cookies: HashMap<String, String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub js: HashMap<String, String>,
    // DOM规则：CSS选择器 -> { "exists" | "text" | "attributes" }
    #[serde(default)]
    pub dom: HashMap<String, HashMap<String, Value>>,
    #[serde(default)]
    pub html: Vec<String>,
    #[serde(rename = "scripts", default)]
    pub script: Vec<String>,
    #[serde(rename = "scriptSrc", alias = "scriptSrcs", default)]
    pub script_src: Vec<String>,
    #[serde(default)]
    pub meta: HashMap<String, Vec<String>>,

    // 关联规则：匹配成功时隐含存在的其他技术（条目可携带\;confidence:N）
    #[serde(default)]
    pub implies: Vec<String>,

    // 元数据
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub cpe: String,
    #[serde(default)]
    pub icon: String,
}

/// 完整原始指纹库（JSON顶层结构）
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FingerprintCatalog {
    // 技术名 -> 指纹
    pub apps: HashMap<String, Fingerprint>,
}

/// 分类条目（来自分类JSON资源，键为字符串形式的分类ID）
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryItem {
    pub name: String,
    #[serde(default)]
    pub priority: u32,
}

/// 技术基础信息（检测结果的元数据视图）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppInfo {
    pub description: String,
    pub website: String,
    pub cpe: String,
    pub icon: String,
    pub categories: Vec<String>,
}

/// 技术分类信息（检测结果的分类视图）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatsInfo {
    pub cats: Vec<u32>,
}
