//! 版本提取工具模块
//! 负责从正则捕获结果中，根据版本模板提取技术版本号
//! 支持 \1..\9 分组引用与单层三元表达式 `条件?真值:假值`

use regex::Captures;

/// 版本提取工具类
pub struct VersionExtractor;

impl VersionExtractor {
    /// 从正则捕获结果中提取版本号
    ///
    /// 替换模板中的 \N 占位符（未参与的分组替换为空串），
    /// 再求值三元表达式，最后清理前后空白。
    ///
    /// # 返回值
    /// - `Some(String)`: 提取到的非空版本号
    /// - `None`: 模板为空、三元表达式格式错误或最终版本为空
    pub fn extract(version_template: &str, captures: &Captures) -> Option<String> {
        if version_template.is_empty() {
            return None;
        }

        // 1. 替换分组占位符（仅替换正则实际拥有的分组编号）
        let mut version = version_template.to_string();
        for group_index in 1..captures.len() {
            let placeholder = format!("\\{}", group_index);
            let matched = captures
                .get(group_index)
                .map(|m| m.as_str())
                .unwrap_or("");
            version = version.replace(&placeholder, matched);
        }

        // 2. 求值三元表达式（分支选取依据正则是否带捕获组）
        let has_groups = captures.len() > 1;
        let resolved = Self::evaluate_ternary(&version, has_groups)?;

        // 3. 清理前后空白
        let final_version = resolved.trim().to_string();
        if final_version.is_empty() {
            None
        } else {
            Some(final_version)
        }
    }

    /// 求值版本模板中的三元表达式
    ///
    /// 要求恰好一个 `?` 且真假分支间恰好一个 `:`，否则视为格式错误。
    fn evaluate_ternary(expression: &str, has_groups: bool) -> Option<String> {
        if !expression.contains('?') {
            return Some(expression.to_string());
        }

        let parts: Vec<&str> = expression.split('?').collect();
        if parts.len() != 2 {
            return None;
        }

        let branches: Vec<&str> = parts[1].split(':').collect();
        if branches.len() != 2 {
            return None;
        }
        let (on_match, on_miss) = (branches[0], branches[1]);

        if !on_match.is_empty() {
            return Some(if has_groups { on_match } else { on_miss }.to_string());
        }
        if on_miss.is_empty() {
            return Some(String::new());
        }
        Some(on_miss.to_string())
    }
}
