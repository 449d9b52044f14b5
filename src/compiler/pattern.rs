//! 模式迷你语言：将带指令的正则字符串解析为可执行模式
//!
//! 模式源格式：`正则体[\;confidence:N][\;version:模板]`，
//! 字段间以字面量 `\;` 分隔。正则体为空时模式无条件命中。

use regex::Regex;

use crate::error::RwtResult;
use crate::utils::VersionExtractor;

// 量词重写的重复上限，约束对抗性输入下的最坏匹配成本
const PLUS_BOUND: &str = "{1,250}";
const STAR_BOUND: &str = "{0,250}";
const ESCAPED_PLUS_SENTINEL: &str = "__escaped_plus__";

/// 编译后的检测模式
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub regex: Option<Regex>,
    pub skip_regex: bool,
    pub confidence: u8,
    pub version_template: String,
}

impl CompiledPattern {
    /// 解析单个模式源字符串
    ///
    /// 正则编译失败时返回错误，由调用方决定丢弃；
    /// 指令解析失败不报错（confidence回落默认值100）。
    pub fn parse(source: &str) -> RwtResult<Self> {
        let parts: Vec<&str> = source.split("\\;").collect();

        let mut pattern = Self {
            regex: None,
            skip_regex: false,
            confidence: 100,
            version_template: String::new(),
        };

        for (index, part) in parts.iter().enumerate() {
            if index == 0 {
                if part.is_empty() {
                    // 空正则体：模式无条件命中，仅携带后续指令
                    pattern.skip_regex = true;
                    continue;
                }
                let rewritten = Self::rewrite_regex(part);
                pattern.regex = Some(Regex::new(&format!("(?i){}", rewritten))?);
            } else {
                let Some((key, value)) = part.split_once(':') else {
                    continue;
                };
                match key {
                    "confidence" => {
                        // 解析失败时保留默认置信度
                        pattern.confidence = value.parse::<u8>().unwrap_or(100);
                    }
                    "version" => {
                        pattern.version_template = value.to_string();
                    }
                    // 未知指令忽略
                    _ => {}
                }
            }
        }

        Ok(pattern)
    }

    /// 重写正则体：规范分隔符并将无界量词收敛为有界重复
    ///
    /// `\+` 先替换为哨兵再还原，保证字面加号不被改写。
    fn rewrite_regex(body: &str) -> String {
        let mut rewritten = body.replace('/', "\\/");
        rewritten = rewritten.replace("\\+", ESCAPED_PLUS_SENTINEL);
        rewritten = rewritten.replace('+', PLUS_BOUND);
        rewritten = rewritten.replace('*', STAR_BOUND);
        rewritten.replace(ESCAPED_PLUS_SENTINEL, "\\+")
    }

    /// 对目标字符串求值，返回（是否命中，提取到的版本）
    ///
    /// 版本模板格式错误只导致版本提取失败，命中结果不受影响。
    pub fn evaluate(&self, target: &str) -> (bool, String) {
        if self.skip_regex {
            return (true, String::new());
        }
        let Some(regex) = &self.regex else {
            return (false, String::new());
        };
        let Some(captures) = regex.captures(target) else {
            return (false, String::new());
        };
        if self.version_template.is_empty() {
            return (true, String::new());
        }

        let version =
            VersionExtractor::extract(&self.version_template, &captures).unwrap_or_default();
        (true, version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_parse_empty_pattern() {
        // 测试场景：空正则体无条件命中
        let pattern = CompiledPattern::parse("").unwrap();
        assert!(pattern.skip_regex);
        assert!(pattern.regex.is_none());
        assert_eq!(pattern.confidence, 100);
        assert_eq!(pattern.evaluate("anything"), (true, String::new()));
        assert_eq!(pattern.evaluate(""), (true, String::new()));
    }

    #[test]
    fn test_parse_rewrites_quantifiers() {
        // 测试场景：+/*量词重写为有界重复，附加大小写不敏感前缀
        let pattern = CompiledPattern::parse("Mage.*").unwrap();
        assert_eq!(
            pattern.regex.as_ref().unwrap().as_str(),
            "(?i)Mage.{0,250}"
        );
        assert_eq!(pattern.confidence, 100);
        assert!(pattern.version_template.is_empty());
    }

    #[test]
    fn test_parse_preserves_escaped_plus() {
        // 测试场景：\+保留为字面加号，裸+重写
        let pattern = CompiledPattern::parse("a\\+b+").unwrap();
        assert_eq!(
            pattern.regex.as_ref().unwrap().as_str(),
            "(?i)a\\+b{1,250}"
        );
        assert_eq!(pattern.evaluate("A+bbb"), (true, String::new()));
    }

    #[test]
    fn test_parse_confidence_directive() {
        let pattern = CompiledPattern::parse("X\\;confidence:50").unwrap();
        assert_eq!(pattern.confidence, 50);

        // 解析失败回落默认值
        let pattern = CompiledPattern::parse("X\\;confidence:abc").unwrap();
        assert_eq!(pattern.confidence, 100);

        // 仅指令无正则体
        let pattern = CompiledPattern::parse("\\;confidence:0").unwrap();
        assert!(pattern.skip_regex);
        assert_eq!(pattern.confidence, 0);
    }

    #[test]
    fn test_parse_unknown_directive_ignored() {
        let pattern = CompiledPattern::parse("X\\;foo:bar\\;confidence:30").unwrap();
        assert_eq!(pattern.confidence, 30);
    }

    #[test]
    fn test_evaluate_version_extraction() {
        let pattern = CompiledPattern::parse("jquery-([0-9.]+)\\.js\\;version:\\1").unwrap();
        assert_eq!(
            pattern.evaluate("jquery-3.6.0.js"),
            (true, "3.6.0".to_string())
        );
        assert_eq!(pattern.evaluate("react.js"), (false, String::new()));
    }

    #[test]
    fn test_evaluate_ternary_without_captures() {
        // 测试场景：正则无捕获组，三元表达式取假分支
        let pattern = CompiledPattern::parse("Mage\\;version:\\1?:not found").unwrap();
        assert_eq!(pattern.evaluate("Mage"), (true, "not found".to_string()));
    }

    #[test]
    fn test_evaluate_ternary_with_captures() {
        let pattern =
            CompiledPattern::parse("Mage ([0-9.]+)\\;version:\\1?found:").unwrap();
        assert_eq!(pattern.evaluate("Mage 2.3"), (true, "found".to_string()));
    }

    #[test]
    fn test_evaluate_modernizr_ternary() {
        // 测试场景：两个可选捕获组的三元版本模板
        let source = "([\\d.]+)?/modernizr(?:\\.([\\d.]+))?.*\\.js\\;version:\\1?\\1:\\2";
        let pattern = CompiledPattern::parse(source).unwrap();

        assert_eq!(
            pattern.evaluate("2.6.2/modernizr.js"),
            (true, "2.6.2".to_string())
        );
        assert_eq!(
            pattern.evaluate("/modernizr.2.5.7.js"),
            (true, "2.5.7".to_string())
        );
    }

    #[test]
    fn test_evaluate_optional_group_version() {
        let source = "(?:apache(?:$|/([\\d.]+)|[^/-])|(?:^|\\b)httpd)\\;version:\\1";
        let pattern = CompiledPattern::parse(source).unwrap();

        // 捕获组未参与：命中但无版本
        assert_eq!(pattern.evaluate("apache"), (true, String::new()));
        assert_eq!(
            pattern.evaluate("apache/2.4.29"),
            (true, "2.4.29".to_string())
        );
    }

    #[test]
    fn test_evaluate_malformed_ternary_keeps_match() {
        // 测试场景：三元表达式格式错误，命中结果保留、版本为空
        let pattern = CompiledPattern::parse("mage\\;version:\\1?a?b:c").unwrap();
        assert_eq!(pattern.evaluate("mage"), (true, String::new()));
    }

    #[test]
    fn test_rewritten_pattern_bounded_time() {
        // 测试场景：嵌套量词经重写后在大输入上有界完成
        let pattern = CompiledPattern::parse("(a+)+$").unwrap();
        let mut target = "a".repeat(10 * 1024);
        target.push('X');

        let start = Instant::now();
        let (matched, _) = pattern.evaluate(&target);
        assert!(!matched);
        assert!(start.elapsed().as_secs() < 2);
    }
}
