//! 版本比较工具
//! 用于在多个模式提取到的版本串中选取数值最小者

/// 版本比较工具类
pub struct VersionCompare;

impl VersionCompare {
    /// 返回列表中数值最小的版本串
    ///
    /// 支持 `.` 与 `:` 分隔的数字段；非数字段按0处理，
    /// 较短的版本视为以0补齐。空白条目跳过；无有效条目返回空串。
    pub fn lowest(versions: &[String]) -> String {
        let mut lowest = "";
        for version in versions {
            if version.is_empty() {
                continue;
            }
            if lowest.is_empty() || Self::version_less(version, lowest) {
                lowest = version;
            }
        }
        lowest.to_string()
    }

    /// 判断版本a是否小于版本b（逐段数值比较）
    fn version_less(a: &str, b: &str) -> bool {
        let a_parts = Self::split_segments(a);
        let b_parts = Self::split_segments(b);

        let max_len = a_parts.len().max(b_parts.len());
        for i in 0..max_len {
            let ai = a_parts.get(i).copied().unwrap_or(0);
            let bi = b_parts.get(i).copied().unwrap_or(0);
            if ai < bi {
                return true;
            }
            if ai > bi {
                return false;
            }
        }
        false
    }

    /// 按 . 或 : 切分并逐段解析为整数（非数字段记0）
    fn split_segments(version: &str) -> Vec<u64> {
        version
            .split(|c| c == '.' || c == ':')
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.parse::<u64>().unwrap_or(0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_lowest_dot_separated() {
        assert_eq!(
            VersionCompare::lowest(&versions(&["2.4.1", "2.4", "10.0"])),
            "2.4"
        );
    }

    #[test]
    fn test_lowest_colon_separated() {
        assert_eq!(
            VersionCompare::lowest(&versions(&["1:2:0", "1:1:9"])),
            "1:1:9"
        );
    }

    #[test]
    fn test_lowest_skips_blank_entries() {
        assert_eq!(
            VersionCompare::lowest(&versions(&["", "3.0", ""])),
            "3.0"
        );
        assert_eq!(VersionCompare::lowest(&versions(&["", ""])), "");
        assert_eq!(VersionCompare::lowest(&[]), "");
    }

    #[test]
    fn test_lowest_non_numeric_segments_as_zero() {
        // 非数字段按0比较：1.0-beta与1.0等价，先出现者保留
        assert_eq!(
            VersionCompare::lowest(&versions(&["1.0", "1.beta"])),
            "1.0"
        );
        assert_eq!(
            VersionCompare::lowest(&versions(&["2.x", "1.9"])),
            "1.9"
        );
    }

    #[test]
    fn test_lowest_shorter_padded_with_zero() {
        assert_eq!(
            VersionCompare::lowest(&versions(&["1.2.1", "1.2"])),
            "1.2"
        );
    }
}
