//! Header格式转换工具
//! 供持有类型化HeaderMap的调用方直接接入检测接口

use std::collections::HashMap;

use http::HeaderMap;

/// Header转换工具
pub struct HeaderConverter;

impl HeaderConverter {
    /// 将HeaderMap转换为HashMap<String, Vec<String>>
    ///
    /// 同名多值Header保留全部值；非UTF-8的值替换为空串。
    pub fn to_hashmap(header_map: &HeaderMap) -> HashMap<String, Vec<String>> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();

        for (key, value) in header_map.iter() {
            let key_str = key.as_str().to_string();
            let value_str = value.to_str().unwrap_or("").to_string();

            map.entry(key_str).or_default().push(value_str);
        }

        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{HeaderName, HeaderValue};

    #[test]
    fn test_to_hashmap_multi_value() {
        // 测试场景：同名多值Header全部保留
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("server"),
            HeaderValue::from_static("nginx/1.21.6"),
        );
        headers.append(
            HeaderName::from_static("set-cookie"),
            HeaderValue::from_static("a=1"),
        );
        headers.append(
            HeaderName::from_static("set-cookie"),
            HeaderValue::from_static("b=2"),
        );

        let map = HeaderConverter::to_hashmap(&headers);
        assert_eq!(map["server"], vec!["nginx/1.21.6"]);
        assert_eq!(map["set-cookie"], vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_to_hashmap_empty() {
        let map = HeaderConverter::to_hashmap(&HeaderMap::new());
        assert!(map.is_empty());
    }
}
