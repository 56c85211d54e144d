use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::core::ConversionError;
use crate::utils::url::normalize_console_uri;

/// 设备键 → 控制台 URI 映射
///
/// 值在插入时被规范化为 `telnet://host:port`，因此映射里只存在合法 URI。
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>")]
pub struct ConsoleLinkMap {
    links: BTreeMap<String, String>,
}

impl ConsoleLinkMap {
    /// 从 JSON 对象文本读取，例如 `{"R1": "10.0.0.1:2000"}`
    pub fn from_json_str(json: &str) -> Result<Self, ConversionError> {
        serde_json::from_str(json).map_err(|e| {
            ConversionError::MappingFormat(format!("console link map: {e}"))
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConversionError> {
        let json = std::fs::read_to_string(path).map_err(|e| ConversionError::io(path, e))?;
        Self::from_json_str(&json)
    }

    /// 插入一条映射，地址会被规范化
    pub fn insert(&mut self, key: &str, address: &str) -> Result<(), ConversionError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ConversionError::MappingFormat(
                "console link map contains an empty device key".to_string(),
            ));
        }

        let uri = normalize_console_uri(address)?;
        self.links.insert(key.to_string(), uri);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.links.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.links.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl TryFrom<BTreeMap<String, String>> for ConsoleLinkMap {
    type Error = ConversionError;

    fn try_from(raw: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut map = ConsoleLinkMap::default();
        for (key, address) in raw.iter() {
            map.insert(key, address)?;
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes() {
        let map = ConsoleLinkMap::from_json_str(
            r#"{"R1": "10.0.0.1:2000", "R2": "telnet://10.0.0.2:2001"}"#,
        )
        .unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("R1"), Some("telnet://10.0.0.1:2000"));
        assert_eq!(map.get("R2"), Some("telnet://10.0.0.2:2001"));
        assert_eq!(map.get("R3"), None);
    }

    #[test]
    fn empty_object_is_empty_map() {
        assert!(ConsoleLinkMap::from_json_str("{}").unwrap().is_empty());
    }

    #[test]
    fn rejects_wrong_shapes() {
        for json in [
            r#"["R1", "10.0.0.1:2000"]"#,
            r#"{"R1": 2000}"#,
            r#"{"R1": ""}"#,
            r#"{"R1": "10.0.0.1:port"}"#,
            r#"{"R1": "#,
        ] {
            assert!(
                matches!(
                    ConsoleLinkMap::from_json_str(json),
                    Err(ConversionError::MappingFormat(_))
                ),
                "{json} should be rejected"
            );
        }
    }
}
