use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::core::ConversionError;

/// 连接的一个端点
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub device: String,
    pub interface: String,
}

/// 校验通过的连接记录，端点保持声明顺序
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub first: Endpoint,
    pub second: Endpoint,
}

/// 单条记录的校验结果
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordCheck {
    Accepted(ConnectionRecord),
    Skipped(String),
}

impl ConnectionRecord {
    /// 校验原始记录：必须恰好包含两个不同设备的端点
    pub fn check(entries: &[(String, String)]) -> RecordCheck {
        let [(first_device, first_interface), (second_device, second_interface)] = entries else {
            return RecordCheck::Skipped(format!(
                "expected 2 endpoints, found {}",
                entries.len()
            ));
        };

        if first_device == second_device {
            return RecordCheck::Skipped(format!(
                "both endpoints name device \"{first_device}\""
            ));
        }

        RecordCheck::Accepted(ConnectionRecord {
            first: Endpoint {
                device: first_device.clone(),
                interface: first_interface.clone(),
            },
            second: Endpoint {
                device: second_device.clone(),
                interface: second_interface.clone(),
            },
        })
    }
}

/// 接口映射：有序的连接记录列表
///
/// 读取时只校验形状（数组、对象、字符串值）；端点个数不对的记录保留下来，
/// 在构建查找表时被跳过。
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<Map<String, Value>>")]
pub struct InterfaceMapping {
    connections: Vec<Vec<(String, String)>>,
}

impl InterfaceMapping {
    /// 从 JSON 数组读取，例如 `[{"R1": "e0/0", "R2": "e0/1"}]`
    pub fn from_json_str(json: &str) -> Result<Self, ConversionError> {
        serde_json::from_str(json).map_err(|e| {
            ConversionError::MappingFormat(format!("interface mapping: {e}"))
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConversionError> {
        let json = std::fs::read_to_string(path).map_err(|e| ConversionError::io(path, e))?;
        Self::from_json_str(&json)
    }

    /// 追加一条原始记录
    pub fn push<I, D, F>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (D, F)>,
        D: Into<String>,
        F: Into<String>,
    {
        self.connections.push(
            entries
                .into_iter()
                .map(|(device, interface)| (device.into(), interface.into()))
                .collect(),
        );
    }

    /// 按声明顺序逐条校验
    pub fn records(&self) -> impl Iterator<Item = RecordCheck> + '_ {
        self.connections
            .iter()
            .map(|entries| ConnectionRecord::check(entries))
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl TryFrom<Vec<Map<String, Value>>> for InterfaceMapping {
    type Error = ConversionError;

    fn try_from(raw: Vec<Map<String, Value>>) -> Result<Self, Self::Error> {
        let mut mapping = InterfaceMapping::default();

        for (index, connection) in raw.into_iter().enumerate() {
            let mut entries = Vec::with_capacity(connection.len());
            for (device, interface) in connection {
                let Value::String(interface) = interface else {
                    return Err(ConversionError::MappingFormat(format!(
                        "connection #{index}: interface of \"{device}\" must be a string"
                    )));
                };
                entries.push((device, interface));
            }
            mapping.connections.push(entries);
        }

        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_declared_order() {
        let mapping =
            InterfaceMapping::from_json_str(r#"[{"R2": "e0/1", "R1": "e0/0"}]"#).unwrap();
        let records: Vec<RecordCheck> = mapping.records().collect();

        let RecordCheck::Accepted(record) = &records[0] else {
            panic!("record should be accepted");
        };
        assert_eq!(record.first.device, "R2");
        assert_eq!(record.first.interface, "e0/1");
        assert_eq!(record.second.device, "R1");
    }

    #[test]
    fn wrong_arity_is_kept_and_skipped() {
        let mapping = InterfaceMapping::from_json_str(
            r#"[{"R1": "e0"}, {"R1": "e0", "R2": "e1", "R3": "e2"}, {"R1": "e0", "R2": "e1"}]"#,
        )
        .unwrap();

        assert_eq!(mapping.len(), 3);
        let checks: Vec<RecordCheck> = mapping.records().collect();
        assert!(matches!(checks[0], RecordCheck::Skipped(_)));
        assert!(matches!(checks[1], RecordCheck::Skipped(_)));
        assert!(matches!(checks[2], RecordCheck::Accepted(_)));
    }

    #[test]
    fn same_device_twice_is_skipped() {
        let mut mapping = InterfaceMapping::default();
        mapping.push([("R1", "e0"), ("R1", "e1")]);
        assert!(matches!(
            mapping.records().next(),
            Some(RecordCheck::Skipped(_))
        ));
    }

    #[test]
    fn rejects_wrong_shapes() {
        for json in [
            r#"{"R1": "e0", "R2": "e1"}"#,
            r#"[["R1", "e0"]]"#,
            r#"[{"R1": 0, "R2": "e1"}]"#,
            r#"[{"#,
        ] {
            assert!(
                matches!(
                    InterfaceMapping::from_json_str(json),
                    Err(ConversionError::MappingFormat(_))
                ),
                "{json} should be rejected"
            );
        }
    }
}
