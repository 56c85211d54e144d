//! 接口标签解析模块
//!
//! 拓扑图中每条连线上有两个接口名称标签（`.node_interface`），
//! 通过 `position` 属性区分源端（`src`）和目的端（`dst`）。
//! 本模块根据接口映射重写这些标签的文本。
//!
//! # 工作流程
//!
//! 1. 由映射记录构建对称查找表：无序设备名对 → 各设备的接口名
//! 2. 对每个带 `position` 的标签，找到最近的连线祖先元素，读取其上的两个设备令牌（如 `node1 node2`）
//! 3. 把令牌解析为设备节点，再解析为显示名称
//! 4. `src` 取第一个令牌对应设备的接口名，`dst` 取第二个令牌对应设备的接口名
//!
//! 查找方向不影响结果：标签按自身的位置取值，而不是按映射中声明的顺序。
//! 任何一步解析失败时标签保持不变。

use std::collections::{BTreeMap, HashMap};

use markup5ever_rcdom::Handle;

use crate::core::ConversionError;
use crate::mappings::{ConnectionRecord, InterfaceMapping, RecordCheck};

use super::attrs::AttributeMap;
use super::dom::{find_ancestor, find_nodes, set_text_content, NodeMatcher};
use super::utils::{
    is_device_token, DEVICE_NAME_ATTR, DEVICE_NODE_CLASS, INTERFACE_LABEL_CLASS,
    LINK_CARRIER_CLASSES, POSITION_ATTR, WHITESPACES,
};

/// 标签在连线上的位置
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelPosition {
    Src,
    Dst,
}

impl LabelPosition {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "src" => Some(LabelPosition::Src),
            "dst" => Some(LabelPosition::Dst),
            _ => None,
        }
    }
}

/// 对称查找表
///
/// 键为排序后的设备名对，因此 `(A, B)` 与 `(B, A)` 命中同一条目。
#[derive(Debug, Default)]
pub struct InterfaceLookup {
    connections: HashMap<(String, String), BTreeMap<String, String>>,
    skipped: usize,
}

impl InterfaceLookup {
    pub fn build(mapping: &InterfaceMapping) -> Self {
        let mut lookup = InterfaceLookup::default();

        for (index, check) in mapping.records().enumerate() {
            match check {
                RecordCheck::Accepted(record) => lookup.insert(record),
                RecordCheck::Skipped(reason) => {
                    tracing::warn!("skipping interface mapping record #{index}: {reason}");
                    lookup.skipped += 1;
                }
            }
        }

        lookup
    }

    fn insert(&mut self, record: ConnectionRecord) {
        let key = pair_key(&record.first.device, &record.second.device);
        let interfaces = BTreeMap::from([
            (record.first.device, record.first.interface),
            (record.second.device, record.second.interface),
        ]);
        self.connections.insert(key, interfaces);
    }

    /// 查找一条连线上两个设备各自的接口名，顺序与参数顺序一致
    pub fn resolve(&self, first: &str, second: &str) -> Option<(&str, &str)> {
        let interfaces = self.connections.get(&pair_key(first, second))?;
        Some((
            interfaces.get(first)?.as_str(),
            interfaces.get(second)?.as_str(),
        ))
    }

    /// 被跳过的畸形记录数
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// 接口标签解析器
pub struct InterfaceLabelResolver {
    lookup: InterfaceLookup,
}

impl InterfaceLabelResolver {
    pub fn new(mapping: &InterfaceMapping) -> Self {
        Self {
            lookup: InterfaceLookup::build(mapping),
        }
    }

    pub fn skipped_records(&self) -> usize {
        self.lookup.skipped()
    }

    /// 重写文档中所有可解析的接口标签，返回重写的标签数
    pub fn resolve(&self, document: &Handle) -> usize {
        if self.lookup.is_empty() {
            return 0;
        }

        let mut rewritten = 0;
        for label in find_nodes(document, &NodeMatcher::Class(INTERFACE_LABEL_CLASS)) {
            match self.resolve_label(document, &label) {
                Ok(Some(interface)) => {
                    set_text_content(&label, interface);
                    rewritten += 1;
                }
                Ok(None) => {}
                Err(e) => tracing::debug!("interface label left unchanged: {e}"),
            }
        }

        rewritten
    }

    fn resolve_label<'a>(
        &'a self,
        document: &Handle,
        label: &Handle,
    ) -> Result<Option<&'a str>, ConversionError> {
        let Some(position) = AttributeMap::of(label)
            .and_then(|attrs| attrs.get(POSITION_ATTR))
            .and_then(|value| LabelPosition::parse(&value))
        else {
            return Ok(None);
        };

        let carrier_matcher = NodeMatcher::AnyClass(LINK_CARRIER_CLASSES);
        let carrier = if carrier_matcher.matches(label) {
            label.clone()
        } else {
            let Some(ancestor) = find_ancestor(label, &carrier_matcher) else {
                return Ok(None);
            };
            ancestor
        };

        let tokens: Vec<String> = AttributeMap::of(&carrier)
            .map(|attrs| attrs.class_tokens())
            .unwrap_or_default()
            .into_iter()
            .filter(|token| is_device_token(token))
            .collect();
        let [first_token, second_token] = tokens.as_slice() else {
            return Ok(None);
        };

        let first_name = resolve_device_name(document, first_token)?;
        let second_name = resolve_device_name(document, second_token)?;

        let Some((first_interface, second_interface)) =
            self.lookup.resolve(&first_name, &second_name)
        else {
            return Ok(None);
        };

        Ok(Some(match position {
            LabelPosition::Src => first_interface,
            LabelPosition::Dst => second_interface,
        }))
    }
}

/// 把设备令牌（如 `node3`）解析为设备的显示名称
pub fn resolve_device_name(document: &Handle, token: &str) -> Result<String, ConversionError> {
    let device = find_nodes(document, &NodeMatcher::TagWithClass("div", DEVICE_NODE_CLASS))
        .into_iter()
        .find(|node| NodeMatcher::Class(token).matches(node))
        .ok_or_else(|| {
            ConversionError::ReferenceResolution(format!("no device node for \"{token}\""))
        })?;

    AttributeMap::of(&device)
        .and_then(|attrs| attrs.get(DEVICE_NAME_ATTR))
        .map(|name| name.trim_matches(WHITESPACES).to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            ConversionError::ReferenceResolution(format!("device \"{token}\" has no display name"))
        })
}
