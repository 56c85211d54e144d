//! 控制台链接绑定模块
//!
//! 根据「设备 → 控制台 URI」映射，为拓扑图中的设备节点注入点击行为和悬停提示：
//!
//! - 设备节点：`onclick` 在新窗口打开控制台 URI，`style` 前置 `cursor: pointer;`
//! - 控制台图标：`title` 为去掉协议后的 `host:port`
//! - 名称标签：`title` 为提示语加完整 URI
//!
//! 映射中找不到的设备、或者没有控制台图标的设备保持不变，这不是错误。
//! 本模块只修改属性，不增删元素。

use markup5ever_rcdom::Handle;

use crate::mappings::ConsoleLinkMap;
use crate::utils::url::strip_scheme;

use super::dom::{find_descendant, find_nodes, get_node_attr, set_node_attr, NodeMatcher};
use super::utils::{
    CONSOLE_ICON_CLASS, DEVICE_NAME_ATTR, DEVICE_NODE_CLASS, NAME_LABEL_CLASS, WHITESPACES,
};

/// 默认的名称标签提示语
pub const DEFAULT_CONSOLE_PROMPT: &str = "Connect: ";

/// 设备节点在映射中的查找键
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LinkLookupMode {
    /// 按 `data-name` 显示名称查找
    #[default]
    Name,
    /// 按元素 `id` 查找
    Id,
}

impl LinkLookupMode {
    /// 读取设备节点的查找键，空白键视为不存在
    pub fn device_key(&self, node: &Handle) -> Option<String> {
        let attr_name = match self {
            LinkLookupMode::Name => DEVICE_NAME_ATTR,
            LinkLookupMode::Id => "id",
        };

        get_node_attr(node, attr_name)
            .map(|value| value.trim_matches(WHITESPACES).to_string())
            .filter(|value| !value.is_empty())
    }
}

/// 控制台链接绑定器
pub struct ConsoleLinkBinder {
    lookup_mode: LinkLookupMode,
    prompt: String,
}

impl ConsoleLinkBinder {
    pub fn new(lookup_mode: LinkLookupMode, prompt: impl Into<String>) -> Self {
        Self {
            lookup_mode,
            prompt: prompt.into(),
        }
    }

    /// 为文档中所有匹配的设备节点绑定控制台链接，返回绑定的设备数
    pub fn bind(&self, document: &Handle, links: &ConsoleLinkMap) -> usize {
        if links.is_empty() {
            return 0;
        }

        let mut bound = 0;
        for node in find_nodes(document, &NodeMatcher::TagWithClass("div", DEVICE_NODE_CLASS)) {
            let Some(key) = self.lookup_mode.device_key(&node) else {
                continue;
            };
            let Some(uri) = links.get(&key) else {
                continue;
            };

            if self.bind_node(&node, uri) {
                tracing::debug!(device = %key, uri = %uri, "bound console link");
                bound += 1;
            } else {
                tracing::debug!(device = %key, "device has no console icon, skipped");
            }
        }

        bound
    }

    fn bind_node(&self, node: &Handle, uri: &str) -> bool {
        let Some(icon) = find_descendant(node, &NodeMatcher::Class(CONSOLE_ICON_CLASS)) else {
            return false;
        };

        set_node_attr(
            node,
            "onclick",
            Some(format!("window.open('{uri}', '_blank')")),
        );

        let style = get_node_attr(node, "style").unwrap_or_default();
        set_node_attr(node, "style", Some(format!("cursor: pointer; {style}")));

        set_node_attr(
            &icon,
            "title",
            Some(format!("Telnet: {}", strip_scheme(uri))),
        );

        if let Some(name_label) = find_descendant(node, &NodeMatcher::Class(NAME_LABEL_CLASS)) {
            set_node_attr(
                &name_label,
                "title",
                Some(format!("{}{uri}", self.prompt)),
            );
        }

        true
    }
}

impl Default for ConsoleLinkBinder {
    fn default() -> Self {
        Self::new(LinkLookupMode::default(), DEFAULT_CONSOLE_PROMPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::{find_node_by_id, html_to_dom};
    use crate::parsers::html::serializer::serialize_node;

    const TEMPLATE: &str = r#"<div id="lab-viewport">
        <div id="node1" class="node node1" data-name="R1" style="top: 10px;">
            <i class="nodehtmlconsole"></i>
            <div class="node_name">R1</div>
        </div>
        <div id="node2" class="node node2" data-name="R2">
            <div class="node_name">R2</div>
        </div>
        <div id="node3" class="node node3" data-name=" SW1 ">
            <i class="nodehtmlconsole"></i>
        </div>
    </div>"#;

    fn links(pairs: &[(&str, &str)]) -> ConsoleLinkMap {
        let mut map = ConsoleLinkMap::default();
        for (key, address) in pairs {
            map.insert(key, address).unwrap();
        }
        map
    }

    #[test]
    fn binds_by_display_name() {
        let dom = html_to_dom(TEMPLATE.as_bytes(), "utf-8").unwrap();
        let links = links(&[("R1", "10.0.0.1:2000"), ("SW1", "telnet://10.0.0.3:2002")]);

        let bound = ConsoleLinkBinder::default().bind(&dom.document, &links);
        assert_eq!(bound, 2);

        let node1 = find_node_by_id(&dom.document, "node1").unwrap();
        assert_eq!(
            get_node_attr(&node1, "onclick"),
            Some("window.open('telnet://10.0.0.1:2000', '_blank')".to_string())
        );
        assert_eq!(
            get_node_attr(&node1, "style"),
            Some("cursor: pointer; top: 10px;".to_string())
        );

        let icon = find_descendant(&node1, &NodeMatcher::Class("nodehtmlconsole")).unwrap();
        assert_eq!(
            get_node_attr(&icon, "title"),
            Some("Telnet: 10.0.0.1:2000".to_string())
        );
        let label = find_descendant(&node1, &NodeMatcher::Class("node_name")).unwrap();
        assert_eq!(
            get_node_attr(&label, "title"),
            Some("Connect: telnet://10.0.0.1:2000".to_string())
        );

        // No name label is fine
        let node3 = find_node_by_id(&dom.document, "node3").unwrap();
        assert!(get_node_attr(&node3, "onclick").is_some());
    }

    #[test]
    fn leaves_unmatched_and_iconless_nodes_alone() {
        let dom = html_to_dom(TEMPLATE.as_bytes(), "utf-8").unwrap();
        let node2 = find_node_by_id(&dom.document, "node2").unwrap();
        let before = serialize_node(&node2).unwrap();

        let links = links(&[("R2", "10.0.0.2:2001"), ("ghost", "10.0.0.9:2009")]);
        let bound = ConsoleLinkBinder::default().bind(&dom.document, &links);

        assert_eq!(bound, 0);
        assert_eq!(serialize_node(&node2).unwrap(), before);
    }

    #[test]
    fn binds_by_id_with_custom_prompt() {
        let dom = html_to_dom(TEMPLATE.as_bytes(), "utf-8").unwrap();
        let links = links(&[("node1", "10.0.0.1:2000"), ("R3", "10.0.0.3:2002")]);

        let binder = ConsoleLinkBinder::new(LinkLookupMode::Id, "Подключиться: ");
        assert_eq!(binder.bind(&dom.document, &links), 1);

        let node1 = find_node_by_id(&dom.document, "node1").unwrap();
        let label = find_descendant(&node1, &NodeMatcher::Class("node_name")).unwrap();
        assert_eq!(
            get_node_attr(&label, "title"),
            Some("Подключиться: telnet://10.0.0.1:2000".to_string())
        );
    }
}
