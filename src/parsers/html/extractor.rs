//! 子树提取模块
//!
//! 新建一个绝对定位、铺满视口、可拖拽的容器元素，把清理后的文档中所有设备节点
//! 和连线元素深拷贝进去，得到一个不依赖工具栏、菜单等页面框架、可以独立渲染的片段。

use std::rc::Rc;

use markup5ever_rcdom::Handle;

use super::dom::{
    append_child, create_element, deep_clone_node, find_ancestor, find_nodes, get_parent_node,
    NodeMatcher,
};
use super::utils::{CONNECTOR_CLASSES, DEVICE_NODE_CLASS};

pub const CONTAINER_ID: &str = "customText1";
pub const CONTAINER_CLASS: &str =
    "customShape customText context-menu ck-content jtk-draggable dragstopped ui-selectee";
pub const CONTAINER_STYLE: &str = "position: absolute; display: block; top: 0px; left: 0px; width: 100%; height: 100vh; z-index: 1001;";

/// 提取结果
pub struct ExtractedFragment {
    pub container: Handle,
    pub devices_copied: usize,
    pub connectors_copied: usize,
}

/// 提取设备与连线，原文档保持不变
///
/// 先按文档顺序复制设备节点，再按文档顺序复制连线元素；
/// 嵌套在另一个连线元素内部的连线元素随祖先一起复制，不会重复出现。
pub fn extract_topology(document: &Handle) -> ExtractedFragment {
    let container = create_element(
        "div",
        &[
            ("id", CONTAINER_ID),
            ("class", CONTAINER_CLASS),
            ("data-path", "1"),
            ("style", CONTAINER_STYLE),
        ],
    );

    let devices = find_nodes(document, &NodeMatcher::TagWithClass("div", DEVICE_NODE_CLASS));
    let devices_copied = devices.len();
    for device in devices.iter() {
        append_child(&container, deep_clone_node(device));
    }

    let connector_matcher = NodeMatcher::AnyClass(CONNECTOR_CLASSES);
    let mut connectors_copied = 0;
    for connector in find_nodes(document, &connector_matcher) {
        if find_ancestor(&connector, &connector_matcher).is_some() {
            continue;
        }
        // Connector markup inside a device node already travelled with it
        if devices.iter().any(|device| is_inside(&connector, device)) {
            continue;
        }

        append_child(&container, deep_clone_node(&connector));
        connectors_copied += 1;
    }

    tracing::debug!(devices_copied, connectors_copied, "extracted topology fragment");

    ExtractedFragment {
        container,
        devices_copied,
        connectors_copied,
    }
}

fn is_inside(node: &Handle, ancestor: &Handle) -> bool {
    let mut current = get_parent_node(node);
    while let Some(parent) = current {
        if Rc::ptr_eq(&parent, ancestor) {
            return true;
        }
        current = get_parent_node(&parent);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::{find_node_by_id, get_node_attr, html_to_dom, set_node_attr};
    use crate::parsers::html::serializer::serialize_node;

    const TEMPLATE: &str = r#"<html><body>
        <div id="toolbar"><button>Start all</button></div>
        <div id="lab-viewport">
            <div id="node1" class="node node1" data-name="R1"><div class="node_name">R1</div></div>
            <svg class="jtk-connector node1 node2"><path d="M0 0"></path></svg>
            <div id="ep1" class="jtk-endpoint node1"></div>
            <div id="node2" class="node node2" data-name="R2"></div>
            <div id="ov1" class="jtk-overlay node1 node2">
                <div class="node_interface" position="src">e0</div>
            </div>
            <div class="context-menu">menu</div>
        </div>
    </body></html>"#;

    #[test]
    fn copies_devices_then_connectors() {
        let dom = html_to_dom(TEMPLATE.as_bytes(), "utf-8").unwrap();
        let fragment = extract_topology(&dom.document);

        assert_eq!(fragment.devices_copied, 2);
        assert_eq!(fragment.connectors_copied, 3);

        let children = fragment.container.children.borrow();
        let ids: Vec<Option<String>> = children.iter().map(|c| get_node_attr(c, "id")).collect();
        assert_eq!(
            ids,
            vec![
                Some("node1".to_string()),
                Some("node2".to_string()),
                None,
                Some("ep1".to_string()),
                Some("ov1".to_string()),
            ]
        );
        for child in children.iter() {
            assert!(Rc::ptr_eq(&get_parent_node(child).unwrap(), &fragment.container));
        }
    }

    #[test]
    fn container_is_freestanding() {
        let dom = html_to_dom(TEMPLATE.as_bytes(), "utf-8").unwrap();
        let fragment = extract_topology(&dom.document);
        let html = serialize_node(&fragment.container).unwrap();

        assert!(html.starts_with(r#"<div id="customText1" class="customShape customText"#));
        assert!(html.contains(r#"data-path="1""#));
        assert!(!html.contains("toolbar"));
        assert!(!html.contains("lab-viewport"));
        assert!(!html.contains(">menu<"));
        assert!(html.contains("<path d=\"M0 0\"></path>"));
    }

    #[test]
    fn copies_do_not_alias_the_source() {
        let dom = html_to_dom(TEMPLATE.as_bytes(), "utf-8").unwrap();
        let fragment = extract_topology(&dom.document);

        let copy = find_node_by_id(&fragment.container, "node1").unwrap();
        set_node_attr(&copy, "data-name", Some("changed".to_string()));

        let original = find_node_by_id(&dom.document, "node1").unwrap();
        assert_eq!(get_node_attr(&original, "data-name"), Some("R1".to_string()));
        // The source tree still holds its own nodes
        assert!(find_node_by_id(&dom.document, "ov1").is_some());
    }
}
