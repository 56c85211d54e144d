//! 属性清理模块
//!
//! 移除模板中只对编辑器界面有意义的瞬时状态：
//!
//! - `data-status="0"` 属性（元素保留）
//! - `onmousedown` 行为属性
//! - class 令牌集合恰好为 `{hidden}` 的元素（连同子树）
//! - `<i class="node_status">` 状态图标
//!
//! 清理是幂等的：执行两次与执行一次得到相同的树。

use std::collections::BTreeSet;

use markup5ever_rcdom::{Handle, NodeData};

use super::attrs::AttributeMap;
use super::dom::{detach_node, get_node_name};
use super::utils::{HIDDEN_CLASS, STATUS_ICON_CLASS};

const STATUS_ATTR: &str = "data-status";
const MOUSE_DOWN_ATTR: &str = "onmousedown";

/// 一次清理的统计
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    pub attributes_removed: usize,
    pub elements_removed: usize,
}

impl SanitizeReport {
    pub fn is_noop(&self) -> bool {
        self.attributes_removed == 0 && self.elements_removed == 0
    }
}

/// 清理整棵树
pub fn sanitize(document: &Handle) -> SanitizeReport {
    let mut report = SanitizeReport::default();
    sanitize_children(document, &mut report);
    tracing::debug!(
        attributes_removed = report.attributes_removed,
        elements_removed = report.elements_removed,
        "sanitized template"
    );
    report
}

fn sanitize_children(node: &Handle, report: &mut SanitizeReport) {
    // Snapshot: detaching mutates the child list
    let children: Vec<Handle> = node.children.borrow().clone();

    for child in children.iter() {
        if !matches!(child.data, NodeData::Element { .. }) {
            continue;
        }

        if is_transient_element(child) {
            if detach_node(child) {
                report.elements_removed += 1;
            }
            continue;
        }

        strip_transient_attrs(child, report);
        sanitize_template_contents(child, report);
        sanitize_children(child, report);
    }
}

// Queries descend into <template> contents, so cleaning must too
fn sanitize_template_contents(node: &Handle, report: &mut SanitizeReport) {
    if let NodeData::Element {
        ref template_contents,
        ..
    } = node.data
    {
        let contents = template_contents.borrow().clone();
        if let Some(contents) = contents {
            sanitize_children(&contents, report);
        }
    }
}

/// 是否为应整体移除的隐藏元素或状态图标
pub fn is_transient_element(node: &Handle) -> bool {
    let Some(attrs) = AttributeMap::of(node) else {
        return false;
    };
    let tokens: BTreeSet<String> = attrs.class_tokens().into_iter().collect();

    if tokens.len() == 1 && tokens.contains(HIDDEN_CLASS) {
        return true;
    }

    get_node_name(node) == Some("i") && tokens.contains(STATUS_ICON_CLASS)
}

fn strip_transient_attrs(node: &Handle, report: &mut SanitizeReport) {
    let Some(attrs) = AttributeMap::of(node) else {
        return;
    };

    if attrs.get(STATUS_ATTR).as_deref() == Some("0") {
        attrs.remove(STATUS_ATTR);
        report.attributes_removed += 1;
    }

    if attrs.remove(MOUSE_DOWN_ATTR).is_some() {
        report.attributes_removed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::{
        find_node_by_id, find_nodes_by_attr, find_nodes_by_class, get_node_attr, html_to_dom,
    };
    use crate::parsers::html::serializer::serialize_node;

    const TEMPLATE: &str = r#"<div id="lab-viewport">
        <div id="node1" class="node node1" data-status="0" onmousedown="drag(this)" data-name="R1">
            <i class="node_status glyphicon"></i>
            <i class="nodehtmlconsole"></i>
            <div class="node_name">R1</div>
        </div>
        <div id="node2" class="node node2" data-status="2" data-name="R2"></div>
        <div id="gone" class="hidden"><span>menu</span></div>
        <div id="kept" class="hidden modal"></div>
        <span id="status" class="node_status"></span>
    </div>"#;

    #[test]
    fn strips_transient_state() {
        let dom = html_to_dom(TEMPLATE.as_bytes(), "utf-8").unwrap();
        let report = sanitize(&dom.document);

        assert_eq!(report.attributes_removed, 2);
        assert_eq!(report.elements_removed, 2);

        let node1 = find_node_by_id(&dom.document, "node1").unwrap();
        assert_eq!(get_node_attr(&node1, "data-status"), None);
        assert_eq!(get_node_attr(&node1, "onmousedown"), None);
        assert_eq!(get_node_attr(&node1, "data-name"), Some("R1".to_string()));

        // Only "0" is transient
        let node2 = find_node_by_id(&dom.document, "node2").unwrap();
        assert_eq!(get_node_attr(&node2, "data-status"), Some("2".to_string()));

        assert!(find_node_by_id(&dom.document, "gone").is_none());
        assert!(find_node_by_id(&dom.document, "kept").is_some());
        // Status class on a non-<i> element stays
        assert!(find_node_by_id(&dom.document, "status").is_some());

        let html = serialize_node(&node1).unwrap();
        assert!(!html.contains("node_status"));
        assert!(html.contains("nodehtmlconsole"));
    }

    #[test]
    fn is_idempotent() {
        let dom = html_to_dom(TEMPLATE.as_bytes(), "utf-8").unwrap();

        sanitize(&dom.document);
        let once = serialize_node(&dom.document).unwrap();

        let second = sanitize(&dom.document);
        let twice = serialize_node(&dom.document).unwrap();

        assert!(second.is_noop());
        assert_eq!(once, twice);
    }

    #[test]
    fn nothing_to_do() {
        let dom = html_to_dom(b"<div id=\"lab-viewport\"></div>", "utf-8").unwrap();
        assert!(sanitize(&dom.document).is_noop());
    }

    #[test]
    fn cleans_template_contents() {
        let html = r#"<div id="lab-viewport"><template>
            <div id="node9" class="node node9" data-status="0" onmousedown="drag(this)">
                <i class="node_status"></i>
                <div class="hidden"></div>
            </div>
        </template></div>"#;
        let dom = html_to_dom(html.as_bytes(), "utf-8").unwrap();

        let report = sanitize(&dom.document);
        assert_eq!(report.attributes_removed, 2);
        assert_eq!(report.elements_removed, 2);

        let node9 = find_nodes_by_attr(&dom.document, "id", "node9");
        assert_eq!(node9.len(), 1);
        assert_eq!(get_node_attr(&node9[0], "data-status"), None);
        assert_eq!(get_node_attr(&node9[0], "onmousedown"), None);
        assert!(find_nodes_by_class(&dom.document, "node_status").is_empty());
        assert!(find_nodes_by_class(&dom.document, "hidden").is_empty());

        assert!(sanitize(&dom.document).is_noop());
    }
}
