use std::cell::RefCell;
use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::parse_document;
use html5ever::tendril::{format_tendril, TendrilSink};
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

use crate::core::ConversionError;

use super::attrs::AttributeMap;

/// DOM查询条件
///
/// 树查询只支持这一组固定的匹配方式，不接受任意闭包。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeMatcher<'a> {
    /// 按标签名匹配
    Tag(&'a str),
    /// 按 class 令牌匹配
    Class(&'a str),
    /// 同时匹配标签名和 class 令牌
    TagWithClass(&'a str, &'a str),
    /// 匹配任意一个 class 令牌
    AnyClass(&'a [&'a str]),
    /// 按属性值相等匹配
    Attr(&'a str, &'a str),
}

impl NodeMatcher<'_> {
    pub fn matches(&self, node: &Handle) -> bool {
        let Some(attrs) = AttributeMap::of(node) else {
            return false;
        };

        match *self {
            NodeMatcher::Tag(tag) => get_node_name(node) == Some(tag),
            NodeMatcher::Class(token) => attrs.has_class(token),
            NodeMatcher::TagWithClass(tag, token) => {
                get_node_name(node) == Some(tag) && attrs.has_class(token)
            }
            NodeMatcher::AnyClass(tokens) => tokens.iter().any(|token| attrs.has_class(token)),
            NodeMatcher::Attr(name, value) => attrs.get(name).as_deref() == Some(value),
        }
    }
}

/// 将 HTML 字节转换为 DOM
///
/// 解析是宽松的：未闭合的标签会被自动闭合。
/// 空输入无法构成拓扑模板，返回 `ConversionError::Parse`。
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> Result<RcDom, ConversionError> {
    let s: String = if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        string.to_string()
    } else {
        String::from_utf8_lossy(data).to_string()
    };

    if s.trim().is_empty() {
        return Err(ConversionError::Parse("template is empty".to_string()));
    }

    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut s.as_bytes())
        .map_err(|e| ConversionError::Parse(format!("unable to read markup: {e}")))
}

/// 深度优先查找所有匹配的后代节点（包括自身）
pub fn find_nodes(node: &Handle, matcher: &NodeMatcher) -> Vec<Handle> {
    let mut found_nodes = Vec::new();
    collect_nodes(node, matcher, &mut found_nodes);
    found_nodes
}

fn collect_nodes(node: &Handle, matcher: &NodeMatcher, found_nodes: &mut Vec<Handle>) {
    if matcher.matches(node) {
        found_nodes.push(node.clone());
    }

    if let NodeData::Element {
        ref template_contents,
        ..
    } = node.data
    {
        if let Some(contents) = template_contents.borrow().as_ref() {
            collect_nodes(contents, matcher, found_nodes);
        }
    }

    for child_node in node.children.borrow().iter() {
        collect_nodes(child_node, matcher, found_nodes);
    }
}

/// 按文档顺序返回第一个匹配的节点（包括自身）
pub fn find_first(node: &Handle, matcher: &NodeMatcher) -> Option<Handle> {
    if matcher.matches(node) {
        return Some(node.clone());
    }

    node.children
        .borrow()
        .iter()
        .find_map(|child_node| find_first(child_node, matcher))
}

/// 查找第一个匹配的后代节点（不包括自身）
pub fn find_descendant(node: &Handle, matcher: &NodeMatcher) -> Option<Handle> {
    node.children
        .borrow()
        .iter()
        .find_map(|child_node| find_first(child_node, matcher))
}

pub fn find_nodes_by_tag(node: &Handle, tag: &str) -> Vec<Handle> {
    find_nodes(node, &NodeMatcher::Tag(tag))
}

pub fn find_nodes_by_class(node: &Handle, token: &str) -> Vec<Handle> {
    find_nodes(node, &NodeMatcher::Class(token))
}

pub fn find_nodes_by_attr(node: &Handle, attr_name: &str, attr_value: &str) -> Vec<Handle> {
    find_nodes(node, &NodeMatcher::Attr(attr_name, attr_value))
}

pub fn find_node_by_id(node: &Handle, id: &str) -> Option<Handle> {
    find_first(node, &NodeMatcher::Attr("id", id))
}

/// 查找最近的匹配祖先节点（不包括自身）
pub fn find_ancestor(node: &Handle, matcher: &NodeMatcher) -> Option<Handle> {
    let mut current = get_parent_node(node);

    while let Some(ancestor) = current {
        if matcher.matches(&ancestor) {
            return Some(ancestor);
        }
        current = get_parent_node(&ancestor);
    }

    None
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    AttributeMap::of(node).and_then(|attrs| attrs.get(attr_name))
}

/// 设置节点属性，`None` 表示删除该属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    if let Some(attrs) = AttributeMap::of(node) {
        match attr_value {
            Some(attr_value) => attrs.set(attr_name, &attr_value),
            None => {
                attrs.remove(attr_name);
            }
        }
    }
}

/// 获取父节点
///
/// 父引用是弱引用，只用于向上查找；根节点或已分离的节点返回 `None`。
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak_parent = child.parent.take();
    let parent = weak_parent.as_ref().and_then(|node| node.upgrade());
    child.parent.set(weak_parent);
    parent
}

/// 将节点追加为父节点的最后一个子节点
pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// 把节点（连同子树）从父节点上摘除
///
/// 节点本来就没有父节点时返回 `false`。
pub fn detach_node(node: &Handle) -> bool {
    let Some(parent) = get_parent_node(node) else {
        return false;
    };

    let mut siblings = parent.children.borrow_mut();
    let Some(index) = siblings.iter().position(|sibling| Rc::ptr_eq(sibling, node)) else {
        return false;
    };
    siblings.remove(index);
    node.parent.set(None);

    true
}

/// 创建一个游离的新元素
pub fn create_element(tag: &str, attributes: &[(&str, &str)]) -> Handle {
    let attrs = attributes
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(*name)),
            value: format_tendril!("{}", value),
        })
        .collect();

    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(tag)),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// 深拷贝节点及其整个子树
///
/// 拷贝拥有全新的身份，不与原树共享任何可变状态，且没有父节点。
pub fn deep_clone_node(node: &Handle) -> Handle {
    let data = match &node.data {
        NodeData::Document => NodeData::Document,
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => NodeData::Doctype {
            name: name.clone(),
            public_id: public_id.clone(),
            system_id: system_id.clone(),
        },
        NodeData::Text { contents } => NodeData::Text {
            contents: RefCell::new(contents.borrow().clone()),
        },
        NodeData::Comment { contents } => NodeData::Comment {
            contents: contents.clone(),
        },
        NodeData::Element {
            name,
            attrs,
            template_contents,
            mathml_annotation_xml_integration_point,
        } => NodeData::Element {
            name: name.clone(),
            attrs: RefCell::new(attrs.borrow().clone()),
            template_contents: RefCell::new(template_contents.borrow().as_ref().map(deep_clone_node)),
            mathml_annotation_xml_integration_point: *mathml_annotation_xml_integration_point,
        },
        NodeData::ProcessingInstruction { target, contents } => NodeData::ProcessingInstruction {
            target: target.clone(),
            contents: contents.clone(),
        },
    };

    let copy = Node::new(data);
    for child_node in node.children.borrow().iter() {
        append_child(&copy, deep_clone_node(child_node));
    }
    copy
}

/// 拼接节点下所有文本内容
pub fn get_text_content(node: &Handle) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text(node: &Handle, text: &mut String) {
    if let NodeData::Text { ref contents } = node.data {
        text.push_str(&contents.borrow());
    }
    for child_node in node.children.borrow().iter() {
        collect_text(child_node, text);
    }
}

/// 用一个文本节点替换元素的全部子节点
pub fn set_text_content(node: &Handle, text: &str) {
    for child_node in node.children.borrow_mut().drain(..) {
        child_node.parent.set(None);
    }

    let text_node = Node::new(NodeData::Text {
        contents: RefCell::new(format_tendril!("{}", text)),
    });
    append_child(node, text_node);
}
