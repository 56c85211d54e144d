//! 元素属性视图
//!
//! `AttributeMap` 是对 html5ever 元素属性列表的类型化封装，
//! 提供存在性检查、读取、写入、删除以及 class 令牌集合的访问。
//! 属性不存在时返回 `None`，而不是 panic。

use std::cell::RefCell;

use html5ever::interface::{Attribute, QualName};
use html5ever::tendril::format_tendril;
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, NodeData};

/// 单个元素的属性视图
///
/// 只借用节点的属性列表，修改直接作用于原节点。
pub struct AttributeMap<'a> {
    attrs: &'a RefCell<Vec<Attribute>>,
}

impl<'a> AttributeMap<'a> {
    /// 获取元素节点的属性视图；非元素节点（文本、注释等）返回 `None`
    pub fn of(node: &'a Handle) -> Option<Self> {
        match &node.data {
            NodeData::Element { attrs, .. } => Some(AttributeMap { attrs }),
            _ => None,
        }
    }

    pub fn contains(&self, attr_name: &str) -> bool {
        self.attrs
            .borrow()
            .iter()
            .any(|attr| &*attr.name.local == attr_name)
    }

    pub fn get(&self, attr_name: &str) -> Option<String> {
        self.attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string())
    }

    /// 设置属性值，属性已存在时原位覆盖以保持属性顺序
    pub fn set(&self, attr_name: &str, attr_value: &str) {
        let attrs_mut = &mut self.attrs.borrow_mut();

        if let Some(attr) = attrs_mut
            .iter_mut()
            .find(|attr| &*attr.name.local == attr_name)
        {
            attr.value.clear();
            attr.value.push_slice(attr_value);
            return;
        }

        attrs_mut.push(Attribute {
            name: QualName::new(None, ns!(), LocalName::from(attr_name)),
            value: format_tendril!("{}", attr_value),
        });
    }

    /// 删除属性，返回被删除的值
    pub fn remove(&self, attr_name: &str) -> Option<String> {
        let attrs_mut = &mut self.attrs.borrow_mut();
        let index = attrs_mut
            .iter()
            .position(|attr| &*attr.name.local == attr_name)?;
        let removed = attrs_mut.remove(index);
        attrs_mut.retain(|attr| &*attr.name.local != attr_name);

        Some(removed.value.to_string())
    }

    /// 按出现顺序返回 class 令牌
    pub fn class_tokens(&self) -> Vec<String> {
        self.get("class")
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, token: &str) -> bool {
        self.get("class")
            .map(|value| value.split_whitespace().any(|t| t == token))
            .unwrap_or(false)
    }

    pub fn names(&self) -> Vec<String> {
        self.attrs
            .borrow()
            .iter()
            .map(|attr| attr.name.local.to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.attrs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
