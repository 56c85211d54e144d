//! # 解析器模块
//!
//! 拓扑模板（HTML）的解析与改写。
//!
//! # 模块组织
//!
//! - `html` - DOM 解析、清理、控制台绑定、接口标签、片段提取与编码

pub mod html;

// Re-export commonly used items for convenience
pub use html::{
    decode_payload, encode_payload, extract_topology, html_to_dom, sanitize, serialize_node,
    ConsoleLinkBinder, InterfaceLabelResolver, LinkLookupMode,
};
