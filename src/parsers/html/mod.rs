//! HTML解析和处理模块
//!
//! 拓扑模板的解析、清理与改写，按流水线阶段划分子模块：
//!
//! - `attrs`: 元素属性的类型化视图
//! - `dom`: DOM 解析、查询与基础变更操作
//! - `utils`: 模板约定的常量（类名、属性名）
//! - `sanitizer`: 清理编辑器遗留的瞬时状态
//! - `console_links`: 为设备节点绑定控制台链接
//! - `interfaces`: 按接口映射重写连线标签
//! - `extractor`: 提取设备与连线到独立容器
//! - `serializer`: 序列化、压缩空白与 base64 编码

pub mod attrs;
pub mod console_links;
pub mod dom;
pub mod extractor;
pub mod interfaces;
pub mod sanitizer;
pub mod serializer;
pub mod utils;

// 重新导出主要的公共 API
pub use attrs::AttributeMap;
pub use console_links::{ConsoleLinkBinder, LinkLookupMode, DEFAULT_CONSOLE_PROMPT};
pub use dom::{
    find_ancestor, find_node_by_id, find_nodes, find_nodes_by_attr, find_nodes_by_class,
    find_nodes_by_tag, get_node_attr, get_node_name, get_parent_node, get_text_content,
    html_to_dom, set_node_attr, NodeMatcher,
};
pub use extractor::{extract_topology, ExtractedFragment};
pub use interfaces::{resolve_device_name, InterfaceLabelResolver, InterfaceLookup, LabelPosition};
pub use sanitizer::{sanitize, SanitizeReport};
pub use serializer::{decode_payload, encode_payload, normalize_whitespace, serialize_node};
pub use utils::{is_device_token, VIEWPORT_ID, WHITESPACES};
