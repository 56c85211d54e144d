use std::sync::LazyLock;

use base64::{prelude::BASE64_STANDARD, Engine};
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use markup5ever_rcdom::{Handle, NodeData, SerializableHandle};
use regex::Regex;

use crate::core::ConversionError;

static LINE_BREAKS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n\t]+").expect("valid line break pattern"));
static SPACE_RUNS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ ]{2,}").expect("valid space run pattern"));

/// 序列化节点
///
/// 文档节点只输出其子节点，元素节点连同自身一起输出。
pub fn serialize_node(node: &Handle) -> Result<String, ConversionError> {
    let traversal_scope = match node.data {
        NodeData::Document => TraversalScope::ChildrenOnly(None),
        _ => TraversalScope::IncludeNode,
    };

    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = node.clone().into();
    serialize(
        &mut buf,
        &serializable,
        SerializeOpts {
            traversal_scope,
            ..Default::default()
        },
    )
    .map_err(|e| ConversionError::Payload(format!("unable to serialize fragment: {e}")))?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// 压缩空白
///
/// 换行/制表符序列折叠为一个空格，连续空格折叠为一个，去掉首尾空白，
/// 最后删除所有剩余空格，得到一个不含空格的连续记号。
pub fn normalize_whitespace(content: &str) -> String {
    let content = LINE_BREAKS_RE.replace_all(content, " ");
    let content = SPACE_RUNS_RE.replace_all(&content, " ");
    content.trim().replace(' ', "")
}

/// 将规范化后的片段编码为标准 base64
pub fn encode_payload(markup: &str) -> String {
    BASE64_STANDARD.encode(normalize_whitespace(markup).as_bytes())
}

/// 解码载荷，用于检查和调试
pub fn decode_payload(payload: &str) -> Result<String, ConversionError> {
    let bytes = BASE64_STANDARD
        .decode(payload.trim())
        .map_err(|e| ConversionError::Payload(format!("payload is not valid base64: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| ConversionError::Payload(format!("payload is not valid UTF-8: {e}")))
}
