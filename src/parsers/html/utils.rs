/// 视口根节点 id
pub const VIEWPORT_ID: &str = "lab-viewport";

/// 设备节点的 class 令牌
pub const DEVICE_NODE_CLASS: &str = "node";
/// 设备显示名称属性
pub const DEVICE_NAME_ATTR: &str = "data-name";
/// 控制台图标（`<i class="nodehtmlconsole">`）
pub const CONSOLE_ICON_CLASS: &str = "nodehtmlconsole";
/// 设备名称标签
pub const NAME_LABEL_CLASS: &str = "node_name";
/// 状态指示图标（`<i class="node_status">`）
pub const STATUS_ICON_CLASS: &str = "node_status";
/// 隐藏元素
pub const HIDDEN_CLASS: &str = "hidden";

/// 连线相关元素的 class 令牌
pub const CONNECTOR_CLASSES: &[&str] = &["jtk-connector", "jtk-endpoint", "jtk-overlay"];
/// 携带两端设备令牌的连线元素
pub const LINK_CARRIER_CLASSES: &[&str] = &["jtk-overlay", "jtk-connector"];
/// 接口名称标签
pub const INTERFACE_LABEL_CLASS: &str = "node_interface";
pub const POSITION_ATTR: &str = "position";

/// ASCII 空白字符
pub const WHITESPACES: &[char] = &[' ', '\t', '\n', '\x0c', '\r'];

/// 判断 class 令牌是否标识一台设备，如 `node3`
///
/// `node`、`node_name`、`nodehtmlconsole` 等都不是设备令牌。
pub fn is_device_token(token: &str) -> bool {
    token
        .strip_prefix(DEVICE_NODE_CLASS)
        .is_some_and(|suffix| !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()))
}
