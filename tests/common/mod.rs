// 集成测试公共模块
//
// 提供测试模板和共享辅助函数

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use topo2unl::core::ConversionOutput;
use topo2unl::parsers::html::decode_payload;

/// 三台设备的拓扑，只有 node1 带控制台图标
pub const THREE_NODE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Lab</title></head>
<body>
    <div id="topbar"><button>Start all nodes</button></div>
    <div id="lab-viewport" data-path="1">
        <div id="node1" class="node node1" data-name="node1" data-status="0" style="top: 120px; left: 80px;" onmousedown="select(this)">
            <div class="tag hidden" title="Start">start</div>
            <i class="node_status"></i>
            <i class="nodehtmlconsole"></i>
            <div class="node_name">node1</div>
        </div>
        <div id="node2" class="node node2" data-name="node2" style="top: 120px; left: 320px;">
            <div class="node_name">node2</div>
        </div>
        <div id="node3" class="node node3" data-name="node3" style="top: 320px; left: 200px;">
            <div class="node_name">node3</div>
        </div>
        <svg class="jtk-connector node1 node2" width="240" height="4"><path d="M 0 0 L 240 0"></path></svg>
        <div class="jtk-endpoint node1"></div>
        <div class="jtk-overlay node1 node2">
            <div class="node_interface" position="src">e0</div>
            <div class="node_interface" position="dst">e0</div>
        </div>
        <div class="jtk-overlay node2 node3">
            <div class="node_interface" position="src">e1</div>
            <div class="node_interface" position="dst">e1</div>
        </div>
        <div class="hidden">context menu</div>
    </div>
</body>
</html>
"#;

pub const CONSOLE_LINKS: &str = r#"{"node1": "10.0.0.1:2000"}"#;

pub const INTERFACE_MAPPING: &str = r#"[
    {"node2": "Gi0/2", "node1": "Gi0/1"},
    {"node3": "Gi0/3", "node2": "Gi0/4"},
    {"node1": "Gi0/9"}
]"#;

/// 解码载荷得到片段标记
pub fn payload_markup(output: &ConversionOutput) -> String {
    decode_payload(output.document.payload()).expect("payload should decode")
}

/// 在目录中写入一个测试文件
pub fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path
}
