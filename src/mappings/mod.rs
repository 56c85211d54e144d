//! # 映射输入模块
//!
//! 转换流水线的两份外部输入：
//!
//! - `console` - 设备到控制台地址的映射（JSON 对象），地址规范化为 `telnet://` URI
//! - `interfaces` - 连接记录列表（JSON 数组），每条记录描述一条连线的两个端点
//!
//! 形状错误（不是对象/数组、值不是字符串、地址不可用）返回
//! `ConversionError::MappingFormat`；端点个数不对的记录不算错误，由解析器跳过。

pub mod console;
pub mod interfaces;

pub use console::ConsoleLinkMap;
pub use interfaces::{ConnectionRecord, Endpoint, InterfaceMapping, RecordCheck};
