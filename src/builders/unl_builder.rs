//! UNL 实验文档构建器
//!
//! 把编码后的拓扑片段包装成仿真平台可导入的 `lab` XML 文档。
//! 每个文档在创建时生成新的 UUID v4 作为标识，口令为标识文本的 MD5 十六进制摘要。

use md5::{Digest, Md5};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use uuid::Uuid;

use crate::core::ConversionError;

pub const TEXT_OBJECT_ID: &str = "physical-topology";
pub const TEXT_OBJECT_NAME: &str = "physical";

/// 根元素上的固定属性，按输出顺序排列（位于 `name`、`id` 之后，`password` 穿插其中）
const LAB_HEAD_ATTRS: &[(&str, &str)] = &[("version", "1"), ("scripttimeout", "300")];
const LAB_TAIL_ATTRS: &[(&str, &str)] = &[
    ("author", "1"),
    ("countdown", "60"),
    ("darkmode", ""),
    ("mode3d", ""),
    ("nogrid", ""),
    ("joinable", "2"),
    ("joinable_emails", "admin"),
    ("openable", "2"),
    ("openable_emails", "admin"),
    ("editable", "2"),
    ("editable_emails", "admin"),
    ("multi_config_active", ""),
];

/// 实验文档
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabDocument {
    name: String,
    id: Uuid,
    password: String,
    payload: String,
}

impl LabDocument {
    pub fn new(name: &str, payload: String) -> Self {
        Self::with_id(name, Uuid::new_v4(), payload)
    }

    /// 使用给定标识创建文档，口令由标识推导
    pub fn with_id(name: &str, id: Uuid, payload: String) -> Self {
        Self {
            name: name.to_string(),
            password: derive_password(&id),
            id,
            payload,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// 输出带 XML 声明的完整文档
    pub fn to_xml(&self) -> Result<Vec<u8>, ConversionError> {
        let mut writer = Writer::new(Vec::new());
        self.write_lab(&mut writer)?;
        Ok(writer.into_inner())
    }

    fn write_lab(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), quick_xml::Error> {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let id = self.id.to_string();
        let mut lab = BytesStart::new("lab");
        lab.push_attribute(("name", self.name.as_str()));
        lab.push_attribute(("id", id.as_str()));
        for &attr in LAB_HEAD_ATTRS {
            lab.push_attribute(attr);
        }
        lab.push_attribute(("password", self.password.as_str()));
        for &attr in LAB_TAIL_ATTRS {
            lab.push_attribute(attr);
        }
        writer.write_event(Event::Start(lab))?;

        writer.write_event(Event::Empty(BytesStart::new("topology")))?;

        writer.write_event(Event::Start(BytesStart::new("objects")))?;
        writer.write_event(Event::Start(BytesStart::new("textobjects")))?;

        let mut textobject = BytesStart::new("textobject");
        textobject.push_attribute(("id", TEXT_OBJECT_ID));
        textobject.push_attribute(("name", TEXT_OBJECT_NAME));
        textobject.push_attribute(("type", "text"));
        writer.write_event(Event::Start(textobject))?;

        writer.write_event(Event::Start(BytesStart::new("data")))?;
        writer.write_event(Event::Text(BytesText::new(&self.payload)))?;
        writer.write_event(Event::End(BytesEnd::new("data")))?;

        writer.write_event(Event::End(BytesEnd::new("textobject")))?;
        writer.write_event(Event::End(BytesEnd::new("textobjects")))?;
        writer.write_event(Event::End(BytesEnd::new("objects")))?;

        writer.write_event(Event::Empty(BytesStart::new("workbooks")))?;
        writer.write_event(Event::End(BytesEnd::new("lab")))?;
        Ok(())
    }
}

/// 口令：标识文本的小写十六进制 MD5
pub fn derive_password(id: &Uuid) -> String {
    format!("{:x}", Md5::digest(id.to_string().as_bytes()))
}
