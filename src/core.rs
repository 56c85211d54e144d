use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use markup5ever_rcdom::RcDom;
use thiserror::Error;

use crate::builders::LabDocument;
use crate::env::{EnvVar, NoColor};
use crate::mappings::{ConsoleLinkMap, InterfaceMapping};
use crate::parsers::html::{
    encode_payload, extract_topology, find_node_by_id, find_nodes_by_tag, get_node_attr,
    html_to_dom, sanitize, serialize_node, ConsoleLinkBinder, InterfaceLabelResolver,
    LinkLookupMode, DEFAULT_CONSOLE_PROMPT, VIEWPORT_ID,
};

// 转换流水线：加载 → 清理 → 绑定控制台 → 接口标签 → 提取 → 编码 → 构建文档

/// Represents errors that can occur while converting a topology template
#[derive(Debug, Error)]
pub enum ConversionError {
    /// 模板无法构成拓扑（空输入、缺少视口等）
    #[error("parse error: {0}")]
    Parse(String),
    /// 映射输入的形状或取值不合法
    #[error("mapping format error: {0}")]
    MappingFormat(String),
    /// 设备令牌无法解析到设备；只在各阶段内部产生并作为跳过记录
    #[error("reference resolution error: {0}")]
    ReferenceResolution(String),
    /// 调用方提供的选项不可用
    #[error("invalid option: {0}")]
    InvalidOption(String),
    /// 片段无法序列化，或载荷无法解码
    #[error("payload error: {0}")]
    Payload(String),
    #[error("unable to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to write lab document: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl ConversionError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConversionError::Io {
            path: path.into(),
            source,
        }
    }

    /// 是否应当中止转换
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ConversionError::ReferenceResolution(_))
    }
}

/// Configuration options for one conversion
///
/// Built once by the caller; the pipeline never asks for anything else.
#[derive(Clone, Debug)]
pub struct ConversionOptions {
    pub lab_name: String,
    pub console_links: ConsoleLinkMap,
    pub interface_mapping: InterfaceMapping,
    pub lookup_mode: LinkLookupMode,
    pub console_prompt: String,
    /// 模板字符编码；未指定时读取 `<meta charset>`，否则按 UTF-8
    pub encoding: Option<String>,
    pub debug: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            lab_name: String::new(),
            console_links: ConsoleLinkMap::default(),
            interface_mapping: InterfaceMapping::default(),
            lookup_mode: LinkLookupMode::default(),
            console_prompt: DEFAULT_CONSOLE_PROMPT.to_string(),
            encoding: None,
            debug: false,
        }
    }
}

/// 各阶段的计数
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConversionStats {
    pub attributes_removed: usize,
    pub elements_removed: usize,
    pub devices_bound: usize,
    pub labels_rewritten: usize,
    pub records_skipped: usize,
    pub devices_copied: usize,
    pub connectors_copied: usize,
}

/// 一次成功转换的全部产物
#[derive(Clone, Debug)]
pub struct ConversionOutput {
    pub document: LabDocument,
    /// 序列化后的 UNL 文档
    pub xml: Vec<u8>,
    /// 压缩空白之前的片段，用于调试输出
    pub fragment_html: String,
    pub stats: ConversionStats,
}

/// Converts template bytes into a finished lab document
///
/// # Examples
///
/// ```
/// use topo2unl::core::{convert_template, ConversionOptions};
///
/// let options = ConversionOptions {
///     lab_name: "demo".to_string(),
///     ..Default::default()
/// };
/// let html = br#"<div id="lab-viewport"><div class="node node1" data-name="R1"></div></div>"#;
///
/// let output = convert_template(html, &options).unwrap();
/// assert_eq!(output.stats.devices_copied, 1);
/// ```
pub fn convert_template(
    input_data: &[u8],
    options: &ConversionOptions,
) -> Result<ConversionOutput, ConversionError> {
    LabConverter::new(options).convert(input_data)
}

/// Reads a template file and converts it
pub fn convert_template_file(
    path: &Path,
    options: &ConversionOptions,
) -> Result<ConversionOutput, ConversionError> {
    let input_data = fs::read(path).map_err(|e| ConversionError::io(path, e))?;
    convert_template(&input_data, options)
}

/// 转换器，负责协调整个转换流程
pub struct LabConverter<'a> {
    options: &'a ConversionOptions,
}

impl<'a> LabConverter<'a> {
    pub fn new(options: &'a ConversionOptions) -> Self {
        Self { options }
    }

    pub fn convert(&self, input_data: &[u8]) -> Result<ConversionOutput, ConversionError> {
        // 1. 验证配置
        OptionsValidator::new().validate_options(self.options)?;

        // 2. 解析模板
        let dom = TemplateLoader::new(self.options.encoding.as_deref()).load(input_data)?;

        // 3. 清理瞬时状态
        let report = sanitize(&dom.document);

        // 4. 绑定控制台链接
        let binder = ConsoleLinkBinder::new(
            self.options.lookup_mode,
            self.options.console_prompt.as_str(),
        );
        let devices_bound = binder.bind(&dom.document, &self.options.console_links);

        // 5. 重写接口标签
        let resolver = InterfaceLabelResolver::new(&self.options.interface_mapping);
        let labels_rewritten = resolver.resolve(&dom.document);

        // 6. 提取拓扑片段
        let fragment = extract_topology(&dom.document);

        // 7. 序列化、压缩并编码
        let fragment_html = serialize_node(&fragment.container)?;
        if self.options.debug {
            self.report_missing_links(&fragment_html);
        }
        let payload = encode_payload(&fragment_html);

        // 8. 构建 UNL 文档
        let document = LabDocument::new(&self.options.lab_name, payload);
        let xml = document.to_xml()?;

        let stats = ConversionStats {
            attributes_removed: report.attributes_removed,
            elements_removed: report.elements_removed,
            devices_bound,
            labels_rewritten,
            records_skipped: resolver.skipped_records(),
            devices_copied: fragment.devices_copied,
            connectors_copied: fragment.connectors_copied,
        };
        tracing::info!(
            lab = %self.options.lab_name,
            id = %document.id(),
            devices = stats.devices_copied,
            connectors = stats.connectors_copied,
            consoles = stats.devices_bound,
            labels = stats.labels_rewritten,
            "converted topology"
        );

        Ok(ConversionOutput {
            document,
            xml,
            fragment_html,
            stats,
        })
    }

    fn report_missing_links(&self, fragment_html: &str) {
        for (key, _) in self.options.console_links.iter() {
            if !fragment_html.contains(key) {
                tracing::warn!("console link key \"{key}\" does not appear in the result");
            }
        }
    }
}

/// 选项验证器
pub struct OptionsValidator;

impl OptionsValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_options(&self, options: &ConversionOptions) -> Result<(), ConversionError> {
        if options.lab_name.trim().is_empty() {
            return Err(ConversionError::InvalidOption(
                "lab name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for OptionsValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// 模板加载器
pub struct TemplateLoader {
    encoding: Option<String>,
}

impl TemplateLoader {
    pub fn new(encoding: Option<&str>) -> Self {
        Self {
            encoding: encoding.map(str::to_string),
        }
    }

    /// 解析模板并确认存在视口根元素
    pub fn load(&self, input_data: &[u8]) -> Result<RcDom, ConversionError> {
        let dom = match &self.encoding {
            Some(label) => {
                if Encoding::for_label(label.as_bytes()).is_none() {
                    tracing::warn!("unknown encoding \"{label}\", decoding as UTF-8");
                }
                html_to_dom(input_data, label)?
            }
            None => self.load_with_detected_charset(input_data)?,
        };

        if find_node_by_id(&dom.document, VIEWPORT_ID).is_none() {
            return Err(ConversionError::Parse(format!(
                "template has no #{VIEWPORT_ID} element"
            )));
        }

        Ok(dom)
    }

    fn load_with_detected_charset(&self, input_data: &[u8]) -> Result<RcDom, ConversionError> {
        let dom = html_to_dom(input_data, "utf-8")?;

        // 尝试确定文档的编码
        let declared = find_nodes_by_tag(&dom.document, "meta")
            .iter()
            .find_map(|meta| get_node_attr(meta, "charset"));
        if let Some(charset) = declared {
            if let Some(encoding) = Encoding::for_label_no_replacement(charset.trim().as_bytes()) {
                if encoding != encoding_rs::UTF_8 {
                    tracing::debug!("re-reading template as {}", encoding.name());
                    return html_to_dom(input_data, encoding.name());
                }
            }
        }

        Ok(dom)
    }
}

/// 写出的文件
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrittenFiles {
    pub lab: PathBuf,
    pub debug: Option<PathBuf>,
}

/// Sanitizes a lab name so it can be used as a file stem
pub fn sanitize_file_stem(lab_name: &str) -> String {
    lab_name
        .trim()
        .replace(['/', '\\'], "_")
        .replace('<', "[")
        .replace('>', "]")
        .replace(':', " - ")
        .replace('\"', "")
        .replace('|', "-")
        .replace('?', "")
        .trim_start_matches('.')
        .to_string()
}

/// Formats the output path for a lab name
///
/// `<dir>/<name>.unl`, or `<dir>/<name>.debug.html` for the debug artifact.
pub fn format_output_path(output_dir: &Path, lab_name: &str, is_debug: bool) -> PathBuf {
    let extension = if is_debug { "debug.html" } else { "unl" };
    output_dir.join(format!("{}.{extension}", sanitize_file_stem(lab_name)))
}

/// 一个待落盘的文件：先写入隐藏的临时兄弟文件，全部写完后再改名
struct StagedFile {
    temp: PathBuf,
    target: PathBuf,
}

impl StagedFile {
    fn write(
        output_dir: &Path,
        target: PathBuf,
        contents: &[u8],
    ) -> Result<Self, ConversionError> {
        let file_name = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp = output_dir.join(format!(".{file_name}.tmp"));
        fs::write(&temp, contents).map_err(|e| ConversionError::io(&temp, e))?;
        Ok(Self { temp, target })
    }

    fn commit(&self) -> Result<(), ConversionError> {
        fs::rename(&self.temp, &self.target).map_err(|e| ConversionError::io(&self.target, e))
    }

    fn discard(&self) {
        let _ = fs::remove_file(&self.temp);
    }
}

/// Writes the converted lab (and optionally the debug fragment) to `output_dir`
///
/// Every file is written to a temporary sibling first. Nothing is renamed into
/// place until all writes succeed, and a failed rename rolls back the files
/// already committed, so a failed call leaves no output behind.
pub fn write_lab_files(
    output_dir: &Path,
    output: &ConversionOutput,
    write_debug: bool,
) -> Result<WrittenFiles, ConversionError> {
    fs::create_dir_all(output_dir).map_err(|e| ConversionError::io(output_dir, e))?;

    let name = output.document.name();
    let mut staged = Vec::with_capacity(2);

    // The debug artifact goes first so the .unl is the last file to appear
    if write_debug {
        let debug_path = format_output_path(output_dir, name, true);
        staged.push(StagedFile::write(
            output_dir,
            debug_path,
            output.fragment_html.as_bytes(),
        )?);
    }
    let lab_path = format_output_path(output_dir, name, false);
    match StagedFile::write(output_dir, lab_path.clone(), &output.xml) {
        Ok(file) => staged.push(file),
        Err(e) => {
            staged.iter().for_each(StagedFile::discard);
            return Err(e);
        }
    }

    for (index, file) in staged.iter().enumerate() {
        if let Err(e) = file.commit() {
            for committed in &staged[..index] {
                let _ = fs::remove_file(&committed.target);
            }
            staged[index..].iter().for_each(StagedFile::discard);
            return Err(e);
        }
        tracing::debug!("wrote {}", file.target.display());
    }

    let debug = write_debug.then(|| format_output_path(output_dir, name, true));
    Ok(WrittenFiles {
        lab: lab_path,
        debug,
    })
}

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// Prints an error message to stderr
pub fn print_error_message(msg: &str) {
    if NoColor::get_or_default(false) {
        eprintln!("{msg}");
    } else {
        eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
    }
}

/// Prints an info message to stdout
pub fn print_info_message(msg: &str) {
    println!("{msg}");
}
