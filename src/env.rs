//! 统一的环境变量管理
//!
//! 命令行参数的默认值可以通过环境变量提供，这里集中定义这些变量及其校验规则。

use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::parsers::html::console_links::DEFAULT_CONSOLE_PROMPT;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 日志级别
pub struct LogLevel;
impl EnvVar<String> for LogLevel {
    const NAME: &'static str = "TOPO2UNL_LOG_LEVEL";
    const DEFAULT: Option<String> = None;
    const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

    fn get() -> EnvResult<String> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => Ok("info".to_string()),
        }
    }

    fn parse(value: &str) -> EnvResult<String> {
        match value.trim().to_lowercase().as_str() {
            level @ ("trace" | "debug" | "info" | "warn" | "error") => Ok(level.to_string()),
            _ => Err(EnvError {
                variable: Self::NAME.to_string(),
                message: format!(
                    "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                    value
                ),
            }),
        }
    }
}

/// 输出目录
pub struct OutputDir;
impl EnvVar<PathBuf> for OutputDir {
    const NAME: &'static str = "TOPO2UNL_OUTPUT_DIR";
    const DEFAULT: Option<PathBuf> = None;
    const DESCRIPTION: &'static str = "Directory the .unl file is written to";

    fn get() -> EnvResult<PathBuf> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => Ok(PathBuf::from(".")),
        }
    }

    fn parse(value: &str) -> EnvResult<PathBuf> {
        let value = value.trim();
        if value.is_empty() {
            return Err(EnvError {
                variable: Self::NAME.to_string(),
                message: "Output directory cannot be empty".to_string(),
            });
        }
        Ok(PathBuf::from(value))
    }
}

/// 设备名称标签上的控制台提示文本
pub struct ConsolePrompt;
impl EnvVar<String> for ConsolePrompt {
    const NAME: &'static str = "TOPO2UNL_CONSOLE_PROMPT";
    const DEFAULT: Option<String> = None;
    const DESCRIPTION: &'static str = "Prefix of the console hint shown on device name labels";

    fn get() -> EnvResult<String> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => Ok(DEFAULT_CONSOLE_PROMPT.to_string()),
        }
    }

    fn parse(value: &str) -> EnvResult<String> {
        // Trailing whitespace is part of the prompt
        Ok(value.to_string())
    }
}

/// 禁用颜色输出
pub struct NoColor;
impl EnvVar<bool> for NoColor {
    const NAME: &'static str = "NO_COLOR";
    const DEFAULT: Option<bool> = Some(false);
    const DESCRIPTION: &'static str = "Disable colored output when set to any value";

    fn parse(value: &str) -> EnvResult<bool> {
        // NO_COLOR 遵循标准：任何非空值都表示禁用颜色
        Ok(!value.is_empty())
    }
}

/// 环境变量配置汇总
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub log_level: String,
    pub output_dir: PathBuf,
    pub console_prompt: String,
    pub no_color: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            output_dir: PathBuf::from("."),
            console_prompt: DEFAULT_CONSOLE_PROMPT.to_string(),
            no_color: false,
        }
    }
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: LogLevel::get()?,
            output_dir: OutputDir::get()?,
            console_prompt: ConsolePrompt::get()?,
            no_color: NoColor::get()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::parse("DEBUG").unwrap(), "debug");
        assert_eq!(LogLevel::parse(" warn ").unwrap(), "warn");
        assert!(LogLevel::parse("verbose").is_err());
    }

    #[test]
    fn test_output_dir_parsing() {
        assert_eq!(OutputDir::parse("/tmp/labs").unwrap(), PathBuf::from("/tmp/labs"));
        assert!(OutputDir::parse("   ").is_err());
    }

    #[test]
    fn test_console_prompt_keeps_spacing() {
        assert_eq!(ConsolePrompt::parse("Console: ").unwrap(), "Console: ");
    }

    #[test]
    fn test_no_color_parsing() {
        assert!(NoColor::parse("1").unwrap());
        assert!(!NoColor::parse("").unwrap());
    }

    #[test]
    fn test_env_config_defaults() {
        let config = EnvConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.console_prompt, DEFAULT_CONSOLE_PROMPT);
        assert!(!config.no_color);
    }
}
