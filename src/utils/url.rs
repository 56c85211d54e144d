pub use url::Url;

use crate::core::ConversionError;

pub const TELNET_SCHEME: &str = "telnet";

/// 把控制台地址规范化为 `telnet://` URI
///
/// 已带 `telnet://` 前缀的地址原样保留（去掉首尾空白），
/// 规范化结果必须能解析为带主机名的 URL。
pub fn normalize_console_uri(address: &str) -> Result<String, ConversionError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(ConversionError::MappingFormat(
            "console address is empty".to_string(),
        ));
    }

    let uri = if address.starts_with("telnet://") {
        address.to_string()
    } else {
        format!("{TELNET_SCHEME}://{address}")
    };

    match Url::parse(&uri) {
        Ok(parsed_url) if parsed_url.host_str().is_some_and(|host| !host.is_empty()) => Ok(uri),
        Ok(_) => Err(ConversionError::MappingFormat(format!(
            "console address \"{address}\" has no host"
        ))),
        Err(e) => Err(ConversionError::MappingFormat(format!(
            "invalid console address \"{address}\": {e}"
        ))),
    }
}

/// 去掉 URI 的协议部分，只保留 `host:port`
pub fn strip_scheme(uri: &str) -> String {
    if let Ok(parsed_url) = Url::parse(uri) {
        if let Some(host) = parsed_url.host_str() {
            return match parsed_url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            };
        }
    }

    let without_scheme = uri.split_once("://").map_or(uri, |(_, rest)| rest);
    without_scheme
        .split('/')
        .next()
        .unwrap_or(without_scheme)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_telnet_scheme() {
        assert_eq!(
            normalize_console_uri("10.0.0.1:2000").unwrap(),
            "telnet://10.0.0.1:2000"
        );
        assert_eq!(
            normalize_console_uri(" telnet://10.40.83.2:2027 ").unwrap(),
            "telnet://10.40.83.2:2027"
        );
        assert_eq!(
            normalize_console_uri("lab-host:32769").unwrap(),
            "telnet://lab-host:32769"
        );
    }

    #[test]
    fn rejects_unusable_addresses() {
        assert!(matches!(
            normalize_console_uri(""),
            Err(ConversionError::MappingFormat(_))
        ));
        assert!(normalize_console_uri("10.0.0.1:notaport").is_err());
    }

    #[test]
    fn strips_scheme() {
        assert_eq!(strip_scheme("telnet://10.0.0.1:2000"), "10.0.0.1:2000");
        assert_eq!(strip_scheme("telnet://router.lab:23/"), "router.lab:23");
        assert_eq!(strip_scheme("10.0.0.1:2000"), "10.0.0.1:2000");
    }
}
