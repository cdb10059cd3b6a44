//! 文本中的 URL 识别
//! 从任意文本（分享内容、选中文本）中尽力找出 http(s) URL，永不抛错

use once_cell::sync::Lazy;
use regex::Regex;

/// 内嵌 URL 匹配（scheme 不区分大小写）
static EMBEDDED_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i:https?)://[A-Za-z0-9_\-.~:/?#\[\]@!$&'()*+,;=%]+")
        .expect("embedded URL regex is valid")
});

/// 从文本中提取第一个 http(s) URL
///
/// 未找到内嵌 URL 时，若去掉首尾空白后的文本以 http(s):// 开头则整体返回
pub fn extract_url(text: &str) -> Option<String> {
    if let Some(found) = EMBEDDED_URL.find(text) {
        return Some(found.as_str().to_string());
    }
    let trimmed = text.trim();
    looks_like_url(trimmed).then(|| trimmed.to_string())
}

/// 文本（忽略前导空白）是否以 `http://` 或 `https://` 开头，不区分大小写
pub fn looks_like_url(text: &str) -> bool {
    let text = text.trim_start();
    ["http://", "https://"].iter().any(|scheme| {
        text.get(..scheme.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
    })
}

/// 用于展示的主机名（去掉 `www.` 前缀）；无法解析时返回 None
pub fn host_label(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}
