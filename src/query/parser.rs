//! URL 组件拆分与原始查询参数解析
//! 仅处理未解码的原始查询串（raw query），不做百分号解码

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// RFC 3986 附录B 的组件拆分正则
static URI_SPLIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:([^:/?#]+):)?(?://([^/?#]*))?([^?#]*)(?:\?([^#]*))?(?:#(.*))?$")
        .expect("URI split regex is valid")
});

static SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*$").expect("scheme regex is valid"));

/// 查询参数（附带保留标记与移除归因）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    pub name: String,
    pub value: String,
    pub keep: bool,
    /// 导致移除的规则名；None 表示未被规则移除（保留或用户手动移除）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed_by: Option<String>,
}

impl QueryParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>, keep: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            keep,
            removed_by: None,
        }
    }
}

impl fmt::Display for QueryParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}={}", self.name, self.value)
        }
    }
}

/// URL 的五个组件（原样切片，不做规范化）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlParts<'a> {
    pub scheme: Option<&'a str>,
    pub authority: Option<&'a str>,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

impl<'a> UrlParts<'a> {
    /// 拆分 URL；存在语法错误时返回 None
    pub fn split(url: &'a str) -> Option<Self> {
        let caps = URI_SPLIT.captures(url)?;
        let part = |i: usize| caps.get(i).map(|m| m.as_str());

        let parts = Self {
            scheme: part(1),
            authority: part(2),
            path: part(3).unwrap_or(""),
            query: part(4),
            fragment: part(5),
        };
        parts.is_well_formed().then_some(parts)
    }

    /// 语法校验：scheme 格式、非法字符、百分号转义、方括号位置
    fn is_well_formed(&self) -> bool {
        if let Some(scheme) = self.scheme {
            if !SCHEME.is_match(scheme) {
                return false;
            }
        }
        if let Some(authority) = self.authority {
            if !is_legal_component(authority, true) {
                return false;
            }
        }
        // 片段中不允许再出现 '#'
        if self.fragment.is_some_and(|f| f.contains('#')) {
            return false;
        }
        [Some(self.path), self.query, self.fragment]
            .into_iter()
            .flatten()
            .all(|component| is_legal_component(component, false))
    }

    /// 原始查询串中的参数对（按出现顺序）
    pub fn query_pairs(&self) -> Vec<(&'a str, &'a str)> {
        self.query.map(split_pairs).unwrap_or_default()
    }
}

impl fmt::Display for UrlParts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = self.scheme {
            write!(f, "{}:", scheme)?;
        }
        if let Some(authority) = self.authority {
            write!(f, "//{}", authority)?;
        }
        f.write_str(self.path)?;
        if let Some(query) = self.query {
            write!(f, "?{}", query)?;
        }
        if let Some(fragment) = self.fragment {
            write!(f, "#{}", fragment)?;
        }
        Ok(())
    }
}

fn is_legal_component(component: &str, allow_brackets: bool) -> bool {
    let bytes = component.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let escape_ok = bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                    && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
                if !escape_ok {
                    return false;
                }
                i += 3;
                continue;
            }
            b'[' | b']' if !allow_brackets => return false,
            b' ' | b'"' | b'<' | b'>' | b'\\' | b'^' | b'`' | b'{' | b'|' | b'}' => return false,
            b if b.is_ascii_control() => return false,
            _ => {}
        }
        i += 1;
    }
    true
}

/// 按 `&` 切分，再按首个 `=` 拆分名与值；无 `=` 时值为空串，空片段跳过
fn split_pairs(query: &str) -> Vec<(&str, &str)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .collect()
}

/// 解析 URL 的查询参数，`keep` 由白名单决定
///
/// URL 存在语法错误或无查询串时返回空列表
pub fn parse_query_params(url: &str, allowed_names: &HashSet<String>) -> Vec<QueryParam> {
    parse_with(url, |name| allowed_names.contains(name))
}

/// 解析 URL 的查询参数，全部标记为保留
pub fn parse_all_kept(url: &str) -> Vec<QueryParam> {
    parse_with(url, |_| true)
}

fn parse_with(url: &str, keep: impl Fn(&str) -> bool) -> Vec<QueryParam> {
    let Some(parts) = UrlParts::split(url) else {
        return Vec::new();
    };
    parts
        .query_pairs()
        .into_iter()
        .map(|(name, value)| QueryParam::new(name, value, keep(name)))
        .collect()
}

/// 改写中间结果的宽松查询视图（存活判定与手动移除共用）
///
/// 查询串取第一个 `?` 之后到第一个 `#` 之前。没有 `?` 时，仅当字符串以原始 URL
/// 的查询前缀（`?` 之前的部分）开头并紧跟 `&`，才把该 `&` 之后视为查询串：
/// 规则删掉首个 `?name=value` 后残留的 `/path&rest` 仍能识别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryView<'a> {
    source: &'a str,
    head: &'a str,
    separator: char,
    query: &'a str,
    fragment: Option<&'a str>,
}

impl<'a> QueryView<'a> {
    /// 在 `current` 中定位查询串；`original` 为改写前的 URL
    pub fn locate(current: &'a str, original: &str) -> Option<Self> {
        let (body, fragment) = match current.split_once('#') {
            Some((body, fragment)) => (body, Some(fragment)),
            None => (current, None),
        };

        if let Some((head, query)) = body.split_once('?') {
            return Some(Self {
                source: current,
                head,
                separator: '?',
                query,
                fragment,
            });
        }

        let prefix = query_prefix(original);
        let query = body.strip_prefix(prefix)?.strip_prefix('&')?;
        Some(Self {
            source: current,
            head: &body[..prefix.len()],
            separator: '&',
            query,
            fragment,
        })
    }

    /// 查询串中出现的参数名集合
    pub fn names(&self) -> HashSet<String> {
        split_pairs(self.query)
            .into_iter()
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// 只保留 `keep(name)` 为真的参数片段，其余部分原样输出
    ///
    /// 没有片段被去掉时返回原字符串
    pub fn retain(&self, keep: impl Fn(&str) -> bool) -> String {
        let segments: Vec<&str> = self.query.split('&').filter(|s| !s.is_empty()).collect();
        let kept: Vec<&str> = segments
            .iter()
            .copied()
            .filter(|segment| keep(segment.split_once('=').map_or(*segment, |(name, _)| name)))
            .collect();
        if kept.len() == segments.len() {
            return self.source.to_string();
        }

        let mut out = String::with_capacity(self.source.len());
        out.push_str(self.head);
        if !kept.is_empty() {
            out.push(self.separator);
            out.push_str(&kept.join("&"));
        }
        if let Some(fragment) = self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }
}

/// 原始 URL 中查询串之前的部分
fn query_prefix(url: &str) -> &str {
    let body = url.split_once('#').map_or(url, |(body, _)| body);
    body.split_once('?').map_or(body, |(head, _)| head)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_parse_query_params_whitelist() {
        let params = parse_query_params("https://example.com?id=123&utm_source=test", &allowed(&["id"]));
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "id");
        assert_eq!(params[0].value, "123");
        assert!(params[0].keep);
        assert_eq!(params[1].name, "utm_source");
        assert!(!params[1].keep);
        assert!(params.iter().all(|p| p.removed_by.is_none()));
    }

    #[test]
    fn test_parse_no_query_or_malformed() {
        assert!(parse_all_kept("https://example.com/page").is_empty());
        assert!(parse_all_kept("https://example.com/page?").is_empty());
        assert!(parse_all_kept("https://exa mple.com/?a=1").is_empty());
        assert!(parse_all_kept("https://example.com/?a=%zz").is_empty());
        assert!(parse_all_kept("1http://example.com/?a=1").is_empty());
    }

    #[test]
    fn test_parse_raw_values_and_missing_equals() {
        let params = parse_all_kept("https://e.com/?q=a%20b&flag&x=1=2&&empty=");
        let pairs: Vec<(&str, &str)> = params.iter().map(|p| (p.name.as_str(), p.value.as_str())).collect();
        assert_eq!(pairs, vec![("q", "a%20b"), ("flag", ""), ("x", "1=2"), ("empty", "")]);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let url = "https://e.com/?b=2&a=1&b=3#frag";
        let first: Vec<String> = parse_all_kept(url).into_iter().map(|p| p.name).collect();
        let second: Vec<String> = parse_all_kept(url).into_iter().map(|p| p.name).collect();
        assert_eq!(first, vec!["b", "a", "b"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_split_and_display_are_verbatim() {
        let url = "HTTPS://Example.COM:8080/a/b;c?x=1&y#sec-2";
        let parts = UrlParts::split(url).unwrap();
        assert_eq!(parts.scheme, Some("HTTPS"));
        assert_eq!(parts.authority, Some("Example.COM:8080"));
        assert_eq!(parts.path, "/a/b;c");
        assert_eq!(parts.query, Some("x=1&y"));
        assert_eq!(parts.fragment, Some("sec-2"));
        assert_eq!(parts.to_string(), url);
    }

    #[test]
    fn test_ipv6_authority_allowed() {
        assert!(UrlParts::split("http://[::1]:8080/?a=1").is_some());
        assert!(UrlParts::split("http://host/[x]").is_none());
    }

    #[test]
    fn test_query_view_after_leading_pair_removed() {
        let original = "https://example.com/page?utm_source=x&id=123&page=2";
        let view = QueryView::locate("https://example.com/page&id=123&page=2", original).unwrap();
        assert_eq!(view.names(), allowed(&["id", "page"]));
        assert_eq!(view.retain(|name| name != "id"), "https://example.com/page&page=2");
        assert_eq!(view.retain(|_| false), "https://example.com/page");
    }

    #[test]
    fn test_query_view_ignores_ampersand_inside_path() {
        // 查询串被整体删掉后，路径里的 `&id=9` 不能算作参数
        let original = "https://e.com/x&id=9/p?id=1";
        assert_eq!(QueryView::locate("https://e.com/x&id=9/p", original), None);
        assert_eq!(QueryView::locate(original, original).unwrap().names(), allowed(&["id"]));
    }

    #[test]
    fn test_query_view_question_mark_and_fragment() {
        let url = "https://example.com/?goal=signup&ref=p&&flag#a=1";
        let view = QueryView::locate(url, url).unwrap();
        assert_eq!(view.names(), allowed(&["goal", "ref", "flag"]));
        assert_eq!(view.retain(|_| true), url);
        assert_eq!(view.retain(|name| name == "goal"), "https://example.com/?goal=signup#a=1");
        assert_eq!(view.retain(|_| false), "https://example.com/#a=1");

        assert_eq!(QueryView::locate("https://example.com/page", "https://example.com/page"), None);
    }
}
