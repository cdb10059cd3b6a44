//! URL 重建：仅保留 `keep == true` 的参数
//! scheme/authority/path/fragment 原样保留；无保留参数时整体省略查询串

use super::parser::{QueryParam, UrlParts};

/// 用过滤后的参数重建 URL
///
/// URL 存在语法错误时原样返回输入
pub fn reconstruct_url(url: &str, params: &[QueryParam]) -> String {
    let Some(parts) = UrlParts::split(url) else {
        return url.to_string();
    };

    let query = params
        .iter()
        .filter(|p| p.keep)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("&");

    UrlParts {
        query: (!query.is_empty()).then_some(query.as_str()),
        ..parts
    }
    .to_string()
}
