//! 对外接口：供界面/展示层调用的简化函数
//! 所有函数都不抛错，失败路径一律降级为可展示的结果

use std::collections::HashSet;

use crate::compiler;
use crate::pipeline::{AttributionEngine, ProcessResult, RewritePipeline};
use crate::query::{self, QueryParam};
use crate::rule::Rule;
use crate::utils;

/// 按顺序应用规则（`disabled_indices` 为本次调用临时关闭的规则下标）
pub fn apply_transforms(url: &str, rules: &[Rule], disabled_indices: &HashSet<usize>) -> ProcessResult {
    RewritePipeline::apply(url, rules, disabled_indices)
}

/// 单条规则是否命中 URL
pub fn transform_matches(url: &str, rule: &Rule) -> bool {
    RewritePipeline::transform_matches(url, rule)
}

/// 正则是否可编译
pub fn is_valid_pattern(pattern: &str) -> bool {
    compiler::is_valid_pattern(pattern)
}

/// 解析查询参数，白名单内的参数默认保留
pub fn parse_query_params(url: &str, allowed_names: &HashSet<String>) -> Vec<QueryParam> {
    query::parse_query_params(url, allowed_names)
}

/// 只用 `keep == true` 的参数重建 URL
pub fn reconstruct_url(url: &str, params: &[QueryParam]) -> String {
    query::reconstruct_url(url, params)
}

/// 解析原始 URL 的参数并标注去留与移除原因（保留在前，移除在后）
pub fn parse_params_with_tracking(
    original_url: &str,
    rules: &[Rule],
    disabled_indices: &HashSet<usize>,
    user_removed: &HashSet<String>,
) -> Vec<QueryParam> {
    AttributionEngine::attribute(original_url, rules, disabled_indices, user_removed)
}

/// 从任意文本中提取 http(s) URL
pub fn extract_url(text: &str) -> Option<String> {
    utils::extract_url(text)
}

/// 文本是否以 http(s):// 开头（忽略前导空白与大小写）
pub fn looks_like_url(text: &str) -> bool {
    utils::looks_like_url(text)
}
