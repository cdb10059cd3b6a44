//! 改写流水线：按顺序把生效规则折叠到 URL 字符串上
//! 正则无效的规则静默跳过；最终 scheme 校验失败只作软错误返回

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compiler::{CompiledRule, RuleCompiler};
use crate::rule::Rule;

/// scheme 校验失败时的诊断信息
pub const INVALID_SCHEME_MESSAGE: &str =
    "Invalid URL scheme. URL must start with http:// or https://";

/// 一次完整流水线的输出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResult {
    pub url: String,
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessResult {
    pub fn success(url: String) -> Self {
        Self {
            url,
            is_valid: true,
            error: None,
        }
    }

    pub fn error(url: String, error: impl Into<String>) -> Self {
        Self {
            url,
            is_valid: false,
            error: Some(error.into()),
        }
    }
}

/// 改写流水线
pub struct RewritePipeline;

impl RewritePipeline {
    /// 对 URL 依次应用规则，返回最终字符串与 scheme 校验结果
    pub fn apply(url: &str, rules: &[Rule], disabled_overrides: &HashSet<usize>) -> ProcessResult {
        let compiled = RuleCompiler::compile_active(rules, disabled_overrides);
        let result = Self::fold(url, &compiled, |_, _| {});
        Self::validate(result)
    }

    /// 纯折叠：每一步的输出作为下一步的输入，每步结束后回调 `on_step(规则, 当前字符串)`
    pub fn fold<F>(url: &str, compiled: &[CompiledRule], mut on_step: F) -> String
    where
        F: FnMut(&CompiledRule, &str),
    {
        compiled.iter().fold(url.to_string(), |current, rule| {
            let next = rule.apply(current);
            on_step(rule, &next);
            next
        })
    }

    /// 最终 scheme 校验（区分大小写，与改写结果保持一致）
    pub fn validate(url: String) -> ProcessResult {
        if url.starts_with("http://") || url.starts_with("https://") {
            ProcessResult::success(url)
        } else {
            debug!("改写结果scheme无效：{}", url);
            ProcessResult::error(url, INVALID_SCHEME_MESSAGE)
        }
    }

    /// 单条规则的正则是否命中 URL（无效正则视为不命中，不检查启用状态）
    pub fn transform_matches(url: &str, rule: &Rule) -> bool {
        CompiledRule::compile(0, rule)
            .map(|compiled| compiled.is_match(url))
            .unwrap_or(false)
    }
}
