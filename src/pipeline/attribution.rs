//! 参数归因引擎
//! 逐条重放改写流水线，对比每一步后存活的参数名集合，
//! 为每个被移除的原始参数找出“第一个”导致其消失的规则；再叠加用户手动移除

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::rewrite::RewritePipeline;
use crate::compiler::RuleCompiler;
use crate::query::{QueryParam, QueryView, parse_all_kept};
use crate::rule::Rule;

/// 参数归因引擎
pub struct AttributionEngine;

impl AttributionEngine {
    /// 计算每个原始参数的去留及移除原因
    ///
    /// 输出顺序：保留的参数在前（保持原有相对顺序），移除的参数在后（同样保持原有顺序）。
    /// `removed_by` 为 None 且 `keep == false` 表示用户手动移除
    pub fn attribute(
        original_url: &str,
        rules: &[Rule],
        disabled_overrides: &HashSet<usize>,
        user_removed: &HashSet<String>,
    ) -> Vec<QueryParam> {
        // 1. 基线参数（保留原始值与出现顺序）
        let baseline = parse_all_kept(original_url);
        if baseline.is_empty() {
            return baseline;
        }

        let mut survivors: HashSet<String> = baseline.iter().map(|p| p.name.clone()).collect();
        let mut cause: HashMap<String, String> = HashMap::new();

        // 2. 逐条重放，差集即为本步移除的参数名（先到先得）
        let compiled = RuleCompiler::compile_active(rules, disabled_overrides);
        RewritePipeline::fold(original_url, &compiled, |rule, current| {
            let present = QueryView::locate(current, original_url)
                .map(|view| view.names())
                .unwrap_or_default();
            survivors.retain(|name| {
                if present.contains(name) {
                    return true;
                }
                if !cause.contains_key(name) {
                    debug!("参数[{}]被规则[{}]#{}移除", name, rule.name, rule.index);
                    cause.insert(name.clone(), rule.name.clone());
                }
                false
            });
        });

        // 3. 生成结果：存活且未被用户移除才保留
        let (kept, removed): (Vec<QueryParam>, Vec<QueryParam>) = baseline
            .into_iter()
            .map(|mut param| {
                param.keep = survivors.contains(&param.name) && !user_removed.contains(&param.name);
                if !param.keep {
                    param.removed_by = cause.get(&param.name).cloned();
                }
                param
            })
            .partition(|param| param.keep);

        kept.into_iter().chain(removed).collect()
    }
}
