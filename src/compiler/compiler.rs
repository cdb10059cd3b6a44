//! 规则编译器核心
//! 仅负责将一次调用的规则快照编译为可执行的改写步骤

use std::collections::HashSet;
use std::time::Instant;

use tracing::debug;

use super::pattern::CompiledRule;
use crate::rule::Rule;

/// 规则编译器
pub struct RuleCompiler;

impl RuleCompiler {
    /// 编译本次调用中生效的规则（保持原有顺序）
    ///
    /// 跳过：配置中禁用的规则、下标在 `disabled_overrides` 中的规则、正则无法编译的规则
    pub fn compile_active(rules: &[Rule], disabled_overrides: &HashSet<usize>) -> Vec<CompiledRule> {
        let start = Instant::now();
        let mut stats = CompileStats::default();

        let compiled: Vec<CompiledRule> = rules
            .iter()
            .enumerate()
            .filter_map(|(index, rule)| {
                if !rule.enabled {
                    stats.disabled += 1;
                    return None;
                }
                if disabled_overrides.contains(&index) {
                    stats.overridden += 1;
                    return None;
                }
                match CompiledRule::compile(index, rule) {
                    Ok(compiled) => Some(compiled),
                    Err(e) => {
                        stats.invalid += 1;
                        debug!("规则[{}]#{}正则编译失败，已跳过：{}", rule.name, index, e);
                        None
                    }
                }
            })
            .collect();

        debug!(
            "规则编译完成，耗时{:?}，生效{}条，禁用{}条，本次关闭{}条，无效{}条",
            start.elapsed(),
            compiled.len(),
            stats.disabled,
            stats.overridden,
            stats.invalid
        );

        compiled
    }
}

/// 编译统计
#[derive(Debug, Default)]
struct CompileStats {
    disabled: usize,
    overridden: usize,
    invalid: usize,
}
