//! 编译后模式模型
//! 规则正则编译后的结构，以及不抛错的正则校验

use fancy_regex::Regex;
use tracing::warn;

use super::template::ReplacementTemplate;
use crate::rule::Rule;

/// 校验正则模式能否编译（语法错误返回 false，永不抛错）
pub fn is_valid_pattern(pattern: &str) -> bool {
    Regex::new(pattern).is_ok()
}

/// 编译后的改写规则
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// 在原始规则列表中的下标
    pub index: usize,
    pub name: String,
    regex: Regex,
    /// 已规范化的替换模板
    replacement: String,
}

impl CompiledRule {
    /// 编译单条规则（不检查启用状态）
    pub fn compile(index: usize, rule: &Rule) -> Result<Self, fancy_regex::Error> {
        let regex = Regex::new(&rule.pattern)?;
        let group_count = regex.captures_len().saturating_sub(1);
        Ok(Self {
            index,
            name: rule.name.clone(),
            replacement: ReplacementTemplate::normalize(&rule.replacement, group_count),
            regex,
        })
    }

    /// 正则在输入中任意位置命中
    ///
    /// 回溯超限等运行时错误视为未命中
    pub fn is_match(&self, input: &str) -> bool {
        match self.regex.is_match(input) {
            Ok(matched) => matched,
            Err(e) => {
                warn!("规则[{}]匹配运行时错误，跳过：{}", self.name, e);
                false
            }
        }
    }

    /// 执行一步改写：命中则全局替换所有不重叠匹配，否则原样返回
    pub fn apply(&self, input: String) -> String {
        if !self.is_match(&input) {
            return input;
        }
        match self.replace_all(&input) {
            Ok(rewritten) => rewritten,
            Err(e) => {
                warn!("规则[{}]替换运行时错误，保持原字符串：{}", self.name, e);
                input
            }
        }
    }

    fn replace_all(&self, input: &str) -> Result<String, fancy_regex::Error> {
        let mut out = String::with_capacity(input.len());
        let mut last = 0;
        for caps in self.regex.captures_iter(input) {
            let caps = caps?;
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&input[last..whole.start()]);
            caps.expand(&self.replacement, &mut out);
            last = whole.end();
        }
        out.push_str(&input[last..]);
        Ok(out)
    }
}
