//! 编译模块：正则校验、替换模板规范化、规则快照编译
pub mod compiler;
pub mod pattern;
pub mod template;

pub use self::compiler::RuleCompiler;
pub use self::pattern::{CompiledRule, is_valid_pattern};
pub use self::template::ReplacementTemplate;
