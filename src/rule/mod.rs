//! 规则模块：负责规则的数据模型、默认规则、编辑与持久化
pub mod book;
pub mod defaults;
pub mod model;
pub mod store;

// 导出核心接口
pub use self::defaults::{default_rule_book, default_rules};
pub use self::model::{AllowedParameter, Rule, RuleBook};
pub use self::store::RuleStore;
