//! 规则数据模型定义
//! 仅存储规则数据，支持序列化/反序列化；编辑操作见 book.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// URL改写规则：正则模式 + 替换模板（`$1`/`$2` 引用捕获分组）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
        enabled: bool,
    ) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            replacement: replacement.into(),
            enabled,
        }
    }
}

// ======== 为 Rule 实现 Display trait（用于 CLI 输出） ========
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: s/{}/{}/g", self.name, self.pattern, self.replacement)
    }
}

fn default_enabled() -> bool {
    true
}

/// 允许保留（白名单）的查询参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedParameter {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl AllowedParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// 完整规则配置：有序规则列表 + 有序允许参数列表
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleBook {
    #[serde(rename = "transforms", default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub allowed_parameters: Vec<AllowedParameter>,
}
