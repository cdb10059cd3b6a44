//! urlvinegar - 基于有序正则改写规则的 URL 清理工具

// 导出全局错误类型
pub use self::error::{UrlVinegarError, VinResult};

// 导出配置模块
pub use self::config::{ConfigManager, CustomConfigBuilder, GlobalConfig};

// 导出规则模块核心接口
pub use self::rule::{AllowedParameter, Rule, RuleBook, RuleStore, default_rule_book, default_rules};

// 导出编译模块核心接口
pub use self::compiler::{CompiledRule, ReplacementTemplate, RuleCompiler};

// 导出查询参数模块核心接口
pub use self::query::{QueryParam, QueryView, UrlParts};

// 导出流水线模块核心接口
pub use self::pipeline::{AttributionEngine, INVALID_SCHEME_MESSAGE, ProcessResult, RewritePipeline};

// 导出会话与工具接口
pub use self::session::{CleaningSession, SessionOutcome};
pub use self::utils::host_label;

// 导出简化接口
pub use self::processor::{
    apply_transforms,
    extract_url,
    is_valid_pattern,
    looks_like_url,
    parse_params_with_tracking,
    parse_query_params,
    reconstruct_url,
    transform_matches,
};

// 声明所有子模块
pub mod compiler;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod processor;
pub mod query;
pub mod rule;
pub mod session;
pub mod utils;
