//! 流水线模块：规则改写与参数归因
pub mod attribution;
pub mod rewrite;

pub use self::attribution::AttributionEngine;
pub use self::rewrite::{INVALID_SCHEME_MESSAGE, ProcessResult, RewritePipeline};
