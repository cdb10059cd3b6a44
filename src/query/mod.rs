//! 查询参数模块：URL 拆分、原始查询参数解析、URL 重建
pub mod parser;
pub mod reconstruct;

pub use self::parser::{QueryParam, QueryView, UrlParts, parse_all_kept, parse_query_params};
pub use self::reconstruct::reconstruct_url;
