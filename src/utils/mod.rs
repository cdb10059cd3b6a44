//! 工具模块：文本中的 URL 识别
pub mod url_extractor;

pub use self::url_extractor::{extract_url, host_label, looks_like_url};
