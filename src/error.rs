//! 全局错误类型定义
//! 仅规则配置的编辑与持久化会返回错误；改写流水线、参数解析、归因均不抛错

use std::io::Error as IoError;

use fancy_regex::Error as RegexError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UrlVinegarError {
    // 规则相关错误
    #[error("Rule name and pattern are required")]
    RuleFieldsRequired,
    #[error("Rule index {index} out of range (rule count: {len})")]
    RuleIndexOutOfRange { index: usize, len: usize },

    // 编译相关错误
    #[error("Regex compilation failed: {0}")]
    RegexCompileError(#[from] RegexError),

    // 允许参数相关错误
    #[error("Parameter name is required")]
    ParamNameRequired,
    #[error("Allowed parameter already exists: {0}")]
    DuplicateAllowedParam(String),
    #[error("Allowed parameter not found: {0}")]
    AllowedParamNotFound(String),
    #[error("Allowed parameter index {index} out of range (parameter count: {len})")]
    AllowedParamIndexOutOfRange { index: usize, len: usize },

    // 序列化/反序列化错误
    #[error("JSON parse failed: {0}")]
    JsonError(#[from] SerdeJsonError),

    // 基础错误
    #[error("IO operation failed: {0}")]
    IoError(#[from] IoError),
}

// 全局Result类型
pub type VinResult<T> = Result<T, UrlVinegarError>;
