//! 规则配置持久化
//! 仅处理规则配置的本地 JSON 读写；文件缺失或损坏时回退到内置默认规则

use std::fs;

use tracing::{debug, warn};

use super::defaults::default_rule_book;
use super::model::RuleBook;
use crate::config::GlobalConfig;
use crate::error::VinResult;

/// 规则配置存储
pub struct RuleStore;

impl RuleStore {
    /// 加载规则配置（文件不存在或解析失败时返回默认配置）
    pub fn load(config: &GlobalConfig) -> VinResult<RuleBook> {
        let path = &config.rules_path;
        if !path.exists() {
            debug!("配置文件{}不存在，使用内置默认规则", path.display());
            return Ok(default_rule_book());
        }

        let data = fs::read_to_string(path)?;
        match serde_json::from_str::<RuleBook>(&data) {
            Ok(book) => {
                debug!(
                    "配置文件加载成功，规则数：{}，允许参数数：{}",
                    book.rules.len(),
                    book.allowed_parameters.len()
                );
                Ok(book)
            }
            Err(e) => {
                warn!("配置文件{}解析失败，使用内置默认规则：{}", path.display(), e);
                Ok(default_rule_book())
            }
        }
    }

    /// 保存规则配置
    pub fn save(config: &GlobalConfig, book: &RuleBook) -> VinResult<()> {
        let path = &config.rules_path;
        let json = serde_json::to_string_pretty(book)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;

        debug!("配置已保存到{}", path.display());
        Ok(())
    }

    /// 删除本地配置（下次加载回到默认规则）
    pub fn reset(config: &GlobalConfig) -> VinResult<()> {
        let path = &config.rules_path;
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}
