//! 全局配置管理,存储所有可配置项

use std::path::PathBuf;

/// 配置文件路径的环境变量名
pub const CONFIG_PATH_ENV: &str = "URLVINEGAR_CONFIG";

/// 全局配置
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    // 规则与允许参数的持久化文件（JSON）
    pub rules_path: PathBuf,
    // 是否启用详细日志
    pub verbose: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            rules_path: PathBuf::from("urlvinegar_rules.json"),
            verbose: false,
        }
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }

    /// 默认配置，若设置了环境变量 `URLVINEGAR_CONFIG` 则覆盖文件路径
    pub fn from_env() -> GlobalConfig {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) if !path.is_empty() => Self::custom().rules_path(PathBuf::from(path)).build(),
            _ => Self::get_default(),
        }
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: GlobalConfig::default(),
        }
    }

    pub fn rules_path(mut self, path: PathBuf) -> Self {
        self.config.rules_path = path;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}
