//! 规则配置编辑
//! 新增/修改规则前校验名称与正则；下标越界返回错误而非 panic

use std::collections::HashSet;

use tracing::debug;

use fancy_regex::Regex;

use super::model::{AllowedParameter, Rule, RuleBook};
use crate::error::{UrlVinegarError, VinResult};
use crate::pipeline::RewritePipeline;

impl RuleBook {
    /// 追加一条新规则（默认启用）
    pub fn add_rule(&mut self, name: &str, pattern: &str, replacement: &str) -> VinResult<usize> {
        let (name, pattern) = validate_rule_fields(name, pattern)?;
        self.rules.push(Rule::new(name, pattern, replacement, true));
        debug!("新增规则[{}]，当前规则数：{}", name, self.rules.len());
        Ok(self.rules.len() - 1)
    }

    /// 为单个参数追加一条移除规则：`Remove <param> on <host>`，`[?&]<param>=[^&]*` 替换为空
    ///
    /// 参数名按字面量匹配
    pub fn add_param_removal_rule(&mut self, param: &str, host: &str) -> VinResult<usize> {
        let param = param.trim();
        if param.is_empty() {
            return Err(UrlVinegarError::ParamNameRequired);
        }
        let name = format!("Remove {} on {}", param, host);
        let pattern = format!("[?&]{}=[^&]*", regex::escape(param));
        self.add_rule(&name, &pattern, "")
    }

    /// 修改已有规则（保留启用状态）
    pub fn update_rule(
        &mut self,
        index: usize,
        name: &str,
        pattern: &str,
        replacement: &str,
    ) -> VinResult<()> {
        self.check_index(index)?;
        let (name, pattern) = validate_rule_fields(name, pattern)?;
        let rule = &mut self.rules[index];
        rule.name = name.to_string();
        rule.pattern = pattern.to_string();
        rule.replacement = replacement.to_string();
        Ok(())
    }

    pub fn remove_rule(&mut self, index: usize) -> VinResult<Rule> {
        self.check_index(index)?;
        Ok(self.rules.remove(index))
    }

    /// 拖拽排序：从 `from` 取出后插入到 `to`
    pub fn move_rule(&mut self, from: usize, to: usize) -> VinResult<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        let rule = self.rules.remove(from);
        self.rules.insert(to, rule);
        Ok(())
    }

    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> VinResult<()> {
        self.check_index(index)?;
        self.rules[index].enabled = enabled;
        Ok(())
    }

    /// 命中给定 URL 的规则（含下标），用于只展示“相关”规则
    pub fn matching_rules(&self, url: &str) -> Vec<(usize, &Rule)> {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| RewritePipeline::transform_matches(url, rule))
            .collect()
    }

    pub fn add_allowed(&mut self, name: &str, description: &str) -> VinResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(UrlVinegarError::ParamNameRequired);
        }
        if self.allowed_parameters.iter().any(|p| p.name == name) {
            return Err(UrlVinegarError::DuplicateAllowedParam(name.to_string()));
        }
        self.allowed_parameters
            .push(AllowedParameter::new(name, description.trim()));
        Ok(())
    }

    /// 修改白名单参数的名称与说明（名称不得与其他参数重复）
    pub fn update_allowed(&mut self, index: usize, name: &str, description: &str) -> VinResult<()> {
        let len = self.allowed_parameters.len();
        if index >= len {
            return Err(UrlVinegarError::AllowedParamIndexOutOfRange { index, len });
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(UrlVinegarError::ParamNameRequired);
        }
        let duplicate = self
            .allowed_parameters
            .iter()
            .enumerate()
            .any(|(i, p)| i != index && p.name == name);
        if duplicate {
            return Err(UrlVinegarError::DuplicateAllowedParam(name.to_string()));
        }

        let param = &mut self.allowed_parameters[index];
        param.name = name.to_string();
        param.description = description.trim().to_string();
        Ok(())
    }

    pub fn remove_allowed(&mut self, name: &str) -> VinResult<AllowedParameter> {
        let position = self
            .allowed_parameters
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| UrlVinegarError::AllowedParamNotFound(name.to_string()))?;
        Ok(self.allowed_parameters.remove(position))
    }

    /// 白名单参数名集合
    pub fn allowed_names(&self) -> HashSet<String> {
        self.allowed_parameters.iter().map(|p| p.name.clone()).collect()
    }

    fn check_index(&self, index: usize) -> VinResult<()> {
        if index < self.rules.len() {
            Ok(())
        } else {
            Err(UrlVinegarError::RuleIndexOutOfRange {
                index,
                len: self.rules.len(),
            })
        }
    }
}

fn validate_rule_fields<'a>(name: &'a str, pattern: &'a str) -> VinResult<(&'a str, &'a str)> {
    let name = name.trim();
    if name.is_empty() || pattern.trim().is_empty() {
        return Err(UrlVinegarError::RuleFieldsRequired);
    }
    Regex::new(pattern)?;
    Ok((name, pattern))
}
