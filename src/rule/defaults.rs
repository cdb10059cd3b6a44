//! 内置默认规则
//! 配置文件不存在或损坏时使用

use super::model::{Rule, RuleBook};

/// 默认规则列表（顺序即执行顺序）
pub fn default_rules() -> Vec<Rule> {
    vec![
        // YouTube 长链接转 youtu.be（保留 &t= 时间戳）
        Rule::new(
            "Shorten YouTube URL",
            r"https?://(?:www\.)?youtube\.com/watch\?v=([a-zA-Z0-9_-]+)(?:&t=([0-9]+)s?)?.*",
            "https://youtu.be/$1?t=$2",
            true,
        ),
        // 无时间戳时去掉空的 ?t=
        Rule::new(
            "Clean YouTube timestamp",
            r"(https://youtu\.be/[a-zA-Z0-9_-]+)\?t=$",
            "$1",
            true,
        ),
        Rule::new("Remove UTM parameters", r"[?&](utm_[a-z_]+)=[^&]*", "", true),
        Rule::new("Remove Facebook click ID", r"[?&]fbclid=[^&]*", "", true),
        Rule::new("Remove Google click ID", r"[?&]gclid=[^&]*", "", true),
        Rule::new("Remove Amazon referral tag", r"[?&]tag=[^&]*", "", true),
        Rule::new(
            "Remove affiliate tracking",
            r"[?&](ref|aff|affiliate|campaign|source|medium)=[^&]*",
            "",
            true,
        ),
        // 删除参数后残留的 ?& / && / 末尾 &
        Rule::new("Clean up query string", r"(\?)&+|&+(?=&)|&+$", "$1", true),
        // 补充规则：首个参数被删掉后残留 /path&rest，把第一个 & 改回 ?
        Rule::new("Fix leading ampersand", r"^([^?&#]+)&", "$1?", true),
        Rule::new("Remove empty query string", r"\?$", "", true),
    ]
}

/// 默认配置（无白名单参数）
pub fn default_rule_book() -> RuleBook {
    RuleBook {
        rules: default_rules(),
        allowed_parameters: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RewritePipeline;
    use std::collections::HashSet;

    #[test]
    fn test_leading_ampersand_fix_runs_before_empty_query_cleanup() {
        let names: Vec<String> = default_rules().into_iter().map(|r| r.name).collect();
        assert_eq!(names.len(), 10);
        assert_eq!(names[8], "Fix leading ampersand");
        assert_eq!(names[9], "Remove empty query string");

        let result = RewritePipeline::apply(
            "https://example.com/page?utm_source=test&id=123&utm_medium=email",
            &default_rules(),
            &HashSet::new(),
        );
        assert_eq!(result.url, "https://example.com/page?id=123");

        // 关闭补充规则后只剩原有行为
        let without: HashSet<usize> = [8].into_iter().collect();
        let result = RewritePipeline::apply(
            "https://example.com/page?utm_source=test&id=123",
            &default_rules(),
            &without,
        );
        assert_eq!(result.url, "https://example.com/page&id=123");
    }
}
