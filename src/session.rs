//! 单个 URL 的清理会话
//! 持有原始 URL、规则快照以及本次会话的临时开关（规则关闭、参数手动移除），
//! 每次取结果都从原始 URL 重新计算

use std::collections::HashSet;

use serde::Serialize;

use crate::pipeline::{AttributionEngine, ProcessResult, RewritePipeline};
use crate::query::{QueryParam, QueryView, parse_all_kept};
use crate::rule::Rule;

/// 一次会话计算的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionOutcome {
    /// 规则改写结果（含 scheme 校验）
    pub process: ProcessResult,
    /// 改写后再去掉用户手动移除参数的最终 URL
    pub cleaned_url: String,
    /// 原始参数的去留与归因（保留在前）
    pub params: Vec<QueryParam>,
}

impl SessionOutcome {
    /// scheme 校验通过才允许分享/返回
    pub fn can_share(&self) -> bool {
        self.process.is_valid
    }
}

/// 清理会话
#[derive(Debug, Clone)]
pub struct CleaningSession {
    original_url: String,
    rules: Vec<Rule>,
    disabled_overrides: HashSet<usize>,
    user_removed: HashSet<String>,
}

impl CleaningSession {
    pub fn new(original_url: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            original_url: original_url.into(),
            rules,
            disabled_overrides: HashSet::new(),
            user_removed: HashSet::new(),
        }
    }

    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// 命中原始 URL 的规则（含下标）
    pub fn relevant_rules(&self) -> Vec<(usize, &Rule)> {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| RewritePipeline::transform_matches(&self.original_url, rule))
            .collect()
    }

    /// 本次会话内切换规则开关（不影响持久化配置）；返回切换后是否生效
    pub fn toggle_rule(&mut self, index: usize) -> bool {
        if self.disabled_overrides.remove(&index) {
            true
        } else {
            self.disabled_overrides.insert(index);
            false
        }
    }

    pub fn disable_rule(&mut self, index: usize) {
        self.disabled_overrides.insert(index);
    }

    /// 切换参数的手动移除状态；返回切换后是否保留
    pub fn toggle_param(&mut self, name: &str) -> bool {
        if self.user_removed.remove(name) {
            true
        } else {
            self.user_removed.insert(name.to_string());
            false
        }
    }

    pub fn remove_param(&mut self, name: impl Into<String>) {
        self.user_removed.insert(name.into());
    }

    /// 会话内调整规则顺序，本次关闭的规则随规则一起移动
    pub fn move_rule(&mut self, from: usize, to: usize) {
        if from >= self.rules.len() || to >= self.rules.len() {
            return;
        }
        let rule = self.rules.remove(from);
        self.rules.insert(to, rule);

        self.disabled_overrides = self
            .disabled_overrides
            .iter()
            .map(|&index| moved_index(index, from, to))
            .collect();
    }

    pub fn disabled_overrides(&self) -> &HashSet<usize> {
        &self.disabled_overrides
    }

    pub fn user_removed(&self) -> &HashSet<String> {
        &self.user_removed
    }

    /// 计算当前开关下的完整结果
    pub fn outcome(&self) -> SessionOutcome {
        self.outcome_filtered(|_| false)
    }

    /// 与 `outcome` 相同，但不在白名单中的参数也视同手动移除
    pub fn outcome_allowed_only(&self, allowed_names: &HashSet<String>) -> SessionOutcome {
        self.outcome_filtered(|name| !allowed_names.contains(name))
    }

    /// 规则改写后，去掉手动移除的参数以及 `discard(name)` 为真的参数
    ///
    /// 最终 URL 与归因使用同一个移除集合和同一个查询视图
    fn outcome_filtered(&self, discard: impl Fn(&str) -> bool) -> SessionOutcome {
        let process = RewritePipeline::apply(&self.original_url, &self.rules, &self.disabled_overrides);
        let view = QueryView::locate(&process.url, &self.original_url);

        let mut removed = self.user_removed.clone();
        removed.extend(
            parse_all_kept(&self.original_url)
                .into_iter()
                .map(|param| param.name)
                .chain(view.iter().flat_map(|view| view.names()))
                .filter(|name| discard(name.as_str())),
        );

        let cleaned_url = match view {
            Some(view) => view.retain(|name| !removed.contains(name)),
            None => process.url.clone(),
        };
        let params =
            AttributionEngine::attribute(&self.original_url, &self.rules, &self.disabled_overrides, &removed);

        SessionOutcome {
            process,
            cleaned_url,
            params,
        }
    }
}

/// 把 `from` 处的元素移到 `to` 后，原下标 `index` 的新位置
fn moved_index(index: usize, from: usize, to: usize) -> usize {
    if index == from {
        to
    } else if from < to && (from + 1..=to).contains(&index) {
        index - 1
    } else if to < from && (to..from).contains(&index) {
        index + 1
    } else {
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::default_rules;

    const SHARED: &str = "https://shop.example.com/item/42?utm_source=news&color=red&gclid=abc&ref=friend";

    #[test]
    fn test_default_rules_clean_shared_link() {
        let session = CleaningSession::new(SHARED, default_rules());
        let outcome = session.outcome();

        assert!(outcome.can_share());
        assert_eq!(outcome.cleaned_url, "https://shop.example.com/item/42?color=red");
        assert_eq!(outcome.process.url, outcome.cleaned_url);

        let report: Vec<(&str, bool, Option<&str>)> = outcome
            .params
            .iter()
            .map(|p| (p.name.as_str(), p.keep, p.removed_by.as_deref()))
            .collect();
        assert_eq!(
            report,
            vec![
                ("color", true, None),
                ("utm_source", false, Some("Remove UTM parameters")),
                ("gclid", false, Some("Remove Google click ID")),
                ("ref", false, Some("Remove affiliate tracking")),
            ]
        );
    }

    #[test]
    fn test_toggles_are_session_local() {
        let mut session = CleaningSession::new(SHARED, default_rules());
        // 关闭 "Remove Google click ID"（下标4），并手动移除 color
        assert!(!session.toggle_rule(4));
        assert!(!session.toggle_param("color"));

        let outcome = session.outcome();
        assert_eq!(outcome.cleaned_url, "https://shop.example.com/item/42?gclid=abc");
        let color = outcome.params.iter().find(|p| p.name == "color").unwrap();
        assert!(!color.keep);
        assert_eq!(color.removed_by, None);
        assert!(session.rules()[4].enabled);

        // 再次切换恢复
        assert!(session.toggle_rule(4));
        assert!(session.toggle_param("color"));
        assert_eq!(session.outcome(), CleaningSession::new(SHARED, default_rules()).outcome());
    }

    #[test]
    fn test_relevant_rules_only_match_original() {
        let session = CleaningSession::new("https://example.com/?fbclid=x", default_rules());
        let relevant: Vec<&str> = session
            .relevant_rules()
            .into_iter()
            .map(|(_, r)| r.name.as_str())
            .collect();
        assert_eq!(relevant, vec!["Remove Facebook click ID"]);
    }

    #[test]
    fn test_youtube_shortening() {
        let session = CleaningSession::new(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ&feature=share",
            default_rules(),
        );
        let outcome = session.outcome();
        assert_eq!(outcome.cleaned_url, "https://youtu.be/dQw4w9WgXcQ");
        assert!(outcome.can_share());
    }

    #[test]
    fn test_invalid_scheme_blocks_sharing() {
        let rules = vec![Rule::new("Remove scheme", "https://", "", true)];
        let outcome = CleaningSession::new("https://example.com/?a=1", rules).outcome();
        assert!(!outcome.can_share());
        assert_eq!(outcome.process.url, "example.com/?a=1");
        assert!(outcome.process.error.is_some());
    }

    #[test]
    fn test_allowed_only_filter() {
        let session = CleaningSession::new("https://example.com/?id=1&page=2&sort=asc", Vec::new());
        let allowed: HashSet<String> = ["id".to_string()].into_iter().collect();
        let outcome = session.outcome_allowed_only(&allowed);
        assert_eq!(outcome.cleaned_url, "https://example.com/?id=1");
    }

    /// keep == false 当且仅当参数名不在最终 URL 的查询串中
    fn assert_verdicts_match_cleaned_url(session: &CleaningSession, outcome: &SessionOutcome) {
        let present = QueryView::locate(&outcome.cleaned_url, session.original_url())
            .map(|view| view.names())
            .unwrap_or_default();
        for param in &outcome.params {
            assert_eq!(param.keep, present.contains(&param.name), "{}", param.name);
        }
    }

    #[test]
    fn test_manual_removal_after_leading_pair_deleted() {
        let url = "https://example.com/page?utm_source=test&id=123&utm_medium=email";
        let rules = vec![Rule::new("Remove UTM", r"[?&](utm_[a-z_]+)=[^&]*", "", true)];
        let mut session = CleaningSession::new(url, rules);
        session.remove_param("id");

        let outcome = session.outcome();
        assert_eq!(outcome.process.url, "https://example.com/page&id=123");
        assert_eq!(outcome.cleaned_url, "https://example.com/page");
        let id = outcome.params.iter().find(|p| p.name == "id").unwrap();
        assert!(!id.keep);
        assert_eq!(id.removed_by, None);
        assert_verdicts_match_cleaned_url(&session, &outcome);
    }

    #[test]
    fn test_verdicts_match_cleaned_url() {
        let mut session = CleaningSession::new(SHARED, default_rules());
        assert_verdicts_match_cleaned_url(&session, &session.outcome());

        session.remove_param("color");
        session.toggle_rule(4);
        assert_verdicts_match_cleaned_url(&session, &session.outcome());

        let session = CleaningSession::new(
            "https://e.com/x&id=9/p?id=1",
            vec![Rule::new("Drop query", r"\?.*$", "", true)],
        );
        let outcome = session.outcome();
        assert_eq!(outcome.cleaned_url, "https://e.com/x&id=9/p");
        assert!(!outcome.params[0].keep);
        assert_verdicts_match_cleaned_url(&session, &outcome);
    }

    #[test]
    fn test_allowed_only_with_manual_removal() {
        let mut session = CleaningSession::new(
            "https://example.com/?id=1&utm_source=x&page=2&sort=asc",
            default_rules(),
        );
        session.remove_param("page");
        let allowed: HashSet<String> = ["id", "page"].iter().map(|s| s.to_string()).collect();

        let outcome = session.outcome_allowed_only(&allowed);
        assert_eq!(outcome.cleaned_url, "https://example.com/?id=1");

        let report: Vec<(&str, bool, Option<&str>)> = outcome
            .params
            .iter()
            .map(|p| (p.name.as_str(), p.keep, p.removed_by.as_deref()))
            .collect();
        assert_eq!(
            report,
            vec![
                ("id", true, None),
                ("utm_source", false, Some("Remove UTM parameters")),
                ("page", false, None),
                ("sort", false, None),
            ]
        );
        assert_verdicts_match_cleaned_url(&session, &outcome);
    }

    #[test]
    fn test_move_rule_carries_session_overrides() {
        let rules = vec![
            Rule::new("A", "a", "", true),
            Rule::new("B", "b", "", true),
            Rule::new("C", "c", "", true),
        ];
        let mut session = CleaningSession::new("https://x.org/", rules);
        session.disable_rule(0);
        session.disable_rule(2);

        session.move_rule(0, 2);
        let names: Vec<&str> = session.rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
        let expected: HashSet<usize> = [1, 2].into_iter().collect();
        assert_eq!(session.disabled_overrides(), &expected);

        session.move_rule(2, 0);
        let expected: HashSet<usize> = [0, 2].into_iter().collect();
        assert_eq!(session.disabled_overrides(), &expected);
    }

    #[test]
    fn test_move_rule_changes_order() {
        let rules = vec![
            Rule::new("a->b", "a", "b", true),
            Rule::new("b->c", "b", "c", true),
        ];
        let mut session = CleaningSession::new("https://x.org/?q=a", rules);
        assert_eq!(session.outcome().cleaned_url, "https://x.org/?q=c");
        session.move_rule(1, 0);
        assert_eq!(session.outcome().cleaned_url, "https://x.org/?q=b");
    }
}
