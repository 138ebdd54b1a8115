use crate::config::NormalizerConfig;
use crate::types::{encode_text, Document, NormalizationResult, RuleCategory};
use crate::{change, NormalizeError};

use super::code_block::{CodeBlockBlankLineEnsure, CodeFenceLanguageTag};
use super::heading::HeadingBlankLineEnsure;
use super::list::{ListBlankLineEnsure, ListInternalBlankLineRemoval};
use super::table::TableBlankLineEnsure;
use super::whitespace::{BlankRunCollapse, FinalNewlineEnsure, TrailingWhitespaceTrim};

/// A pure whole-document rewrite. Rules see LF-only text and must never
/// remove non-whitespace content.
pub trait Rule: Send + Sync {
    fn id(&self) -> &str;
    fn category(&self) -> RuleCategory;
    /// The line shape this rule looks for, for listings and logs
    fn pattern(&self) -> &str;
    fn apply(&self, text: &str) -> String;
}

/// Build a built-in rule by its pipeline name
pub fn rule_by_name(name: &str, config: &NormalizerConfig) -> Option<Box<dyn Rule>> {
    let rule: Box<dyn Rule> = match name {
        "TrailingWhitespaceTrim" => Box::new(TrailingWhitespaceTrim),
        "BlankRunCollapse" => Box::new(BlankRunCollapse::new(config.max_blank_lines)),
        "HeadingBlankLineEnsure" => Box::new(HeadingBlankLineEnsure),
        "ListBlankLineEnsure" => Box::new(ListBlankLineEnsure),
        "ListInternalBlankLineRemoval" => Box::new(ListInternalBlankLineRemoval),
        "CodeBlockBlankLineEnsure" => Box::new(CodeBlockBlankLineEnsure),
        "CodeFenceLanguageTag" => Box::new(CodeFenceLanguageTag::new(config.fence_language.clone())),
        "TableBlankLineEnsure" => Box::new(TableBlankLineEnsure),
        "FinalNewlineEnsure" => Box::new(FinalNewlineEnsure),
        _ => return None,
    };
    Some(rule)
}

/// Ordered rule sequence. Order matters: later rules rely on earlier ones
/// having run within the same pass.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The canonical pipeline with default settings
    pub fn standard() -> Self {
        Self::from_config(&NormalizerConfig::default())
    }

    /// Enabled rules from the config pipeline, in pipeline order
    pub fn from_config(config: &NormalizerConfig) -> Self {
        let mut set = Self::new();
        for rule_config in &config.pipeline.rules {
            let Some(rule) = rule_by_name(&rule_config.name, config) else {
                tracing::warn!("unknown rule '{}' in pipeline, skipping", rule_config.name);
                continue;
            };
            if !config.is_rule_enabled(rule_config, rule.category()) {
                tracing::debug!("rule {} disabled", rule_config.name);
                continue;
            }
            set.rules.push(rule);
        }
        set
    }

    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// One full ordered pass. Returns the new text and the ids of rules
    /// that changed it, in order.
    pub fn apply_once(&self, text: &str) -> (String, Vec<String>) {
        let mut current = text.to_string();
        let mut fired = Vec::new();
        for rule in &self.rules {
            let next = rule.apply(&current);
            if next != current {
                fired.push(rule.id().to_string());
                current = next;
            }
        }
        (current, fired)
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.rules.iter().map(|r| r.id())).finish()
    }
}

/// LF-level outcome of a fixpoint run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixpoint {
    pub text: String,
    pub iterations: usize,
    pub applied_rules: Vec<String>,
}

/// Drives a RuleSet to a fixpoint: full ordered passes until one changes
/// nothing, or the iteration cap is hit.
#[derive(Debug)]
pub struct RuleEngine {
    rule_set: RuleSet,
    max_iterations: usize,
}

impl RuleEngine {
    pub fn new(rule_set: RuleSet, max_iterations: usize) -> Self {
        Self {
            rule_set,
            max_iterations: max_iterations.max(1),
        }
    }

    pub fn from_config(config: &NormalizerConfig) -> Self {
        Self::new(RuleSet::from_config(config), config.max_iterations)
    }

    /// Run on LF text. Never yields a partially rewritten text: hitting the
    /// cap is an error naming the rules still firing on the last pass.
    pub fn run(&self, text: &str) -> Result<Fixpoint, NormalizeError> {
        let mut current = text.to_string();
        let mut applied_rules: Vec<String> = Vec::new();
        let mut last_fired = Vec::new();

        for pass in 1..=self.max_iterations {
            let (next, fired) = self.rule_set.apply_once(&current);
            if fired.is_empty() {
                tracing::debug!(pass, "fixpoint reached");
                return Ok(Fixpoint {
                    text: current,
                    iterations: pass,
                    applied_rules,
                });
            }

            tracing::debug!(pass, rules = ?fired, "pass changed text");
            for id in &fired {
                if !applied_rules.contains(id) {
                    applied_rules.push(id.clone());
                }
            }
            current = next;
            last_fired = fired;
        }

        let mut suspected_rules: Vec<String> = Vec::new();
        for id in last_fired {
            if !suspected_rules.contains(&id) {
                suspected_rules.push(id);
            }
        }
        Err(NormalizeError::NonConvergence {
            iterations: self.max_iterations,
            suspected_rules,
        })
    }

    /// Normalize a document and re-expand it to its own line ending.
    pub fn normalize(&self, document: &Document) -> Result<NormalizationResult, NormalizeError> {
        let fixpoint = self.run(&document.text)?;
        let output_text = encode_text(&fixpoint.text, document.line_ending, document.has_bom);
        let changed = document.mixed_line_endings
            || change::detect_change(&document.to_bytes(), output_text.as_bytes());

        Ok(NormalizationResult {
            output_text,
            changed,
            iterations: fixpoint.iterations,
            converged: true,
            applied_rules: fixpoint.applied_rules,
        })
    }

    /// Already at a fixpoint: normalizing would change nothing
    pub fn is_normalized(&self, document: &Document) -> bool {
        matches!(self.normalize(document), Ok(result) if !result.changed)
    }

    /// normalize(normalize(D)) == normalize(D), with no change on the
    /// second application
    pub fn is_idempotent(&self, document: &Document) -> bool {
        let Ok(first) = self.normalize(document) else {
            return false;
        };
        let Ok(again) = Document::from_bytes(first.output_text.as_bytes()) else {
            return false;
        };
        match self.normalize(&again) {
            Ok(second) => !second.changed && second.output_text == first.output_text,
            Err(_) => false,
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::from_config(&NormalizerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;

    struct Toggle {
        id: &'static str,
        from: &'static str,
        to: &'static str,
    }

    impl Rule for Toggle {
        fn id(&self) -> &str {
            self.id
        }

        fn category(&self) -> RuleCategory {
            RuleCategory::Whitespace
        }

        fn pattern(&self) -> &str {
            self.from
        }

        fn apply(&self, text: &str) -> String {
            text.replace(self.from, self.to)
        }
    }

    #[test]
    fn test_standard_order() {
        let ids: Vec<_> = RuleSet::standard().iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, crate::config::STANDARD_PIPELINE.map(String::from).to_vec());
    }

    #[test]
    fn test_unknown_rule_is_skipped() {
        let mut config = NormalizerConfig::default();
        config.pipeline.rules.push(RuleConfig {
            name: "SmartQuotes".to_string(),
            enabled: true,
        });
        assert_eq!(RuleSet::from_config(&config).len(), crate::config::STANDARD_PIPELINE.len());
    }

    #[test]
    fn test_disabled_categories_filter_rules() {
        let config = NormalizerConfig {
            disabled_categories: vec![RuleCategory::CodeBlock, RuleCategory::List],
            ..NormalizerConfig::default()
        };
        let set = RuleSet::from_config(&config);
        assert!(set.iter().all(|r| r.category() != RuleCategory::CodeBlock));
        assert!(set.iter().all(|r| r.category() != RuleCategory::List));
        assert_eq!(set.len(), crate::config::STANDARD_PIPELINE.len() - 4);
    }

    #[test]
    fn test_converged_run_counts_final_pass() {
        let engine = RuleEngine::default();
        let fixpoint = engine.run("# Title\nText").unwrap();
        assert_eq!(fixpoint.text, "# Title\n\nText\n");
        assert_eq!(fixpoint.iterations, 2);
        assert_eq!(
            fixpoint.applied_rules,
            vec!["HeadingBlankLineEnsure".to_string(), "FinalNewlineEnsure".to_string()]
        );
    }

    #[test]
    fn test_clean_text_takes_one_pass() {
        let fixpoint = RuleEngine::default().run("# Title\n\nText\n").unwrap();
        assert_eq!(fixpoint.iterations, 1);
        assert!(fixpoint.applied_rules.is_empty());
    }

    #[test]
    fn test_cycle_is_reported() {
        let set = RuleSet::new()
            .with_rule(Toggle { id: "AtoB", from: "a", to: "b" })
            .with_rule(Toggle { id: "BtoA", from: "b", to: "a" });
        // "ab" -> "bb" -> "aa" within one pass, forever
        let err = RuleEngine::new(set, 5).run("ab").unwrap_err();
        match err {
            NormalizeError::NonConvergence {
                iterations,
                suspected_rules,
            } => {
                assert_eq!(iterations, 5);
                assert_eq!(suspected_rules, vec!["AtoB".to_string(), "BtoA".to_string()]);
            }
            other => panic!("expected non-convergence, got {other:?}"),
        }
    }
}
