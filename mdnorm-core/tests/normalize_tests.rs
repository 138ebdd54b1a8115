//! End-to-end behaviour of the normalizer on in-memory documents.
//!
//! Scenarios pin exact output for the documented conventions; the property
//! sections run a corpus of awkward documents through every preset and
//! check idempotence, content preservation and line-ending preservation.

use mdnorm_core::{
    is_idempotent, is_normalized, normalize, ConfigManager, Document, LineEnding, NormalizeError, NormalizerConfig,
    Preset, Rule, RuleCategory, RuleEngine, RuleSet,
};

// ============================================================================
// Helpers
// ============================================================================

fn norm(input: &str) -> String {
    let doc = Document::from_bytes(input.as_bytes()).expect("valid UTF-8");
    normalize(&doc, &NormalizerConfig::default())
        .expect("converges")
        .output_text
}

/// Non-whitespace tokens, with the fence language token folded away so
/// that tagging a bare fence does not count as new content.
fn tokens(text: &str) -> Vec<String> {
    text.replace("```text", "```")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

const CORPUS: &[&str] = &[
    "",
    "\n\n\n",
    "   \n\t\n",
    "single line without newline",
    "# Title\nText",
    "Intro\n# H1\n## H2\nPara\n- a\n\n- b\n```\ncode\n```\n| x |\n|---|\nEnd   \n\n\n\n",
    "- a\n\n- b\nParagraph\n",
    "1. one\n\n2. two\n   - nested\n\n   - nested two\n3. three\nafter\n",
    "- item\n  continued\n\n  second paragraph\n- next\n",
    "- item\n  ```bash\n  make\n  ```\n- next\n",
    "```\n# not a heading\n- not a list\n|not|a|table|\n\n\n\n```\nText\n",
    "```python\nprint('x')\n```\n```\nbare\n```\n```js\n```\n",
    "unclosed\n```\ncode forever\n# still code\n",
    "| a | b |\n|---|---|\n| 1 | 2 |\n# Heading\n- list\n| t |\n",
    "Text  \n|a|b|\n",
    "para\n* * *\nmore\n---\nend\n",
    "Line one\r\nLine two\r\n# Head\r\nbody\n",
    "\u{feff}# Title\nBody text\n",
    "Title\n=====\nSub\n-----\n- x\n",
    "> quote\n- list in quote?\n> more\n",
    "####### not a heading\n#hashtag\n# real\n",
    "````\n```\nnested fence\n```\n````\nafter\n",
];

// ============================================================================
// Scenarios
// ============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn heading_at_document_start() {
        assert_eq!(norm("# Title\nText"), "# Title\n\nText\n");
    }

    #[test]
    fn fenced_block_with_language_only_gains_spacing() {
        let out = norm("Intro\n```python\ncode\n```\nAfter\n");
        assert_eq!(out, "Intro\n\n```python\ncode\n```\n\nAfter\n");
        assert!(!out.contains("text"));
    }

    #[test]
    fn fenced_block_with_language_alone_is_untouched() {
        assert_eq!(norm("```python\ncode\n```\n"), "```python\ncode\n```\n");
    }

    #[test]
    fn blank_run_collapse() {
        assert_eq!(norm("A\n\n\n\n\nB\n"), "A\n\nB\n");
    }

    #[test]
    fn list_tightening() {
        assert_eq!(norm("- a\n\n- b\nParagraph\n"), "- a\n- b\n\nParagraph\n");
    }

    #[test]
    fn table_and_trailing_whitespace() {
        assert_eq!(norm("Text \n|a|b|\n"), "Text\n\n|a|b|\n");
    }

    #[test]
    fn bare_fence_gets_text_language() {
        assert_eq!(norm("Run:\n```\nmake\n```\n"), "Run:\n\n```text\nmake\n```\n");
    }

    #[test]
    fn mixed_document() {
        let input = "Intro\n# H1\n## H2\nPara\n- a\n\n- b\n```\ncode\n```\n| x |\n|---|\nEnd   \n\n\n\n";
        let expected = "Intro\n\n# H1\n## H2\n\nPara\n\n- a\n- b\n\n```text\ncode\n```\n\n| x |\n|---|\n\nEnd\n";
        assert_eq!(norm(input), expected);
    }

    #[test]
    fn code_content_is_never_restructured() {
        let input = "```\n# not a heading\n- a\n\n- b\n|x|\n```\n";
        assert_eq!(norm(input), "```text\n# not a heading\n- a\n\n- b\n|x|\n```\n");
    }

    #[test]
    fn empty_and_blank_documents_become_empty() {
        assert_eq!(norm(""), "");
        assert_eq!(norm("\n\n\n"), "");
        assert_eq!(norm("  \n\t\n"), "");
    }

    #[test]
    fn already_normalized_is_unchanged() {
        let doc = Document::new("# Title\n\n- a\n- b\n\nText\n");
        let result = normalize(&doc, &NormalizerConfig::default()).unwrap();
        assert!(!result.changed);
        assert!(result.converged);
        assert_eq!(result.iterations, 1);
        assert!(result.applied_rules.is_empty());
    }

    #[test]
    fn changed_result_lists_rules_that_fired() {
        let doc = Document::new("Text \n|a|b|\n");
        let result = normalize(&doc, &NormalizerConfig::default()).unwrap();
        assert!(result.changed);
        assert_eq!(
            result.applied_rules,
            vec!["TrailingWhitespaceTrim".to_string(), "TableBlankLineEnsure".to_string()]
        );
    }
}

// ============================================================================
// Already-normalized check
// ============================================================================

mod normalized {
    use super::*;

    fn check(bytes: &[u8]) -> bool {
        let doc = Document::from_bytes(bytes).unwrap();
        is_normalized(&doc, &NormalizerConfig::default())
    }

    #[test]
    fn clean_document_is_normalized() {
        assert!(check(b"# T\n\nx\n"));
        assert!(check("\u{feff}a\r\n".as_bytes()));
    }

    #[test]
    fn empty_document_is_normalized() {
        assert!(check(b""));
    }

    #[test]
    fn document_needing_work_is_not_normalized() {
        assert!(!check(b"# T\nx\n"));
        assert!(!check(b"x"));
    }

    #[test]
    fn mixed_line_endings_are_not_normalized() {
        assert!(!check(b"a\r\nb\r\nc\n"));
    }

    #[test]
    fn output_of_normalize_is_normalized() {
        let config = NormalizerConfig::default();
        for input in CORPUS {
            let out = norm(input);
            let doc = Document::from_bytes(out.as_bytes()).unwrap();
            assert!(is_normalized(&doc, &config), "{out:?}");
        }
    }
}

// ============================================================================
// Configuration-driven behaviour
// ============================================================================

mod presets {
    use super::*;

    #[test]
    fn relaxed_keeps_two_blank_lines() {
        let manager = ConfigManager::new().unwrap();
        let doc = Document::new("A\n\n\n\n\nB\n");
        let result = normalize(&doc, manager.get_config(&Preset::Relaxed)).unwrap();
        assert_eq!(result.output_text, "A\n\n\nB\n");
    }

    #[test]
    fn blank_lines_preset_leaves_structure_alone() {
        let manager = ConfigManager::new().unwrap();
        let doc = Document::new("# T\ntext  \n\n\n```\ncode\n```");
        let result = normalize(&doc, manager.get_config(&Preset::BlankLines)).unwrap();
        assert_eq!(result.output_text, "# T\ntext\n\n```\ncode\n```\n");
    }

    #[test]
    fn disabled_category_is_skipped() {
        let config = NormalizerConfig {
            disabled_categories: vec![RuleCategory::CodeBlock],
            ..NormalizerConfig::default()
        };
        let doc = Document::new("Run:\n```\nmake\n```\n");
        let result = normalize(&doc, &config).unwrap();
        assert_eq!(result.output_text, "Run:\n```\nmake\n```\n");
    }

    #[test]
    fn custom_fence_language() {
        let config = NormalizerConfig {
            fence_language: "plaintext".to_string(),
            ..NormalizerConfig::default()
        };
        let result = normalize(&Document::new("```\nx\n```\n"), &config).unwrap();
        assert_eq!(result.output_text, "```plaintext\nx\n```\n");
    }
}

// ============================================================================
// Properties
// ============================================================================

mod properties {
    use super::*;

    #[test]
    fn idempotent_for_every_preset() {
        let manager = ConfigManager::new().unwrap();
        for preset in Preset::ALL {
            let config = manager.get_config(&preset);
            for input in CORPUS {
                let doc = Document::from_bytes(input.as_bytes()).unwrap();
                assert!(
                    is_idempotent(&doc, config),
                    "not idempotent under {preset}: {input:?}"
                );

                let first = normalize(&doc, config).unwrap();
                let again = Document::from_bytes(first.output_text.as_bytes()).unwrap();
                let second = normalize(&again, config).unwrap();
                assert!(!second.changed, "second run changed {input:?} under {preset}");
                assert_eq!(second.output_text, first.output_text);
                assert_eq!(second.iterations, 1);
            }
        }
    }

    #[test]
    fn no_content_loss() {
        for input in CORPUS {
            let out = norm(input);
            assert_eq!(tokens(input), tokens(&out), "content changed for {input:?}");
        }
    }

    #[test]
    fn converges_well_under_the_cap() {
        let engine = RuleEngine::default();
        for input in CORPUS {
            let doc = Document::from_bytes(input.as_bytes()).unwrap();
            let result = engine.normalize(&doc).unwrap();
            assert!(result.iterations <= 3, "{input:?} took {} passes", result.iterations);
        }
    }

    #[test]
    fn crlf_stays_crlf() {
        let doc = Document::from_bytes(b"# Title\r\nText  \r\n- a\r\n\r\n- b\r\n").unwrap();
        assert_eq!(doc.line_ending, LineEnding::Crlf);
        let out = normalize(&doc, &NormalizerConfig::default()).unwrap().output_text;
        assert_eq!(out, "# Title\r\n\r\nText\r\n\r\n- a\r\n- b\r\n");
        assert_eq!(out.matches('\n').count(), out.matches("\r\n").count());
    }

    #[test]
    fn lf_stays_lf() {
        let out = norm("# Title\nText  \n- a\n");
        assert!(!out.contains('\r'));
    }

    #[test]
    fn mixed_endings_follow_the_majority() {
        let doc = Document::from_bytes(b"a\r\nb\r\nc\n").unwrap();
        let result = normalize(&doc, &NormalizerConfig::default()).unwrap();
        assert!(result.changed);
        assert_eq!(result.output_text, "a\r\nb\r\nc\r\n");
    }

    #[test]
    fn clean_crlf_file_is_unchanged() {
        let doc = Document::from_bytes(b"# Title\r\n\r\nText\r\n").unwrap();
        let result = normalize(&doc, &NormalizerConfig::default()).unwrap();
        assert!(!result.changed);
    }
}

// ============================================================================
// Non-convergence
// ============================================================================

mod non_convergence {
    use super::*;

    /// Adds a blank line before the last line
    struct PadEnd;

    impl Rule for PadEnd {
        fn id(&self) -> &str {
            "PadEnd"
        }
        fn category(&self) -> RuleCategory {
            RuleCategory::Whitespace
        }
        fn pattern(&self) -> &str {
            r"\z"
        }
        fn apply(&self, text: &str) -> String {
            match text.trim_end_matches('\n').rsplit_once('\n') {
                Some((head, last)) => format!("{head}\n\n{last}\n"),
                None => text.to_string(),
            }
        }
    }

    #[test]
    fn rules_undoing_each_other_are_reported() {
        // PadEnd inserts a blank line, BlankRunCollapse removes it: every
        // pass fires both rules and the text never settles.
        let set = RuleSet::new()
            .with_rule(PadEnd)
            .with_rule(mdnorm_core::rules::BlankRunCollapse::new(1));
        let engine = RuleEngine::new(set, 10);
        let err = engine.normalize(&Document::new("a\n\nb\n")).unwrap_err();

        match err {
            NormalizeError::NonConvergence {
                iterations,
                suspected_rules,
            } => {
                assert_eq!(iterations, 10);
                assert_eq!(suspected_rules, vec!["PadEnd".to_string(), "BlankRunCollapse".to_string()]);
            }
            other => panic!("expected non-convergence, got {other:?}"),
        }
    }

    #[test]
    fn non_converging_document_is_not_normalized() {
        let set = RuleSet::new()
            .with_rule(PadEnd)
            .with_rule(mdnorm_core::rules::BlankRunCollapse::new(1));
        let engine = RuleEngine::new(set, 4);
        assert!(!engine.is_normalized(&Document::new("a\n\nb\n")));
    }

    #[test]
    fn non_converging_document_is_not_idempotent() {
        let set = RuleSet::new()
            .with_rule(PadEnd)
            .with_rule(mdnorm_core::rules::BlankRunCollapse::new(1));
        let engine = RuleEngine::new(set, 4);
        assert!(!engine.is_idempotent(&Document::new("a\n\nb\n")));
    }
}
