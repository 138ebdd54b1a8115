// Structural rewrite rules and the fixpoint engine that drives them.
// - engine.rs: Rule trait, RuleSet, RuleEngine
// - lines.rs: fence-aware line classification shared by every rule
// - whitespace.rs: trailing whitespace, blank-line runs, final newline
// - heading.rs, list.rs, code_block.rs, table.rs: blank lines around blocks

pub mod code_block;
pub mod engine;
pub mod heading;
mod lines;
pub mod list;
pub mod table;
pub mod whitespace;

pub use code_block::{CodeBlockBlankLineEnsure, CodeFenceLanguageTag};
pub use engine::{rule_by_name, Fixpoint, Rule, RuleEngine, RuleSet};
pub use heading::HeadingBlankLineEnsure;
pub use list::{ListBlankLineEnsure, ListInternalBlankLineRemoval};
pub use table::TableBlankLineEnsure;
pub use whitespace::{BlankRunCollapse, FinalNewlineEnsure, TrailingWhitespaceTrim};
