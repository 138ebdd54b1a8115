use crate::types::RuleCategory;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_max_iterations() -> usize {
    10 // passes before a document is reported as non-converging
}

fn default_max_blank_lines() -> usize {
    1
}

fn default_fence_language() -> String {
    "text".to_string()
}

/// Canonical rule order. BlankRunCollapse runs on both sides of the
/// insertion rules.
pub const STANDARD_PIPELINE: [&str; 10] = [
    "TrailingWhitespaceTrim",
    "BlankRunCollapse",
    "HeadingBlankLineEnsure",
    "ListBlankLineEnsure",
    "ListInternalBlankLineRemoval",
    "CodeBlockBlankLineEnsure",
    "CodeFenceLanguageTag",
    "TableBlankLineEnsure",
    "BlankRunCollapse",
    "FinalNewlineEnsure",
];

/// Built-in rule selections. Each one stands in for a fixer variant that
/// used to be maintained as its own script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Every rule, at most one blank line between blocks
    #[default]
    Full,
    /// Every rule, up to two blank lines between blocks
    Relaxed,
    /// Whitespace trimming, blank-run collapsing and EOF only
    BlankLines,
    /// List spacing and tightening only
    Lists,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Full, Preset::Relaxed, Preset::BlankLines, Preset::Lists];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Full => "full",
            Preset::Relaxed => "relaxed",
            Preset::BlankLines => "blank-lines",
            Preset::Lists => "lists",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Preset::Full => "all structural rules, at most one blank line between blocks",
            Preset::Relaxed => "all structural rules, up to two blank lines between blocks",
            Preset::BlankLines => "trailing whitespace, blank-line runs and final newline only",
            Preset::Lists => "blank lines around lists and tight list items only",
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Preset::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown preset '{s}' (expected full, relaxed, blank-lines or lists)"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Preset this config was derived from (used as the ConfigManager key)
    #[serde(default)]
    pub preset: Preset,
    /// RuleEngine iteration cap
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Longest allowed run of blank lines
    #[serde(default = "default_max_blank_lines")]
    pub max_blank_lines: usize,
    /// Token appended to bare opening fences
    #[serde(default = "default_fence_language")]
    pub fence_language: String,
    /// Pipeline configuration - defines which rules to run and in what order
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Whole rule categories to skip regardless of the pipeline
    #[serde(default)]
    pub disabled_categories: Vec<RuleCategory>,
    /// Which files a directory walk picks up
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    /// Worker threads for batch runs (0 = available parallelism)
    #[serde(default)]
    pub workers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// List of rules to run in order
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Name of the rule
    pub name: String,
    /// Whether this rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl PipelineConfig {
    pub fn from_names(names: &[&str]) -> Self {
        Self {
            rules: names
                .iter()
                .map(|name| RuleConfig {
                    name: name.to_string(),
                    enabled: true,
                })
                .collect(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_names(&STANDARD_PIPELINE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// File extensions (without dot) treated as Markdown
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Directory names never descended into
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,
    #[serde(default)]
    pub include_hidden: bool,
    #[serde(default)]
    pub follow_links: bool,
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string(), "markdown".to_string()]
}

fn default_exclude_dirs() -> Vec<String> {
    vec![
        ".git".to_string(),
        "node_modules".to_string(),
        "target".to_string(),
    ]
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude_dirs: default_exclude_dirs(),
            include_hidden: false,
            follow_links: false,
        }
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            preset: Preset::Full,
            max_iterations: default_max_iterations(),
            max_blank_lines: default_max_blank_lines(),
            fence_language: default_fence_language(),
            pipeline: PipelineConfig::default(),
            disabled_categories: Vec::new(),
            discovery: DiscoveryConfig::default(),
            workers: 0,
        }
    }
}

impl NormalizerConfig {
    /// Load config from a YAML file and validate it
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: NormalizerConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                tracing::warn!("failed to load config from {}: {e:#}; using defaults", p.display());
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Reject settings the engine cannot converge with
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            bail!("max_iterations must be at least 1");
        }
        if self.max_blank_lines == 0 {
            bail!("max_blank_lines must be at least 1 (blank-line insertion rules would never settle)");
        }
        let lang = &self.fence_language;
        if lang.is_empty() || lang.contains(|c: char| c.is_whitespace() || c == '`') {
            bail!("fence_language must be a single token without whitespace or backticks, got {lang:?}");
        }
        Ok(())
    }

    pub fn is_rule_enabled(&self, rule: &RuleConfig, category: RuleCategory) -> bool {
        rule.enabled && !self.disabled_categories.contains(&category)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    configs: HashMap<Preset, NormalizerConfig>,
    default_config: NormalizerConfig,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let mut manager = Self {
            configs: HashMap::new(),
            default_config: NormalizerConfig::default(),
        };

        // Load built-in configs
        manager.load_builtin_configs()?;

        Ok(manager)
    }

    pub fn get_config(&self, preset: &Preset) -> &NormalizerConfig {
        self.configs.get(preset).unwrap_or(&self.default_config)
    }

    /// A file config replaces the built-in entry for its preset
    pub fn load_config_from_file(&mut self, path: &Path) -> Result<&NormalizerConfig> {
        let config = NormalizerConfig::load_from_file(path)?;
        let preset = config.preset;
        self.configs.insert(preset, config);
        Ok(self.get_config(&preset))
    }

    fn load_builtin_configs(&mut self) -> Result<()> {
        self.configs.insert(Preset::Full, NormalizerConfig::default());

        // Two blank lines allowed, everything else as full
        let relaxed = NormalizerConfig {
            preset: Preset::Relaxed,
            max_blank_lines: 2,
            ..NormalizerConfig::default()
        };
        self.configs.insert(Preset::Relaxed, relaxed);

        let blank_lines = NormalizerConfig {
            preset: Preset::BlankLines,
            pipeline: PipelineConfig::from_names(&[
                "TrailingWhitespaceTrim",
                "BlankRunCollapse",
                "FinalNewlineEnsure",
            ]),
            ..NormalizerConfig::default()
        };
        self.configs.insert(Preset::BlankLines, blank_lines);

        let lists = NormalizerConfig {
            preset: Preset::Lists,
            pipeline: PipelineConfig::from_names(&[
                "ListBlankLineEnsure",
                "ListInternalBlankLineRemoval",
                "FinalNewlineEnsure",
            ]),
            ..NormalizerConfig::default()
        };
        self.configs.insert(Preset::Lists, lists);

        for config in self.configs.values() {
            config.validate()?;
        }
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new().expect("built-in presets are valid")
    }
}
