//! Engine configuration.
//!
//! Every threshold, factor and name the engine uses lives in [`EngineConfig`].
//! The defaults are the tuned values; a config file only needs the keys it
//! wants to change:
//!
//! ```yaml
//! activation_class: night
//! text:
//!   dark_floor: 0.8
//! variables:
//!   - --page-bg
//!   - --page-fg
//! ```
//!
//! Unknown keys are rejected so a typo does not silently fall back to a default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use umbra_color::AdjustPolicy;

use crate::error::ConfigError;

/// Theme variable names read from the document root by default.
pub const DEFAULT_VARIABLES: &[&str] = &[
    "--background",
    "--background-color",
    "--bg",
    "--bg-color",
    "--color-background",
    "--color-bg",
    "--surface",
    "--color-surface",
    "--card",
    "--popover",
    "--foreground",
    "--text",
    "--text-color",
    "--color-text",
    "--color-fg",
    "--fg",
    "--primary",
    "--color-primary",
    "--secondary",
    "--color-secondary",
    "--accent",
    "--muted",
    "--border",
    "--border-color",
    "--color-border",
    "--input",
];

/// Tags the full-document pass rewrites.
pub const DEFAULT_TAGS: &[&str] = &[
    "body", "div", "section", "article", "main", "header", "footer", "nav", "aside", "p", "span",
    "a", "button", "input", "textarea", "select", "label", "form", "fieldset", "ul", "ol", "li",
    "dl", "dt", "dd", "table", "thead", "tbody", "tfoot", "tr", "td", "th", "h1", "h2", "h3",
    "h4", "h5", "h6", "blockquote", "pre", "code", "dialog", "details", "summary", "svg", "path",
    "circle", "rect", "polygon", "line", "g",
];

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Class put on `body` (and matched on `html`) while active.
    pub activation_class: String,
    /// Attribute carried by every element whose inline style was rewritten.
    pub styled_marker: String,
    /// Key written to the bootstrap cache.
    pub cache_key: String,
    /// Root-side selector of the stylesheet rule block.
    pub root_selector: String,
    /// Custom properties read from the root, in output order.
    pub variables: Vec<String>,
    /// Lowercase tags the full-document pass visits.
    pub tags: Vec<String>,
    /// Chroma factor for variable overrides.
    pub variable_chroma: f64,
    pub fallback: FallbackColors,
    pub background: BackgroundRules,
    pub text: TextRules,
    pub icons: IconRules,
    pub contrast: ContrastRules,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            activation_class: "umbra-dark".to_string(),
            styled_marker: "data-umbra-styled".to_string(),
            cache_key: "umbra-enabled".to_string(),
            root_selector: "html.umbra-dark".to_string(),
            variables: DEFAULT_VARIABLES.iter().map(|s| s.to_string()).collect(),
            tags: DEFAULT_TAGS.iter().map(|s| s.to_string()).collect(),
            variable_chroma: 0.3,
            fallback: FallbackColors::default(),
            background: BackgroundRules::default(),
            text: TextRules::default(),
            icons: IconRules::default(),
            contrast: ContrastRules::default(),
        }
    }
}

/// Fixed declarations in the stylesheet rule block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FallbackColors {
    pub background: String,
    pub text: String,
    pub border: String,
    pub link: String,
    pub color_scheme: String,
}

impl Default for FallbackColors {
    fn default() -> Self {
        Self {
            background: "#121212".to_string(),
            text: "#e0e0e0".to_string(),
            border: "#333333".to_string(),
            link: "#8ab4f8".to_string(),
            color_scheme: "dark".to_string(),
        }
    }
}

/// When and how element backgrounds are overridden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackgroundRules {
    /// Backgrounds at or below this alpha are left alone.
    pub min_alpha: f64,
    /// Backgrounds at or below this lightness are already dark enough.
    pub min_lightness: f64,
    /// Elements narrower or shorter than this (px) keep their background.
    pub min_size: f64,
    pub chroma: f64,
    pub button_lightness: f64,
    pub button_chroma: f64,
    /// Assumed background lightness when no override is applied.
    pub estimate: f64,
}

impl Default for BackgroundRules {
    fn default() -> Self {
        Self {
            min_alpha: 0.5,
            min_lightness: 0.3,
            min_size: 24.0,
            chroma: 0.3,
            button_lightness: 0.35,
            button_chroma: 0.1,
            estimate: 0.2,
        }
    }
}

/// Text color rewriting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextRules {
    pub min_alpha: f64,
    pub chroma: f64,
    pub button_chroma: f64,
    /// Minimum text lightness on a dark background.
    pub dark_floor: f64,
    /// Maximum text lightness on a light background.
    pub light_ceiling: f64,
    /// Background lightness below which the background counts as dark.
    pub dark_background: f64,
}

impl Default for TextRules {
    fn default() -> Self {
        Self {
            min_alpha: 0.5,
            chroma: 0.3,
            button_chroma: 0.5,
            dark_floor: 0.75,
            light_ceiling: 0.25,
            dark_background: 0.5,
        }
    }
}

/// SVG fill and stroke rewriting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IconRules {
    pub min_alpha: f64,
    pub fill_chroma: f64,
    pub fill_button_chroma: f64,
    pub stroke_chroma: f64,
    pub stroke_button_chroma: f64,
    pub dark_floor: f64,
    pub light_ceiling: f64,
}

impl Default for IconRules {
    fn default() -> Self {
        Self {
            min_alpha: 0.5,
            fill_chroma: 0.3,
            fill_button_chroma: 0.4,
            stroke_chroma: 0.2,
            stroke_button_chroma: 0.3,
            dark_floor: 0.70,
            light_ceiling: 0.30,
        }
    }
}

/// Contrast enforcer schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContrastRules {
    pub target: f64,
    pub step: f64,
    pub fine_step: f64,
    pub coarse_iterations: usize,
    pub max_iterations: usize,
    pub dark_threshold: f64,
}

impl Default for ContrastRules {
    fn default() -> Self {
        let policy = AdjustPolicy::default();
        Self {
            target: policy.target,
            step: policy.step,
            fine_step: policy.fine_step,
            coarse_iterations: policy.coarse_iterations,
            max_iterations: policy.max_iterations,
            dark_threshold: policy.dark_threshold,
        }
    }
}

impl ContrastRules {
    pub fn policy(&self) -> AdjustPolicy {
        AdjustPolicy {
            target: self.target,
            step: self.step,
            fine_step: self.fine_step,
            coarse_iterations: self.coarse_iterations,
            max_iterations: self.max_iterations,
            dark_threshold: self.dark_threshold,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a YAML config.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file, picking the format from its extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let parse: fn(&str) -> Result<Self, ConfigError> = match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml,
            Some("json") => Self::from_json,
            _ => return Err(ConfigError::UnknownFormat(path.to_path_buf())),
        };

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse(&content)
    }

    /// True if `tag` (lowercase) is one the full-document pass visits.
    pub fn matches_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Checks names and numeric ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("activation_class", &self.activation_class),
            ("styled_marker", &self.styled_marker),
            ("cache_key", &self.cache_key),
            ("root_selector", &self.root_selector),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyName(field));
            }
        }

        let unit = [
            ("variable_chroma", self.variable_chroma),
            ("background.min_alpha", self.background.min_alpha),
            ("background.min_lightness", self.background.min_lightness),
            ("background.chroma", self.background.chroma),
            ("background.button_lightness", self.background.button_lightness),
            ("background.button_chroma", self.background.button_chroma),
            ("background.estimate", self.background.estimate),
            ("text.min_alpha", self.text.min_alpha),
            ("text.chroma", self.text.chroma),
            ("text.button_chroma", self.text.button_chroma),
            ("text.dark_floor", self.text.dark_floor),
            ("text.light_ceiling", self.text.light_ceiling),
            ("text.dark_background", self.text.dark_background),
            ("icons.min_alpha", self.icons.min_alpha),
            ("icons.fill_chroma", self.icons.fill_chroma),
            ("icons.fill_button_chroma", self.icons.fill_button_chroma),
            ("icons.stroke_chroma", self.icons.stroke_chroma),
            ("icons.stroke_button_chroma", self.icons.stroke_button_chroma),
            ("icons.dark_floor", self.icons.dark_floor),
            ("icons.light_ceiling", self.icons.light_ceiling),
            ("contrast.dark_threshold", self.contrast.dark_threshold),
        ];
        for (field, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field,
                    reason: format!("{} is not within 0..=1", value),
                });
            }
        }

        if self.background.min_size < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "background.min_size",
                reason: "must not be negative".to_string(),
            });
        }
        if !(1.0..=21.0).contains(&self.contrast.target) {
            return Err(ConfigError::OutOfRange {
                field: "contrast.target",
                reason: format!("{} is not within 1..=21", self.contrast.target),
            });
        }
        if self.contrast.step <= 0.0 || self.contrast.fine_step <= 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "contrast.step",
                reason: "steps must be positive".to_string(),
            });
        }
        if self.text.light_ceiling > self.text.dark_floor {
            return Err(ConfigError::OutOfRange {
                field: "text.light_ceiling",
                reason: "must not exceed text.dark_floor".to_string(),
            });
        }
        if self.icons.light_ceiling > self.icons.dark_floor {
            return Err(ConfigError::OutOfRange {
                field: "icons.light_ceiling",
                reason: "must not exceed icons.dark_floor".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn defaults_match_tuned_values() {
        let config = EngineConfig::default();
        assert_eq!(config.activation_class, "umbra-dark");
        assert_eq!(config.styled_marker, "data-umbra-styled");
        assert_eq!(config.background.min_size, 24.0);
        assert_eq!(config.text.dark_floor, 0.75);
        assert_eq!(config.icons.light_ceiling, 0.30);
        assert_eq!(config.contrast.policy(), AdjustPolicy::default());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = EngineConfig::from_yaml(
            r#"
activation_class: night
text:
  dark_floor: 0.8
"#,
        )
        .unwrap();
        assert_eq!(config.activation_class, "night");
        assert_eq!(config.text.dark_floor, 0.8);
        assert_eq!(config.text.light_ceiling, 0.25);
        assert_eq!(config.styled_marker, "data-umbra-styled");
    }

    #[test]
    fn json_config_parses() {
        let config = EngineConfig::from_json(r#"{"variables": ["--page-bg"]}"#).unwrap();
        assert_eq!(config.variables, vec!["--page-bg".to_string()]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = EngineConfig::from_yaml("activation_klass: night").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)), "got {:?}", err);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = EngineConfig::from_yaml("text:\n  chroma: 1.5").unwrap_err();
        assert!(
            matches!(err, ConfigError::OutOfRange { field: "text.chroma", .. }),
            "got {:?}",
            err
        );
    }

    #[test]
    fn inverted_clamps_are_rejected() {
        let err = EngineConfig::from_yaml("text:\n  light_ceiling: 0.9").unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    }

    #[test]
    fn empty_names_are_rejected() {
        let err = EngineConfig::from_yaml("styled_marker: ''").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyName("styled_marker")));
    }

    #[test]
    fn from_file_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("umbra.yml");
        let mut f = std::fs::File::create(&yaml_path).unwrap();
        writeln!(f, "cache_key: dark-cache").unwrap();
        assert_eq!(
            EngineConfig::from_file(&yaml_path).unwrap().cache_key,
            "dark-cache"
        );

        let json_path = dir.path().join("umbra.json");
        std::fs::write(&json_path, r#"{"cache_key": "json-cache"}"#).unwrap();
        assert_eq!(
            EngineConfig::from_file(&json_path).unwrap().cache_key,
            "json-cache"
        );

        let toml_path = dir.path().join("umbra.toml");
        std::fs::write(&toml_path, "").unwrap();
        assert!(matches!(
            EngineConfig::from_file(&toml_path),
            Err(ConfigError::UnknownFormat(_))
        ));
    }

    #[test]
    fn from_file_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = EngineConfig::from_file(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn matches_tag_uses_lowercase_names() {
        let config = EngineConfig::default();
        assert!(config.matches_tag("div"));
        assert!(!config.matches_tag("script"));
    }
}
