use anyhow::Result;
use serde::{Deserialize, Serialize};

// Default value functions for serde
fn default_true() -> bool {
    true
}

/// Tuning knobs for layout reconstruction and validation.
///
/// Every section is optional in the YAML file; missing keys fall back to the
/// values the detectors were calibrated with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintConfig {
    /// Line and paragraph grouping thresholds
    #[serde(default)]
    pub layout: LayoutConfig,
    /// List marker recognition
    #[serde(default)]
    pub list_detection: ListDetectionConfig,
    /// Page-number candidate scoring
    #[serde(default)]
    pub page_numbers: PageNumberConfig,
    /// External spelling service
    #[serde(default)]
    pub spelling: SpellCheckConfig,
    /// Validation engine behaviour
    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Maximum vertical distance between run centers on the same line (points)
    #[serde(default = "default_line_threshold")]
    pub line_threshold: f32,
    /// Vertical gap between lines that starts a new paragraph (points)
    #[serde(default = "default_paragraph_gap_threshold")]
    pub paragraph_gap_threshold: f32,
    /// Horizontal indent change that starts a new paragraph (points)
    #[serde(default = "default_indent_threshold")]
    pub indent_threshold: f32,
}

fn default_line_threshold() -> f32 {
    1.5
}

fn default_paragraph_gap_threshold() -> f32 {
    10.0
}

fn default_indent_threshold() -> f32 {
    20.0
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_threshold: default_line_threshold(),
            paragraph_gap_threshold: default_paragraph_gap_threshold(),
            indent_threshold: default_indent_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDetectionConfig {
    /// Leading characters that mark a bulleted item
    #[serde(default = "default_bullet_symbols")]
    pub bullet_symbols: Vec<String>,
    /// Left edge (points) at which an item becomes level 1
    #[serde(default = "default_level_one_x")]
    pub level_one_x: f32,
    /// Left edge (points) at which an item becomes level 2
    #[serde(default = "default_level_two_x")]
    pub level_two_x: f32,
    /// Also recognise "a." / "iv)" style markers
    #[serde(default)]
    pub detect_alpha_roman: bool,
}

fn default_bullet_symbols() -> Vec<String> {
    ["•", "·", "∙", "◦", "-", "—", "*", "+", "‣"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_level_one_x() -> f32 {
    50.0
}

fn default_level_two_x() -> f32 {
    100.0
}

impl Default for ListDetectionConfig {
    fn default() -> Self {
        Self {
            bullet_symbols: default_bullet_symbols(),
            level_one_x: default_level_one_x(),
            level_two_x: default_level_two_x(),
            detect_alpha_roman: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageNumberConfig {
    /// Best candidate must score strictly above this to be accepted
    #[serde(default = "default_acceptance_threshold")]
    pub acceptance_threshold: f32,
    /// Candidate width must be below this fraction of the page width
    #[serde(default = "default_max_width_ratio")]
    pub max_width_ratio: f32,
    /// Candidate height must be below this fraction of the page height
    #[serde(default = "default_max_height_ratio")]
    pub max_height_ratio: f32,
    /// Labels shorter than this fraction of the page height get a bonus
    #[serde(default = "default_small_height_ratio")]
    pub small_height_ratio: f32,
}

fn default_acceptance_threshold() -> f32 {
    0.5
}

fn default_max_width_ratio() -> f32 {
    0.2
}

fn default_max_height_ratio() -> f32 {
    0.1
}

fn default_small_height_ratio() -> f32 {
    0.02
}

impl Default for PageNumberConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: default_acceptance_threshold(),
            max_width_ratio: default_max_width_ratio(),
            max_height_ratio: default_max_height_ratio(),
            small_height_ratio: default_small_height_ratio(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellCheckConfig {
    /// Build an HTTP spell checker for `spelling` rules
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_spelling_endpoint")]
    pub endpoint: String,
    /// Per-request timeout
    #[serde(default = "default_spelling_timeout_ms")]
    pub timeout_ms: u64,
    /// Comma-separated language list passed to the service, e.g. "ru,en"
    #[serde(default)]
    pub lang: Option<String>,
}

fn default_spelling_endpoint() -> String {
    "https://speller.yandex.net/services/spellservice.json/checkText".to_string()
}

fn default_spelling_timeout_ms() -> u64 {
    5000
}

impl Default for SpellCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_spelling_endpoint(),
            timeout_ms: default_spelling_timeout_ms(),
            lang: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Evaluate (rule, page) pairs on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl LintConfig {
    /// Load config from YAML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: LintConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                log::warn!("Failed to load config from {}, using defaults: {}", p, e);
                Self::default()
            }),
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_calibration() {
        let config = LintConfig::default();
        assert_eq!(config.layout.line_threshold, 1.5);
        assert_eq!(config.layout.paragraph_gap_threshold, 10.0);
        assert_eq!(config.layout.indent_threshold, 20.0);
        assert_eq!(config.list_detection.bullet_symbols.len(), 9);
        assert_eq!(config.page_numbers.acceptance_threshold, 0.5);
        assert_eq!(config.spelling.timeout_ms, 5000);
        assert!(config.validation.parallel);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "layout:\n  line_threshold: 3.0\nlist_detection:\n  detect_alpha_roman: true\n";
        let config: LintConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.layout.line_threshold, 3.0);
        assert_eq!(config.layout.indent_threshold, 20.0);
        assert!(config.list_detection.detect_alpha_roman);
        assert_eq!(config.list_detection.level_two_x, 100.0);
        assert!(config.spelling.enabled);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = LintConfig::load_with_fallback(Some("/nonexistent/slidelint.yaml"));
        assert_eq!(config.layout.line_threshold, 1.5);
    }
}
