//! Tunable thresholds and limits.
//!
//! The content heuristics are tuned values rather than derived invariants, so
//! they live here as data with the defaults the reader ships with.

use crate::error::{FlowstateError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Complete reader configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub filter: FilterConfig,
    pub fragments: FragmentConfig,
    pub playback: PlaybackConfig,
}

/// Prose-vs-noise heuristics used by the content filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Texts shorter than this many characters are rejected outright
    pub min_chars: usize,

    /// Stylesheet vocabulary counted as whole words
    pub stylesheet_terms: Vec<String>,

    /// More stylesheet hits than this marks the text as embedded CSS
    pub max_stylesheet_hits: usize,

    /// Brace count limit (combined `{` and `}`)
    pub max_braces: usize,

    /// Semicolon count limit
    pub max_semicolons: usize,

    /// Minimum fraction of Latin letters over total length
    pub min_letter_ratio: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_chars: 200,
            stylesheet_terms: [
                "margin",
                "padding",
                "font",
                "color",
                "background",
                "text-align",
                "line-height",
                "@page",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            max_stylesheet_hits: 8,
            max_braces: 20,
            max_semicolons: 20,
            min_letter_ratio: 0.5,
        }
    }
}

/// Per-fragment acceptance rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentConfig {
    /// Fragments producing fewer tokens are dropped
    pub min_tokens: usize,

    /// Substrings of href/idref (case-folded) that mark front matter and noise
    pub noise_names: Vec<String>,

    /// Elements removed from the document before text extraction
    pub noise_elements: Vec<String>,
}

impl Default for FragmentConfig {
    fn default() -> Self {
        Self {
            min_tokens: 30,
            noise_names: ["cover", "toc", "nav", "title", "copyright", "style"]
                .into_iter()
                .map(String::from)
                .collect(),
            noise_elements: ["style", "script", "nav", "noscript"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Speed bounds and rewind limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub min_wpm: u32,
    pub max_wpm: u32,
    pub wpm_step: u32,
    pub default_wpm: u32,
    pub min_interval_ms: u64,
    pub default_rewind: usize,
    pub max_rewind: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            min_wpm: 120,
            max_wpm: 900,
            wpm_step: 10,
            default_wpm: 300,
            min_interval_ms: 10,
            default_rewind: 10,
            max_rewind: 2000,
        }
    }
}

impl PlaybackConfig {
    /// Clamp a speed into range and snap it to the step granularity
    pub fn normalize_wpm(&self, wpm: u32) -> u32 {
        let step = self.wpm_step.max(1);
        let snapped = wpm.saturating_add(step / 2) / step * step;
        let low = self.min_wpm.min(self.max_wpm);
        snapped.clamp(low, self.min_wpm.max(self.max_wpm))
    }

    /// Clamp a user-supplied rewind count into `[1, max_rewind]`
    pub fn clamp_rewind(&self, count: usize) -> usize {
        count.clamp(1, self.max_rewind.max(1))
    }

    /// Reject settings that cannot describe a speed range
    pub fn validate(&self) -> Result<()> {
        if self.min_wpm == 0 {
            return Err(FlowstateError::Config("playback.min_wpm must be at least 1".into()));
        }
        if self.min_wpm > self.max_wpm {
            return Err(FlowstateError::Config(format!(
                "playback.min_wpm ({}) is above playback.max_wpm ({})",
                self.min_wpm, self.max_wpm
            )));
        }
        Ok(())
    }
}

impl ReaderConfig {
    /// Parse configuration from JSON text
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let cfg: Self =
            serde_json::from_str(contents).map_err(|e| FlowstateError::Config(e.to_string()))?;
        cfg.playback.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the given path, falling back to defaults on error
    pub fn load(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(data) => {
                info!(path = %path.display(), "Loaded reader config");
                data
            }
            Err(err) => {
                warn!(path = %path.display(), "Falling back to default config: {err}");
                return Self::default();
            }
        };

        match Self::from_json_str(&contents) {
            Ok(cfg) => {
                debug!("Parsed configuration from disk");
                cfg
            }
            Err(err) => {
                warn!(path = %path.display(), "Invalid config: {err}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_wpm_snaps_and_clamps() {
        let playback = PlaybackConfig::default();
        assert_eq!(playback.normalize_wpm(304), 300);
        assert_eq!(playback.normalize_wpm(305), 310);
        assert_eq!(playback.normalize_wpm(50), 120);
        assert_eq!(playback.normalize_wpm(5000), 900);
    }

    #[test]
    fn test_clamp_rewind() {
        let playback = PlaybackConfig::default();
        assert_eq!(playback.clamp_rewind(0), 1);
        assert_eq!(playback.clamp_rewind(25), 25);
        assert_eq!(playback.clamp_rewind(10_000), 2000);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = ReaderConfig::from_json_str(r#"{"fragments": {"min_tokens": 5}}"#).unwrap();
        assert_eq!(cfg.fragments.min_tokens, 5);
        assert_eq!(cfg.fragments.noise_names.len(), 6);
        assert_eq!(cfg.filter, FilterConfig::default());
        assert_eq!(cfg.playback.default_wpm, 300);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = ReaderConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, FlowstateError::Config(_)));
    }

    #[test]
    fn test_inverted_speed_bounds_are_rejected() {
        let err = ReaderConfig::from_json_str(r#"{"playback": {"min_wpm": 900, "max_wpm": 120}}"#)
            .unwrap_err();
        assert!(matches!(err, FlowstateError::Config(msg) if msg.contains("min_wpm")));
    }

    #[test]
    fn test_inverted_bounds_file_falls_back_to_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("flowstate.json");
        std::fs::write(&path, r#"{"playback": {"min_wpm": 900, "max_wpm": 120}}"#).unwrap();

        assert_eq!(ReaderConfig::load(&path), ReaderConfig::default());
    }

    #[test]
    fn test_normalize_wpm_with_inverted_bounds() {
        let playback = PlaybackConfig {
            min_wpm: 900,
            max_wpm: 120,
            ..PlaybackConfig::default()
        };
        assert_eq!(playback.normalize_wpm(50), 120);
        assert_eq!(playback.normalize_wpm(5000), 900);
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let cfg = ReaderConfig::load(Path::new("/nonexistent/flowstate.json"));
        assert_eq!(cfg, ReaderConfig::default());
    }
}
