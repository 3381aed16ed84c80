//! Viewer configuration: one JSON document, every field optional.
//!
//! ```json
//! {
//!   "pipeline": {
//!     "source": {"kind": "document", "project_id": "bdcountries", "collection": "paises"},
//!     "show_labels": true,
//!     "fetch_timeout_ms": 10000
//!   },
//!   "scene": {"rotate_speed": -0.01},
//!   "viewport": {"width": 390, "height": 844}
//! }
//! ```
//!
//! Without a `pipeline` section the preset for `--variant` is used.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use catalog::{DOCUMENT_LINKS_KEY, HTTP_LINKS_KEY};
use layers::{ArcDirection, HighlightRule, TransformConfig};
use scene::{RenderProfile, SceneConfig, Viewport};
use serde::{Deserialize, Serialize};
use streaming::{DocumentStoreSource, EmptyResultPolicy};

const DEFAULT_LINKS_URL: &str = "https://script.google.com/macros/s/AKfycbxCodP10mNvoFbSvUFe4PqRaiel6-VGjtq7Tdup7BQcbqXYysx87wvSZwD2jxxWYunl/exec";
const DEFAULT_PROJECT_ID: &str = "bdcountries";
const DEFAULT_COLLECTION: &str = "paises";

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "cannot read config {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid config {}: {source}", path.display())
            }
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Invalid(_) => None,
        }
    }
}

/// Which deployment the pipeline imitates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SourceVariant {
    /// JSON array served over HTTP.
    #[default]
    Http,
    /// Document-store collection, one document per link.
    Document,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    Http {
        url: String,
    },
    Document {
        #[serde(default = "default_document_base_url")]
        base_url: String,
        project_id: String,
        collection: String,
    },
}

fn default_document_base_url() -> String {
    DocumentStoreSource::DEFAULT_BASE_URL.to_string()
}

impl SourceConfig {
    pub fn variant(&self) -> SourceVariant {
        match self {
            SourceConfig::Http { .. } => SourceVariant::Http,
            SourceConfig::Document { .. } => SourceVariant::Document,
        }
    }
}

/// One parameterized pipeline covering both deployments.
///
/// Unset optional fields resolve to the defaults of the source's variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub source: SourceConfig,
    /// Category endpoint; the built-in region shares are used when unset.
    pub categories_url: Option<String>,
    pub cache_key: Option<String>,
    pub highlight_names: Option<BTreeSet<String>>,
    pub accent_names: Option<BTreeSet<String>>,
    pub arc_direction: ArcDirection,
    pub show_labels: bool,
    pub empty_result: Option<EmptyResultPolicy>,
    /// Per-fetch timeout. Unset means a fetch may wait indefinitely.
    pub fetch_timeout_ms: Option<u64>,
    pub seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::preset(SourceVariant::Http)
    }
}

fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl PipelineConfig {
    pub fn preset(variant: SourceVariant) -> Self {
        let source = match variant {
            SourceVariant::Http => SourceConfig::Http {
                url: DEFAULT_LINKS_URL.to_string(),
            },
            SourceVariant::Document => SourceConfig::Document {
                base_url: default_document_base_url(),
                project_id: DEFAULT_PROJECT_ID.to_string(),
                collection: DEFAULT_COLLECTION.to_string(),
            },
        };
        Self {
            source,
            categories_url: None,
            cache_key: None,
            highlight_names: None,
            accent_names: None,
            arc_direction: ArcDirection::Forward,
            show_labels: false,
            empty_result: None,
            fetch_timeout_ms: None,
            seed: 0,
        }
    }

    pub fn variant(&self) -> SourceVariant {
        self.source.variant()
    }

    pub fn cache_key(&self) -> &str {
        match (&self.cache_key, self.variant()) {
            (Some(key), _) => key,
            (None, SourceVariant::Http) => HTTP_LINKS_KEY,
            (None, SourceVariant::Document) => DOCUMENT_LINKS_KEY,
        }
    }

    pub fn empty_result_policy(&self) -> EmptyResultPolicy {
        self.empty_result.unwrap_or(match self.variant() {
            SourceVariant::Http => EmptyResultPolicy::Accept,
            SourceVariant::Document => EmptyResultPolicy::KeepCache,
        })
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    pub fn highlight_rule(&self) -> HighlightRule {
        let (size_set, color_set) = match self.variant() {
            SourceVariant::Http => (
                names(&["LIS", "OPO", "Lisbon", "Porto"]),
                names(&["LIS", "Lisbon"]),
            ),
            SourceVariant::Document => (
                names(&["LIS", "OPO", "Lisbon", "Porto", "PORTUGAL", "DUBAI", "LISBOA"]),
                names(&["LIS", "Lisbon", "PORTUGAL", "DUBAI", "LISBOA"]),
            ),
        };
        // A configured highlight set without an accent set drives both size
        // and color; the preset color set only applies when neither is set.
        let (highlight_names, accent_names) = match (&self.highlight_names, &self.accent_names) {
            (None, None) => (size_set, Some(color_set)),
            (None, Some(accent)) => (size_set, Some(accent.clone())),
            (Some(names), accent) => (names.clone(), accent.clone()),
        };
        HighlightRule {
            highlight_names,
            accent_names,
            ..HighlightRule::default()
        }
    }

    pub fn transform_config(&self) -> TransformConfig {
        TransformConfig {
            highlight: self.highlight_rule(),
            arc_direction: self.arc_direction,
            show_labels: self.show_labels,
            seed: self.seed,
            ..TransformConfig::default()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match &self.source {
            SourceConfig::Http { url } if url.trim().is_empty() => {
                Err(ConfigError::Invalid("http source url is empty".to_string()))
            }
            SourceConfig::Document {
                project_id,
                collection,
                ..
            } if project_id.trim().is_empty() || collection.trim().is_empty() => Err(
                ConfigError::Invalid("document source needs project_id and collection".to_string()),
            ),
            _ if self.cache_key().is_empty() => {
                Err(ConfigError::Invalid("cache_key is empty".to_string()))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub pipeline: Option<PipelineConfig>,
    pub scene: SceneConfig,
    pub viewport: Viewport,
    /// Overrides the profile derived from the viewport width.
    pub render_profile: Option<RenderProfile>,
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(pipeline) = &config.pipeline {
            pipeline.validate()?;
        }
        Ok(config)
    }

    pub fn pipeline_or_preset(&self, variant: SourceVariant) -> PipelineConfig {
        self.pipeline
            .clone()
            .unwrap_or_else(|| PipelineConfig::preset(variant))
    }

    pub fn render_profile(&self) -> RenderProfile {
        self.render_profile
            .unwrap_or_else(|| RenderProfile::for_width(self.viewport.width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn presets_differ_by_variant() {
        let http = PipelineConfig::preset(SourceVariant::Http);
        assert_eq!(http.cache_key(), "globeData");
        assert_eq!(http.empty_result_policy(), EmptyResultPolicy::Accept);
        assert!(!http.highlight_rule().is_highlighted("DUBAI"));

        let doc = PipelineConfig::preset(SourceVariant::Document);
        assert_eq!(doc.cache_key(), "globeDataFirebase");
        assert_eq!(doc.empty_result_policy(), EmptyResultPolicy::KeepCache);
        let rule = doc.highlight_rule();
        assert!(rule.is_highlighted("DUBAI"));
        assert!(rule.is_highlighted("OPO"));
        assert!(!rule.is_accented("OPO"));
    }

    #[test]
    fn empty_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.json");
        std::fs::write(&path, "{}").unwrap();

        let config = ViewerConfig::load(&path).unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(
            config.pipeline_or_preset(SourceVariant::Document).variant(),
            SourceVariant::Document
        );
        assert!(config.render_profile().antialias);
    }

    #[test]
    fn document_source_and_overrides_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.json");
        std::fs::write(
            &path,
            r#"{
                "pipeline": {
                    "source": {"kind": "document", "project_id": "p", "collection": "c"},
                    "highlight_names": ["PORTO"],
                    "arc_direction": "randomized_per_arc",
                    "empty_result": "accept",
                    "fetch_timeout_ms": 2500
                },
                "viewport": {"width": 390, "height": 844}
            }"#,
        )
        .unwrap();

        let config = ViewerConfig::load(&path).unwrap();
        let pipeline = config.pipeline_or_preset(SourceVariant::Http);
        assert_eq!(pipeline.variant(), SourceVariant::Document);
        assert_eq!(pipeline.cache_key(), DOCUMENT_LINKS_KEY);
        assert_eq!(pipeline.empty_result_policy(), EmptyResultPolicy::Accept);
        assert_eq!(pipeline.fetch_timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(pipeline.arc_direction, ArcDirection::RandomizedPerArc);
        assert!(pipeline.highlight_rule().is_highlighted("PORTO"));
        assert!(!pipeline.highlight_rule().is_highlighted("LIS"));
        assert!(config.render_profile().mobile);

        match &pipeline.source {
            SourceConfig::Document { base_url, .. } => {
                assert_eq!(base_url, DocumentStoreSource::DEFAULT_BASE_URL)
            }
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn highlight_names_alone_drive_size_and_color() {
        let config = PipelineConfig {
            highlight_names: Some(names(&["PORTO"])),
            ..PipelineConfig::preset(SourceVariant::Http)
        };
        let rule = config.highlight_rule();
        assert_eq!(rule.accent_names, None);

        let porto = rule.classify("PORTO");
        assert_eq!(porto.size, rule.highlighted_size);
        assert_eq!(porto.color, rule.highlighted_color);

        let lis = rule.classify("LIS");
        assert_eq!(lis.size, rule.default_size);
        assert_eq!(lis.color, rule.default_color);
    }

    #[test]
    fn explicit_accent_names_are_kept() {
        let config = PipelineConfig {
            highlight_names: Some(names(&["PORTO"])),
            accent_names: Some(names(&["LIS"])),
            ..PipelineConfig::preset(SourceVariant::Http)
        };
        let rule = config.highlight_rule();
        assert_eq!(rule.classify("LIS").color, rule.highlighted_color);
        assert_eq!(rule.classify("PORTO").color, rule.default_color);
    }

    #[test]
    fn blank_source_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.json");
        std::fs::write(&path, r#"{"pipeline": {"source": {"kind": "http", "url": " "}}}"#).unwrap();
        assert!(matches!(
            ViewerConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = ViewerConfig::load(Path::new("/nonexistent/viewer.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
