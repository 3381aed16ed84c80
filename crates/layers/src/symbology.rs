use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Size and color assigned to a destination marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PointClass {
    pub size: f64,
    pub color: String,
}

/// Highlight classification for destination markers.
///
/// Membership is an exact, case-sensitive match against explicit name sets;
/// `"LIS"` and `"lis"` are different places. `accent_names`, when present,
/// decides the color independently of the size set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightRule {
    pub highlight_names: BTreeSet<String>,
    pub accent_names: Option<BTreeSet<String>>,
    pub highlighted_size: f64,
    pub default_size: f64,
    pub highlighted_color: String,
    pub default_color: String,
}

impl Default for HighlightRule {
    fn default() -> Self {
        Self {
            highlight_names: ["LIS", "OPO", "Lisbon", "Porto"]
                .into_iter()
                .map(String::from)
                .collect(),
            accent_names: Some(["LIS", "Lisbon"].into_iter().map(String::from).collect()),
            highlighted_size: 0.25,
            default_size: 0.2,
            highlighted_color: "#ffffff".to_string(),
            default_color: "#0058E8".to_string(),
        }
    }
}

impl HighlightRule {
    /// A rule where one name set drives both size and color.
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            highlight_names: names.into_iter().map(Into::into).collect(),
            accent_names: None,
            ..Self::default()
        }
    }

    pub fn is_highlighted(&self, name: &str) -> bool {
        self.highlight_names.contains(name)
    }

    pub fn is_accented(&self, name: &str) -> bool {
        match &self.accent_names {
            Some(accent) => accent.contains(name),
            None => self.is_highlighted(name),
        }
    }

    pub fn classify(&self, name: &str) -> PointClass {
        let size = if self.is_highlighted(name) {
            self.highlighted_size
        } else {
            self.default_size
        };
        let color = if self.is_accented(name) {
            &self.highlighted_color
        } else {
            &self.default_color
        };
        PointClass {
            size,
            color: color.clone(),
        }
    }
}
