use formats::GeoLink;
use serde::{Deserialize, Serialize};

use crate::arcs::{ArcDirection, ArcLayerConfig, ArcStyle, arc_data};
use crate::labels::{LabelLayerConfig, LabelStyle, destination_labels};
use crate::points::{PointLayerConfig, destination_points};
use crate::symbology::HighlightRule;

/// Parameters of the link-to-layers mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub highlight: HighlightRule,
    pub arc_direction: ArcDirection,
    pub arc_style: ArcStyle,
    pub show_labels: bool,
    pub label_style: LabelStyle,
    /// Seed for per-arc offsets and randomized directions.
    pub seed: u64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            highlight: HighlightRule::default(),
            arc_direction: ArcDirection::Forward,
            arc_style: ArcStyle::default(),
            show_labels: false,
            label_style: LabelStyle::default(),
            seed: 0,
        }
    }
}

/// The three draw layers derived from one link collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerSet {
    pub arcs: ArcLayerConfig,
    pub points: PointLayerConfig,
    pub labels: LabelLayerConfig,
}

/// Map a link collection to its arc, point and label layers.
///
/// Pure: output order follows input order and nothing outside the arguments
/// is read or written.
pub fn to_layers(links: &[GeoLink], config: &TransformConfig) -> LayerSet {
    let labels = if config.show_labels {
        destination_labels(links, &config.label_style)
    } else {
        Vec::new()
    };

    LayerSet {
        arcs: ArcLayerConfig {
            data: arc_data(links, config.arc_direction, &config.arc_style, config.seed),
            style: config.arc_style.clone(),
        },
        points: PointLayerConfig {
            data: destination_points(links, &config.highlight),
            ..PointLayerConfig::default()
        },
        labels: LabelLayerConfig { data: labels },
    }
}
