use formats::GeoLink;
use serde::{Deserialize, Serialize};

use crate::layer::{Layer, LayerKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelStyle {
    pub size: f64,
    pub color: String,
    pub font_face: String,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            size: 0.001,
            color: "gray".to_string(),
            font_face: "Arial".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelDatum {
    pub lat: f64,
    pub lng: f64,
    pub text: String,
    pub size: f64,
    pub color: String,
    pub font_face: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelLayerConfig {
    pub data: Vec<LabelDatum>,
}

impl Layer for LabelLayerConfig {
    fn kind(&self) -> LayerKind {
        LayerKind::Labels
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

/// One label per link, anchored at its destination, text = link name as-is.
pub fn destination_labels(links: &[GeoLink], style: &LabelStyle) -> Vec<LabelDatum> {
    links
        .iter()
        .map(|link| LabelDatum {
            lat: link.end_lat,
            lng: link.end_lng,
            text: link.name.clone(),
            size: style.size,
            color: style.color.clone(),
            font_face: style.font_face.clone(),
        })
        .collect()
}
