use formats::GeoLink;

use crate::layer::{Layer, LayerKind};
use crate::symbology::HighlightRule;

/// Destination marker derived from one link.
#[derive(Debug, Clone, PartialEq)]
pub struct PointDatum {
    pub lat: f64,
    pub lng: f64,
    pub size: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointLayerConfig {
    pub data: Vec<PointDatum>,
    pub radius: f64,
    /// Lift above the globe surface, as a fraction of globe radius.
    pub altitude: f64,
}

impl Default for PointLayerConfig {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            radius: 0.3,
            altitude: 0.000_001,
        }
    }
}

impl Layer for PointLayerConfig {
    fn kind(&self) -> LayerKind {
        LayerKind::Points
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

/// One marker per link at its end coordinates. Duplicates are kept.
pub fn destination_points(links: &[GeoLink], rule: &HighlightRule) -> Vec<PointDatum> {
    links
        .iter()
        .map(|link| {
            let class = rule.classify(&link.name);
            PointDatum {
                lat: link.end_lat,
                lng: link.end_lng,
                size: class.size,
                color: class.color,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::destination_points;
    use crate::symbology::HighlightRule;
    use formats::GeoLink;

    fn link(name: &str) -> GeoLink {
        GeoLink {
            name: name.to_string(),
            start_lat: 1.0,
            start_lng: 2.0,
            end_lat: 3.0,
            end_lng: 4.0,
            color: String::new(),
        }
    }

    #[test]
    fn points_use_end_coordinates_and_keep_duplicates() {
        let links = vec![link("A"), link("A")];
        let points = destination_points(&links, &HighlightRule::with_names(["A"]));
        assert_eq!(points.len(), 2);
        for p in &points {
            assert_eq!((p.lat, p.lng), (3.0, 4.0));
            assert_eq!(p.size, 0.25);
        }
    }
}
