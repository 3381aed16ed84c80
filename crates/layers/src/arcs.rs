use formats::GeoLink;
use serde::{Deserialize, Serialize};

use crate::layer::{Layer, LayerKind};

/// Which way an arc's dash animation travels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcDirection {
    /// Start to end, as recorded.
    #[default]
    Forward,
    /// End to start for every arc.
    Reversed,
    /// Per-arc choice derived from the record and the transform seed.
    RandomizedPerArc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcStyle {
    /// Gradient from start color to end color.
    pub colors: [String; 2],
    pub dash_length: f64,
    pub dash_gap: f64,
    /// Upper bound (exclusive) of the per-arc initial dash offset.
    pub max_initial_gap: f64,
    pub animate_time_ms: u32,
}

impl Default for ArcStyle {
    fn default() -> Self {
        Self {
            colors: [
                "rgba(0,88,232,0.8)".to_string(),
                "rgba(255,255,255,0.8)".to_string(),
            ],
            dash_length: 0.4,
            dash_gap: 4.0,
            max_initial_gap: 5.0,
            animate_time_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArcDatum {
    /// The link as drawn; reversed when the direction policy flips it.
    pub link: GeoLink,
    pub reversed: bool,
    /// In `[0, style.max_initial_gap)`.
    pub initial_gap: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArcLayerConfig {
    pub data: Vec<ArcDatum>,
    pub style: ArcStyle,
}

impl Layer for ArcLayerConfig {
    fn kind(&self) -> LayerKind {
        LayerKind::Arcs
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

const GAP_DOMAIN: &[u8] = b"arc.initial_gap";
const DIRECTION_DOMAIN: &[u8] = b"arc.direction";

/// Uniform value in `[0, 1)` keyed by a link, its position and a seed.
///
/// Keyed hashing keeps the arc layer a pure function of its input: the same
/// collection and seed always yield the same offsets, while overlapping
/// duplicate links still get distinct phases through their index.
fn unit_sample(domain: &[u8], seed: u64, index: usize, link: &GeoLink) -> f64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(domain);
    hasher.update(&seed.to_le_bytes());
    hasher.update(&(index as u64).to_le_bytes());
    hasher.update(link.name.as_bytes());
    for v in [link.start_lat, link.start_lng, link.end_lat, link.end_lng] {
        hasher.update(&v.to_bits().to_le_bytes());
    }
    hasher.update(link.color.as_bytes());

    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.as_bytes()[..8]);
    // Top 53 bits fill an f64 mantissa exactly.
    (u64::from_le_bytes(bytes) >> 11) as f64 / (1u64 << 53) as f64
}

pub fn arc_data(
    links: &[GeoLink],
    direction: ArcDirection,
    style: &ArcStyle,
    seed: u64,
) -> Vec<ArcDatum> {
    let max_gap = style.max_initial_gap.max(0.0);
    links
        .iter()
        .enumerate()
        .map(|(i, link)| {
            let reversed = match direction {
                ArcDirection::Forward => false,
                ArcDirection::Reversed => true,
                ArcDirection::RandomizedPerArc => {
                    unit_sample(DIRECTION_DOMAIN, seed, i, link) < 0.5
                }
            };
            let initial_gap = unit_sample(GAP_DOMAIN, seed, i, link) * max_gap;
            ArcDatum {
                link: if reversed { link.reversed() } else { link.clone() },
                reversed,
                initial_gap,
            }
        })
        .collect()
}
