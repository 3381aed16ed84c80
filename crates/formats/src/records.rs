use foundation::math::GeoPoint;
use serde::{Deserialize, Serialize};

/// A directed connection between two coordinates.
///
/// Field names serialize in camelCase (`startLat`, `endLng`, …), which is the
/// shape served by the link endpoint and stored in cached blobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLink {
    pub name: String,
    pub start_lat: f64,
    pub start_lng: f64,
    pub end_lat: f64,
    pub end_lng: f64,
    #[serde(default)]
    pub color: String,
}

impl GeoLink {
    pub fn new(
        name: impl Into<String>,
        start: GeoPoint,
        end: GeoPoint,
        color: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            start_lat: start.lat,
            start_lng: start.lng,
            end_lat: end.lat,
            end_lng: end.lng,
            color: color.into(),
        }
    }

    pub fn start(&self) -> GeoPoint {
        GeoPoint::new(self.start_lat, self.start_lng)
    }

    pub fn end(&self) -> GeoPoint {
        GeoPoint::new(self.end_lat, self.end_lng)
    }

    /// Same link travelling in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            name: self.name.clone(),
            start_lat: self.end_lat,
            start_lng: self.end_lng,
            end_lat: self.start_lat,
            end_lng: self.start_lng,
            color: self.color.clone(),
        }
    }
}

/// Ordered collection of links; the unit of caching and comparison.
///
/// Never null: an empty collection is valid and renders nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeoLinkCollection(Vec<GeoLink>);

impl GeoLinkCollection {
    pub fn new(links: Vec<GeoLink>) -> Self {
        Self(links)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn links(&self) -> &[GeoLink] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_links(self) -> Vec<GeoLink> {
        self.0
    }

    /// Links whose coordinates are not finite or lie outside degree ranges.
    pub fn invalid_links(&self) -> impl Iterator<Item = &GeoLink> {
        self.0
            .iter()
            .filter(|l| !l.start().is_valid() || !l.end().is_valid())
    }
}

impl From<Vec<GeoLink>> for GeoLinkCollection {
    fn from(links: Vec<GeoLink>) -> Self {
        Self(links)
    }
}

impl std::ops::Deref for GeoLinkCollection {
    type Target = [GeoLink];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// One slice of the aggregate chart (a continent or region).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDatum {
    pub label: String,
    pub value: f64,
    pub color: String,
}

impl CategoryDatum {
    pub fn new(label: impl Into<String>, value: f64, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value,
            color: color.into(),
        }
    }
}

/// Region shares shown when no category endpoint is configured.
pub fn default_categories() -> Vec<CategoryDatum> {
    vec![
        CategoryDatum::new("EUROPA", 73.5, "rgba(128,128,128,0.8)"),
        CategoryDatum::new("AMÉRICA", 17.9, "rgba(211,211,211,0.8)"),
        CategoryDatum::new("ÁFRICA", 0.5, "rgba(255,255,255,0.8)"),
        CategoryDatum::new("ÁSIA", 7.1, "rgba(80,80,80,0.8)"),
        CategoryDatum::new("Oceânia", 1.0, "rgba(49,47,49,0.8)"),
    ]
}

#[derive(Debug)]
pub enum CodecError {
    Encode(serde_json::Error),
    Decode(serde_json::Error),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::Encode(e) => write!(f, "failed to encode link collection: {e}"),
            CodecError::Decode(e) => write!(f, "malformed link collection: {e}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::Encode(e) | CodecError::Decode(e) => Some(e),
        }
    }
}

/// Serialize a collection to its cached blob form (compact JSON array).
///
/// The encoding is canonical for a given collection: field order is fixed by
/// the struct definition, so two equal collections always produce identical
/// blobs and byte comparison doubles as change detection.
pub fn encode_links(links: &GeoLinkCollection) -> Result<String, CodecError> {
    serde_json::to_string(links).map_err(CodecError::Encode)
}

pub fn decode_links(blob: &str) -> Result<GeoLinkCollection, CodecError> {
    serde_json::from_str(blob).map_err(CodecError::Decode)
}

pub fn decode_categories(payload: &str) -> Result<Vec<CategoryDatum>, CodecError> {
    serde_json::from_str(payload).map_err(CodecError::Decode)
}

/// Short content hash of a blob, for log lines.
pub fn blob_fingerprint(blob: &str) -> String {
    let hex = blake3::hash(blob.as_bytes()).to_hex();
    hex.as_str()[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lisbon_dubai() -> GeoLink {
        GeoLink::new(
            "DUBAI",
            GeoPoint::new(38.72, -9.14),
            GeoPoint::new(25.2, 55.27),
            "#ffffff",
        )
    }

    #[test]
    fn encodes_camel_case_fields() {
        let blob = encode_links(&GeoLinkCollection::new(vec![lisbon_dubai()])).unwrap();
        assert_eq!(
            blob,
            r##"[{"name":"DUBAI","startLat":38.72,"startLng":-9.14,"endLat":25.2,"endLng":55.27,"color":"#ffffff"}]"##
        );
    }

    #[test]
    fn equal_collections_encode_identically() {
        let a = GeoLinkCollection::new(vec![lisbon_dubai(), lisbon_dubai().reversed()]);
        let b = a.clone();
        assert_eq!(encode_links(&a).unwrap(), encode_links(&b).unwrap());

        let reordered = GeoLinkCollection::new(vec![lisbon_dubai().reversed(), lisbon_dubai()]);
        assert_ne!(encode_links(&a).unwrap(), encode_links(&reordered).unwrap());
    }

    #[test]
    fn decodes_blob_without_color() {
        let c = decode_links(r#"[{"name":"OPO","startLat":1,"startLng":2,"endLat":3,"endLng":4}]"#)
            .unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].color, "");
        assert_eq!(c[0].end(), GeoPoint::new(3.0, 4.0));
    }

    #[test]
    fn rejects_wrong_shape() {
        assert!(decode_links("{\"name\":\"x\"}").is_err());
        assert!(decode_links("[{\"name\":\"x\",\"startLat\":\"north\"}]").is_err());
        assert!(decode_links("not json").is_err());
    }

    #[test]
    fn empty_array_is_valid() {
        let c = decode_links("[]").unwrap();
        assert!(c.is_empty());
    }

    #[test]
    fn reversed_swaps_endpoints() {
        let r = lisbon_dubai().reversed();
        assert_eq!(r.start(), GeoPoint::new(25.2, 55.27));
        assert_eq!(r.end(), GeoPoint::new(38.72, -9.14));
        assert_eq!(r.name, "DUBAI");
    }

    #[test]
    fn flags_out_of_range_links() {
        let mut bad = lisbon_dubai();
        bad.end_lat = 120.0;
        let c = GeoLinkCollection::new(vec![lisbon_dubai(), bad]);
        assert_eq!(c.invalid_links().count(), 1);
    }

    #[test]
    fn fingerprint_is_stable() {
        assert_eq!(blob_fingerprint("[]"), blob_fingerprint("[]"));
        assert_ne!(blob_fingerprint("[]"), blob_fingerprint("[ ]"));
        assert_eq!(blob_fingerprint("[]").len(), 12);
    }

    #[test]
    fn default_categories_cover_five_regions() {
        let cats = default_categories();
        assert_eq!(cats.len(), 5);
        assert_eq!(cats[0].label, "EUROPA");
    }
}
