//! Decoding of document-store collection listings into link records.
//!
//! The document store answers a collection query with a list of documents,
//! each carrying a resource path and a map of typed field values:
//!
//! ```json
//! {"documents": [{"name": "projects/p/databases/(default)/documents/paises/DUBAI",
//!                 "fields": {"startLat": {"doubleValue": 38.7}, "color": {"stringValue": "#fff"}}}],
//!  "nextPageToken": "..."}
//! ```
//!
//! The document id (last path segment) becomes the link's `name`.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::records::GeoLink;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldValue {
    DoubleValue(f64),
    /// 64-bit integers are transported as decimal strings.
    IntegerValue(String),
    StringValue(String),
    BooleanValue(bool),
    NullValue(()),
    TimestampValue(String),
    MapValue(serde_json::Value),
    ArrayValue(serde_json::Value),
    GeoPointValue(serde_json::Value),
    ReferenceValue(String),
    BytesValue(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::DoubleValue(v) => Some(*v),
            FieldValue::IntegerValue(s) => s.parse::<i64>().ok().map(|v| v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::StringValue(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Document {
    /// Document id: the final segment of the resource path.
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    fn number(&self, field: &'static str) -> Result<f64, DocumentError> {
        let value = self.fields.get(field).ok_or_else(|| DocumentError::MissingField {
            document: self.id().to_string(),
            field,
        })?;
        value.as_f64().ok_or_else(|| DocumentError::WrongType {
            document: self.id().to_string(),
            field,
        })
    }

    pub fn to_link(&self) -> Result<GeoLink, DocumentError> {
        let color = match self.fields.get("color") {
            None => String::new(),
            Some(v) => v
                .as_str()
                .ok_or_else(|| DocumentError::WrongType {
                    document: self.id().to_string(),
                    field: "color",
                })?
                .to_string(),
        };
        Ok(GeoLink {
            name: self.id().to_string(),
            start_lat: self.number("startLat")?,
            start_lng: self.number("startLng")?,
            end_lat: self.number("endLat")?,
            end_lng: self.number("endLng")?,
            color,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPage {
    /// Absent when the collection is empty.
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentError {
    Malformed(String),
    MissingField {
        document: String,
        field: &'static str,
    },
    WrongType {
        document: String,
        field: &'static str,
    },
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentError::Malformed(msg) => write!(f, "malformed document page: {msg}"),
            DocumentError::MissingField { document, field } => {
                write!(f, "document {document} is missing field {field}")
            }
            DocumentError::WrongType { document, field } => {
                write!(f, "document {document} has a non-numeric or mistyped {field}")
            }
        }
    }
}

impl std::error::Error for DocumentError {}

pub fn decode_document_page(payload: &str) -> Result<DocumentPage, DocumentError> {
    serde_json::from_str(payload).map_err(|e| DocumentError::Malformed(e.to_string()))
}

/// Links decoded from a page, plus the documents that could not be used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentLinks {
    pub links: Vec<GeoLink>,
    pub rejected: Vec<DocumentError>,
}

/// Convert documents to links, preserving listing order.
///
/// A document with a missing or mistyped coordinate is skipped and reported
/// in `rejected`; the rest of the page still converts.
pub fn documents_to_links(docs: &[Document]) -> DocumentLinks {
    let mut out = DocumentLinks::default();
    for doc in docs {
        match doc.to_link() {
            Ok(link) => out.links.push(link),
            Err(e) => out.rejected.push(e),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r##"{
        "documents": [
            {
                "name": "projects/bd/databases/(default)/documents/paises/DUBAI",
                "fields": {
                    "startLat": {"doubleValue": 38.72},
                    "startLng": {"doubleValue": -9.14},
                    "endLat": {"doubleValue": 25.2},
                    "endLng": {"integerValue": "55"},
                    "color": {"stringValue": "#ffffff"},
                    "visible": {"booleanValue": true},
                    "note": {"nullValue": null}
                },
                "createTime": "2024-01-01T00:00:00Z"
            }
        ],
        "nextPageToken": "abc"
    }"##;

    #[test]
    fn decodes_page_and_uses_document_id_as_name() {
        let page = decode_document_page(PAGE).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
        let converted = documents_to_links(&page.documents);
        assert!(converted.rejected.is_empty());
        assert_eq!(
            converted.links,
            vec![GeoLink {
                name: "DUBAI".to_string(),
                start_lat: 38.72,
                start_lng: -9.14,
                end_lat: 25.2,
                end_lng: 55.0,
                color: "#ffffff".to_string(),
            }]
        );
    }

    #[test]
    fn empty_collection_has_no_documents_key() {
        let page = decode_document_page("{}").unwrap();
        assert!(page.documents.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn incomplete_document_is_skipped_and_reported() {
        let page = decode_document_page(
            r#"{"documents":[
                {"name":"a/b/PORTO","fields":{"startLat":{"doubleValue":1}}},
                {"name":"a/b/LIS","fields":{
                    "startLat":{"doubleValue":1},"startLng":{"doubleValue":2},
                    "endLat":{"doubleValue":3},"endLng":{"doubleValue":4}}}
            ]}"#,
        )
        .unwrap();
        let converted = documents_to_links(&page.documents);
        let names: Vec<&str> = converted.links.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["LIS"]);
        assert_eq!(
            converted.rejected,
            vec![DocumentError::MissingField {
                document: "PORTO".to_string(),
                field: "startLng"
            }]
        );
    }

    #[test]
    fn string_coordinate_is_wrong_type() {
        let page = decode_document_page(
            r#"{"documents":[{"name":"x/LIS","fields":{"startLat":{"stringValue":"1"}}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            page.documents[0].to_link(),
            Err(DocumentError::WrongType { field: "startLat", .. })
        ));
    }
}
