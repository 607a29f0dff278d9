//! JSON (de)serialization and request body compression at the transport boundary.

use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression as GzLevel;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;

use crate::{Error, ErrorContext, Result};

/// Request body compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Gzip,
}

impl Compression {
    /// Parse `"gzip"` / `"none"` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gzip" => Some(Compression::Gzip),
            "none" | "" => Some(Compression::None),
            _ => None,
        }
    }
}

pub fn serialize<T: Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value).map(Bytes::from).map_err(|e| {
        Error::validation_with_context(
            format!("request body is not serializable: {}", e),
            ErrorContext::new()
                .with_field_path("options.body")
                .with_source("serializer"),
        )
    })
}

pub fn deserialize<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(body)?)
}

pub fn gzip(body: &[u8]) -> Result<Bytes> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(body.len() / 2), GzLevel::default());
    encoder.write_all(body)?;
    Ok(Bytes::from(encoder.finish()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use serde::Deserialize;
    use std::io::Read;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Hit {
        #[serde(rename = "objectID")]
        object_id: String,
        rank: u32,
    }

    #[test]
    fn test_compression_parse() {
        assert_eq!(Compression::parse("GZIP"), Some(Compression::Gzip));
        assert_eq!(Compression::parse("none"), Some(Compression::None));
        assert_eq!(Compression::parse("brotli"), None);
    }

    #[test]
    fn test_gzip_produces_decodable_stream() {
        let body = serialize(&serde_json::json!({"query": "phone", "hitsPerPage": 20})).unwrap();
        let compressed = gzip(&body).unwrap();
        assert_eq!(&compressed[..2], &[0x1f, 0x8b]);

        let mut decoded = Vec::new();
        GzDecoder::new(&compressed[..]).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, body.to_vec());
    }

    #[test]
    fn test_deserialize_mismatch_is_serialization_error() {
        let hit: Hit = deserialize(br#"{"objectID":"42","rank":1}"#).unwrap();
        assert_eq!(hit.object_id, "42");

        let err = deserialize::<Hit>(br#"{"objectID":42}"#).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
