//! Manifest JSON shapes: the current V2 per-entry descriptor map and the
//! legacy V1 flat map.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntryV2 {
    pub enc_name: String,
    pub original_size: i64,
    pub chunk_count: u64,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestV2 {
    pub version: u32,
    pub chunk_size: u32,
    pub entries: HashMap<String, ManifestEntryV2>,
}

/// `plaintext-relative path` → `encrypted blob name`; every referenced blob
/// is a V1 container of the file's bytes.
pub type ManifestV1 = HashMap<String, String>;

/// A parsed manifest of either generation.
#[derive(Debug, Clone)]
pub enum Manifest {
    V1(ManifestV1),
    V2(ManifestV2),
}

impl Manifest {
    /// Parses `bytes` as a manifest, distinguishing formats by presence of a
    /// `version` field `>= 2` or a non-empty `entries` map; otherwise the
    /// bytes are parsed as a legacy flat map.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;

        let is_v2 = value.get("version").and_then(serde_json::Value::as_u64).is_some_and(|v| v >= 2)
            || value
                .get("entries")
                .and_then(serde_json::Value::as_object)
                .is_some_and(|m| !m.is_empty());

        if is_v2 {
            Ok(Manifest::V2(serde_json::from_value(value)?))
        } else {
            Ok(Manifest::V1(serde_json::from_value(value)?))
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        let bytes = match self {
            Manifest::V1(m) => serde_json::to_vec(m)?,
            Manifest::V2(m) => serde_json::to_vec(m)?,
        };
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v2_round_trips_through_json() {
        let mut entries = HashMap::new();
        entries.insert(
            "photos/a.jpg".to_string(),
            ManifestEntryV2 {
                enc_name: "8f3a2c.bin".to_string(),
                original_size: 123_456,
                chunk_count: 1,
                content_type: "image/jpeg".to_string(),
            },
        );
        let manifest = Manifest::V2(ManifestV2 { version: 2, chunk_size: 1_048_576, entries });

        let json = manifest.to_json().unwrap();
        match Manifest::parse(&json).unwrap() {
            Manifest::V2(parsed) => assert_eq!(parsed.entries.len(), 1),
            Manifest::V1(_) => panic!("expected V2 manifest"),
        }
    }

    #[test]
    fn flat_map_parses_as_v1() {
        let json = br#"{"doc.txt": "a1b2c3.bin"}"#;
        match Manifest::parse(json).unwrap() {
            Manifest::V1(m) => assert_eq!(m.get("doc.txt").unwrap(), "a1b2c3.bin"),
            Manifest::V2(_) => panic!("expected V1 manifest"),
        }
    }

    #[test]
    fn empty_entries_map_is_not_mistaken_for_v2() {
        let json = br#"{}"#;
        match Manifest::parse(json).unwrap() {
            Manifest::V1(m) => assert!(m.is_empty()),
            Manifest::V2(_) => panic!("empty map should parse as legacy V1"),
        }
    }
}
