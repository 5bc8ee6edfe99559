//! Version metadata and persisted version documents.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::artifact::ArtifactKind;

/// Provenance recorded with every version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionMetadata {
    /// Unique within the `(user, kind)` chain; never reused.
    pub version_id: String,
    /// Owner of the chain.
    pub user_id: String,
    /// Set at write time.
    pub timestamp: DateTime<Utc>,
    /// Correlation token of the request that produced the version.
    #[serde(default)]
    pub source_request_id: Option<String>,
    /// Version that was current when this one was committed.
    #[serde(default)]
    pub prior_version_id: Option<String>,
    /// Deployment environment label.
    #[serde(default)]
    pub environment: Option<String>,
    /// Whether the content came through the completion engine.
    #[serde(default)]
    pub llm_assisted: bool,
}

/// Content of `current.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPointer {
    /// The version currently considered latest.
    pub version_id: String,
}

/// The unit persisted per version: metadata plus the artifact.
///
/// Serializes as `{"version_metadata": {...}, "<kind key>": {...}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedArtifact<K> {
    /// Provenance.
    pub metadata: VersionMetadata,
    /// The artifact as committed.
    pub artifact: K,
}

const METADATA_KEY: &str = "version_metadata";

impl<K: ArtifactKind> Serialize for VersionedArtifact<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(METADATA_KEY, &self.metadata)?;
        map.serialize_entry(K::KIND.document_key(), &self.artifact)?;
        map.end()
    }
}

impl<K: ArtifactKind> VersionedArtifact<K> {
    /// Decodes a version document.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the bytes are not JSON or
    /// either member is missing or malformed.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, String> {
        let mut document: Map<String, Value> =
            serde_json::from_slice(bytes).map_err(|e| e.to_string())?;

        let metadata = document
            .remove(METADATA_KEY)
            .ok_or_else(|| format!("missing {METADATA_KEY}"))?;
        let artifact = document
            .remove(K::KIND.document_key())
            .ok_or_else(|| format!("missing {}", K::KIND.document_key()))?;

        Ok(Self {
            metadata: serde_json::from_value(metadata)
                .map_err(|e| format!("{METADATA_KEY}: {e}"))?,
            artifact: serde_json::from_value(artifact)
                .map_err(|e| format!("{}: {e}", K::KIND.document_key()))?,
        })
    }
}
