use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use thirdperson_common::EntityId;

use crate::state::ControllerState;

/// Current snapshot schema version.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Errors from snapshot capture, encoding and restore.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CBOR serialization error: {0}")]
    CborEncode(String),
    #[error("CBOR deserialization error: {0}")]
    CborDecode(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("unsupported snapshot format `{0}` (expected cbor or json)")]
    UnsupportedFormat(String),
    #[error("no player controls entity {0:?}")]
    UnknownPlayer(EntityId),
    #[error("entity {0:?} has no transform in the host")]
    MissingBody(EntityId),
}

/// A content-addressed controller snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub state: ControllerState,
    /// Hex SHA-256 of the CBOR-encoded `state`.
    pub sha256: String,
}

impl Snapshot {
    pub fn capture(state: ControllerState) -> Result<Self, SnapshotError> {
        let sha256 = sha256_hex(&encode_cbor(&state)?);
        tracing::debug!(tick = state.tick, %sha256, "snapshot captured");
        Ok(Self {
            version: SNAPSHOT_SCHEMA_VERSION,
            state,
            sha256,
        })
    }

    /// Recompute the payload hash and compare.
    pub fn verify(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_SCHEMA_VERSION {
            return Err(SnapshotError::SchemaMismatch {
                file_version: self.version,
                expected_version: SNAPSHOT_SCHEMA_VERSION,
            });
        }
        let actual = sha256_hex(&encode_cbor(&self.state)?);
        if actual != self.sha256 {
            return Err(SnapshotError::IntegrityMismatch {
                expected: self.sha256.clone(),
                actual,
            });
        }
        Ok(())
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, SnapshotError> {
        encode_cbor(self)
    }

    /// Decode and verify.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = ciborium::from_reader(bytes)
            .map_err(|e| SnapshotError::CborDecode(e.to_string()))?;
        snapshot.verify()?;
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode and verify.
    pub fn from_json(text: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(text)?;
        snapshot.verify()?;
        Ok(snapshot)
    }

    /// Write to `path`; the extension (`cbor` or `json`) picks the encoding.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let bytes = match Format::from_path(path)? {
            Format::Cbor => self.to_cbor()?,
            Format::Json => self.to_json()?.into_bytes(),
        };
        std::fs::write(path, bytes)?;
        tracing::info!(path = %path.display(), tick = self.state.tick, "snapshot saved");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        let bytes = std::fs::read(path)?;
        let snapshot = match format {
            Format::Cbor => Self::from_cbor(&bytes)?,
            Format::Json => {
                let text = String::from_utf8(bytes).map_err(|e| {
                    SnapshotError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
                })?;
                Self::from_json(&text)?
            }
        };
        tracing::info!(path = %path.display(), tick = snapshot.state.tick, "snapshot loaded");
        Ok(snapshot)
    }
}

enum Format {
    Cbor,
    Json,
}

impl Format {
    fn from_path(path: &Path) -> Result<Self, SnapshotError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "cbor" => Ok(Self::Cbor),
            "json" => Ok(Self::Json),
            _ => Err(SnapshotError::UnsupportedFormat(ext)),
        }
    }
}

fn encode_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, SnapshotError> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes)
        .map_err(|e| SnapshotError::CborEncode(e.to_string()))?;
    Ok(bytes)
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
