//! Game runner library
//!
//! JSON game request → simulated `GameRecord` → JSON or MessagePack+LZ4
//! record file with a SHA256 checksum.

use anyhow::{bail, Context, Result};
use gridiron_core::api::simulate_record;
use gridiron_core::{GameRecord, GameRequest, GameSetup, SCHEMA_VERSION};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// On-disk encoding of a game record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum RecordFormat {
    /// Pretty-printed JSON
    Json,
    /// MessagePack, LZ4-compressed with the size prepended
    Packed,
}

impl RecordFormat {
    pub fn extension(self) -> &'static str {
        match self {
            RecordFormat::Json => "json",
            RecordFormat::Packed => "bin",
        }
    }
}

/// What was written for one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub format: RecordFormat,
    /// SHA256 of the written bytes (hex)
    pub checksum: String,
    /// Event-log fingerprint carried by the record
    pub fingerprint: String,
    /// Size of the JSON encoding (bytes)
    pub json_size: u64,
    /// Size on disk (bytes)
    pub written_size: u64,
}

impl RecordMetadata {
    pub fn compression_ratio(&self) -> f64 {
        self.written_size as f64 / self.json_size.max(1) as f64
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn check_version(request: &GameRequest, path: &Path) -> Result<()> {
    if request.schema_version != SCHEMA_VERSION {
        bail!(
            "{}: unsupported schema version {} (expected {})",
            path.display(),
            request.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(())
}

/// Read one game request.
pub fn load_request(path: &Path) -> Result<GameSetup> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file: {}", path.display()))?;
    let request: GameRequest = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse game request: {}", path.display()))?;
    check_version(&request, path)?;
    Ok(request.setup)
}

/// Read a slate: a JSON array of game requests.
pub fn load_slate(path: &Path) -> Result<Vec<GameSetup>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read slate file: {}", path.display()))?;
    let requests: Vec<GameRequest> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse slate: {}", path.display()))?;
    requests
        .into_iter()
        .map(|request| {
            check_version(&request, path)?;
            Ok(request.setup)
        })
        .collect()
}

/// Simulate the game described by a request file.
pub fn simulate_file(path: &Path, with_events: bool) -> Result<GameRecord> {
    let setup = load_request(path)?;
    simulate_record(setup, with_events).map_err(anyhow::Error::msg)
}

/// Encode and write a record.
pub fn write_record(record: &GameRecord, out: &Path, format: RecordFormat) -> Result<RecordMetadata> {
    let json = serde_json::to_vec_pretty(record).context("Failed to serialize record to JSON")?;
    let bytes = match format {
        RecordFormat::Json => json.clone(),
        RecordFormat::Packed => {
            let msgpack =
                rmp_serde::to_vec_named(record).context("Failed to serialize to MessagePack")?;
            lz4_flex::compress_prepend_size(&msgpack)
        }
    };

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
        }
    }
    fs::write(out, &bytes).with_context(|| format!("Failed to write record: {}", out.display()))?;

    Ok(RecordMetadata {
        format,
        checksum: sha256_hex(&bytes),
        fingerprint: record.fingerprint.clone(),
        json_size: json.len() as u64,
        written_size: bytes.len() as u64,
    })
}

/// Read a record written by [`write_record`].
pub fn load_record(path: &Path, format: RecordFormat) -> Result<GameRecord> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read record: {}", path.display()))?;
    match format {
        RecordFormat::Json => serde_json::from_slice(&bytes).context("Failed to parse record JSON"),
        RecordFormat::Packed => {
            let msgpack =
                lz4_flex::decompress_size_prepended(&bytes).context("Failed to decompress LZ4")?;
            rmp_serde::from_slice(&msgpack).context("Failed to deserialize MessagePack")
        }
    }
}

/// Check a written record against its checksum.
pub fn verify_record(path: &Path, expected_checksum: &str) -> Result<bool> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read record: {}", path.display()))?;
    Ok(sha256_hex(&bytes) == expected_checksum)
}
