//! Draft import
//!
//! Parses an exported draft document and rebuilds it as a *new* local
//! draft: fresh draft id and metadata timestamps (never the source id, to
//! avoid collision with local drafts), versions remapped to the new id,
//! and the title marked as an import.

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::checksum::checksum;
use crate::codec::{Base64Codec, Codec, XorCodec};
use crate::error::DraftError;
use crate::export::{DraftExport, ExportFormat};
use crate::models::{Draft, DraftMetadata, DraftVersion, title_from_form_data};

/// Parse `data` in the given format into a new [`Draft`].
///
/// The caller (the manager) is responsible for enforcing collection caps
/// and recomputing `size`/`progress` before persisting.
pub fn parse_export(data: &str, format: ExportFormat) -> Result<Draft, DraftError> {
    let json = decode(data, format)?;
    let document: DraftExport = serde_json::from_str(&json)
        .map_err(|e| DraftError::ImportError(format!("Malformed draft document: {}", e)))?;

    let new_id = Uuid::new_v4().to_string();
    let now = Utc::now();

    let current_version = remap_version(&new_id, &document.current_version);

    // Retain exported history under the new draft id, preserving snapshot
    // timestamps. The current version is always the newest entry.
    let mut versions: Vec<DraftVersion> = document
        .versions
        .iter()
        .filter(|v| v.id != document.current_version.id)
        .map(|v| remap_version(&new_id, v))
        .collect();
    versions.push(current_version.clone());

    let source_title = document
        .metadata
        .as_ref()
        .map(|m| m.title.clone())
        .unwrap_or_else(|| title_from_form_data(&current_version.form_data));

    let mut metadata = DraftMetadata::new(
        new_id,
        format!("{} (Imported)", source_title),
        current_version.clone(),
    );
    metadata.versions = versions;
    metadata.created_at = now;
    metadata.updated_at = now;
    metadata.last_accessed_at = now;
    if let Some(source) = document.metadata {
        metadata.description = source.description;
        metadata.tags = source.tags;
    }

    Ok(Draft {
        metadata,
        current_version,
    })
}

fn decode(data: &str, format: ExportFormat) -> Result<String, DraftError> {
    let bytes = match format {
        ExportFormat::Json => data.as_bytes().to_vec(),
        ExportFormat::Compressed => Base64Codec
            .decode(data.as_bytes())
            .map_err(|e| DraftError::ImportError(e.to_string()))?,
        ExportFormat::Encrypted => {
            let obfuscated = Base64Codec
                .decode(data.as_bytes())
                .map_err(|e| DraftError::ImportError(e.to_string()))?;
            XorCodec::default()
                .decode(&obfuscated)
                .map_err(|e| DraftError::ImportError(e.to_string()))?
        }
    };
    String::from_utf8(bytes).map_err(|e| DraftError::ImportError(format!("Invalid UTF-8: {}", e)))
}

/// Rebuild a version under the new draft id, keeping its snapshot
/// timestamp and recomputing the checksum from the carried form data.
fn remap_version(draft_id: &str, source: &DraftVersion) -> DraftVersion {
    let suffix = Uuid::new_v4().simple().to_string();
    DraftVersion {
        id: format!(
            "{}-v{}-{}",
            draft_id,
            source.timestamp.timestamp_millis(),
            &suffix[..8]
        ),
        timestamp: source.timestamp,
        checksum: checksum(&source.form_data),
        form_data: source.form_data.clone(),
        navigation_state: source.navigation_state,
    }
}

/// Convenience check used by hosts that accept pasted payloads: does the
/// string parse as a plain-JSON draft document?
pub fn looks_like_json_export(data: &str) -> bool {
    serde_json::from_str::<Value>(data)
        .map(|v| v.get("currentVersion").is_some())
        .unwrap_or(false)
}
