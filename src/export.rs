//! Draft export
//!
//! Produces a portable representation of a single draft: plain JSON, or a
//! reversibly-encoded "compressed"/"encrypted" variant (see
//! [`crate::codec`] for what those placeholders actually do). The output is
//! always a string, suitable for download as a `.json` file named by draft
//! id.

use serde::{Deserialize, Serialize};

use crate::codec::{Base64Codec, Codec, XorCodec};
use crate::error::DraftError;
use crate::models::{Draft, DraftMetadata, DraftVersion};

/// Encoding of an exported draft payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Plain JSON document.
    #[default]
    Json,
    /// Placeholder-compressed (base64-encoded JSON).
    Compressed,
    /// Placeholder-encrypted (XOR-obfuscated, then base64).
    Encrypted,
}

/// What to include in an export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Include the metadata envelope.
    pub include_metadata: bool,
    /// Include the full version history.
    pub include_versions: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Json,
            include_metadata: true,
            include_versions: false,
        }
    }
}

/// Portable draft document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftExport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DraftMetadata>,
    pub current_version: DraftVersion,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<DraftVersion>,
}

/// Serialize `draft` per `options`.
pub fn export_draft(draft: &Draft, options: &ExportOptions) -> Result<String, DraftError> {
    let document = DraftExport {
        metadata: options.include_metadata.then(|| draft.metadata.clone()),
        current_version: draft.current_version.clone(),
        versions: if options.include_versions {
            draft.metadata.versions.clone()
        } else {
            Vec::new()
        },
    };

    let json = serde_json::to_string(&document)
        .map_err(|e| DraftError::ExportError(format!("Failed to serialize draft: {}", e)))?;

    Ok(match options.format {
        ExportFormat::Json => json,
        ExportFormat::Compressed => {
            String::from_utf8_lossy(&Base64Codec.encode(json.as_bytes())).into_owned()
        }
        ExportFormat::Encrypted => {
            let obfuscated = XorCodec::default().encode(json.as_bytes());
            String::from_utf8_lossy(&Base64Codec.encode(&obfuscated)).into_owned()
        }
    })
}

/// Download filename for an exported draft.
pub fn export_file_name(draft_id: &str) -> String {
    format!("{}.json", draft_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DraftMetadata, NavigationState};
    use serde_json::json;

    fn draft() -> Draft {
        let nav = NavigationState {
            current_step: 3,
            total_steps: 9,
        };
        let v1 = DraftVersion::new("d1", json!({"name": "Foo"}), nav);
        let v2 = DraftVersion::new("d1", json!({"name": "Foo", "env": "prod"}), nav);
        let mut metadata = DraftMetadata::new("d1".to_string(), "Foo".to_string(), v1);
        metadata.push_version(v2.clone(), 5);
        Draft {
            metadata,
            current_version: v2,
        }
    }

    #[test]
    fn test_json_export_includes_current_version() {
        let exported = export_draft(&draft(), &ExportOptions::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
        assert_eq!(
            value.pointer("/currentVersion/formData/env").unwrap(),
            &json!("prod")
        );
        assert!(value.get("metadata").is_some());
        // History omitted by default
        assert!(value.get("versions").is_none());
    }

    #[test]
    fn test_export_without_metadata() {
        let options = ExportOptions {
            include_metadata: false,
            include_versions: true,
            ..Default::default()
        };
        let exported = export_draft(&draft(), &options).unwrap();
        let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
        assert!(value.get("metadata").is_none());
        assert_eq!(value.get("versions").unwrap().as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_encoded_formats_are_not_plain_json() {
        for format in [ExportFormat::Compressed, ExportFormat::Encrypted] {
            let options = ExportOptions {
                format,
                ..Default::default()
            };
            let exported = export_draft(&draft(), &options).unwrap();
            assert!(serde_json::from_str::<serde_json::Value>(&exported).is_err());
        }
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("d1"), "d1.json");
    }
}
