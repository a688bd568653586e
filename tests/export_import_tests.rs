//! Export/import integration tests

use serde_json::json;
use tokio::runtime::Runtime;
use wizard_draft_sdk::{
    DraftError, DraftManager, ExportFormat, ExportOptions, LoadOptions, MemoryStorageBackend,
    NavigationState, SaveOptions, export_file_name,
};

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn nav(current: u32, total: u32) -> NavigationState {
    NavigationState {
        current_step: current,
        total_steps: total,
    }
}

#[test]
fn test_export_then_import_yields_new_draft_with_same_form_data() {
    runtime().block_on(async {
        let manager = DraftManager::new(MemoryStorageBackend::new());
        let form_data = json!({"generalInfo": {"name": "Portable"}, "steps": [1, 2, 3]});
        let id = manager
            .save_draft(&form_data, nav(2, 9), SaveOptions::default())
            .await
            .unwrap();

        let exported = manager
            .export_draft(&id, &ExportOptions::default())
            .await
            .unwrap();
        let new_id = manager
            .import_draft(&exported, ExportFormat::Json)
            .await
            .unwrap();

        assert_ne!(new_id, id);
        let loaded = manager
            .load_draft(&new_id, LoadOptions::default())
            .await
            .unwrap();
        assert_eq!(loaded.form_data, form_data);
        assert_eq!(loaded.navigation_state, nav(2, 9));

        // Both the original and the import coexist
        assert_eq!(manager.get_all_drafts().await.unwrap().len(), 2);
    });
}

#[test]
fn test_imported_title_is_marked() {
    runtime().block_on(async {
        let manager = DraftManager::new(MemoryStorageBackend::new());
        let id = manager
            .save_draft(
                &json!({"generalInfo": {"name": "Billing"}}),
                nav(1, 9),
                SaveOptions::default(),
            )
            .await
            .unwrap();
        let exported = manager
            .export_draft(&id, &ExportOptions::default())
            .await
            .unwrap();
        let new_id = manager
            .import_draft(&exported, ExportFormat::Json)
            .await
            .unwrap();

        let metadata = manager.get_draft_metadata().await.unwrap();
        let imported = metadata.iter().find(|m| m.id == new_id).unwrap();
        assert_eq!(imported.title, "Billing (Imported)");
    });
}

#[test]
fn test_export_missing_draft_is_not_found() {
    runtime().block_on(async {
        let manager = DraftManager::new(MemoryStorageBackend::new());
        let err = manager
            .export_draft("missing", &ExportOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DraftError::NotFound(_)));
    });
}

#[test]
fn test_encoded_export_formats_roundtrip() {
    runtime().block_on(async {
        let manager = DraftManager::new(MemoryStorageBackend::new());
        let form_data = json!({"generalInfo": {"name": "Encoded"}});
        let id = manager
            .save_draft(&form_data, nav(1, 9), SaveOptions::default())
            .await
            .unwrap();

        for format in [ExportFormat::Compressed, ExportFormat::Encrypted] {
            let exported = manager
                .export_draft(
                    &id,
                    &ExportOptions {
                        format,
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
            // Encoded payloads are opaque strings, not JSON
            assert!(serde_json::from_str::<serde_json::Value>(&exported).is_err());

            let new_id = manager.import_draft(&exported, format).await.unwrap();
            let loaded = manager
                .load_draft(&new_id, LoadOptions::default())
                .await
                .unwrap();
            assert_eq!(loaded.form_data, form_data);
        }
    });
}

#[test]
fn test_import_with_history_respects_version_cap() {
    runtime().block_on(async {
        let manager = DraftManager::new(MemoryStorageBackend::new());
        let id = manager
            .save_draft(&json!({"n": 0}), nav(1, 3), SaveOptions::default())
            .await
            .unwrap();
        for n in 1..5 {
            manager
                .save_draft(
                    &json!({ "n": n }),
                    nav(1, 3),
                    SaveOptions {
                        draft_id: Some(id.clone()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        let exported = manager
            .export_draft(
                &id,
                &ExportOptions {
                    include_versions: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let new_id = manager
            .import_draft(&exported, ExportFormat::Json)
            .await
            .unwrap();

        let drafts = manager.get_all_drafts().await.unwrap();
        let imported = drafts
            .iter()
            .find(|d| d.metadata.id == new_id)
            .unwrap();
        assert!(imported.metadata.versions.len() <= 5);
        assert_eq!(imported.current_version.form_data, json!({"n": 4}));
        assert!(imported
            .metadata
            .versions
            .iter()
            .all(|v| v.id.starts_with(&new_id)));
    });
}

#[test]
fn test_malformed_import_is_an_error() {
    runtime().block_on(async {
        let manager = DraftManager::new(MemoryStorageBackend::new());
        let err = manager
            .import_draft("{definitely not a draft", ExportFormat::Json)
            .await
            .unwrap_err();
        assert!(matches!(err, DraftError::ImportError(_)));

        let err = manager
            .import_draft("@@@", ExportFormat::Compressed)
            .await
            .unwrap_err();
        assert!(matches!(err, DraftError::ImportError(_)));

        // Nothing was persisted
        assert!(manager.get_all_drafts().await.unwrap().is_empty());
    });
}

#[test]
fn test_export_file_name_uses_draft_id() {
    assert_eq!(export_file_name("abc-123"), "abc-123.json");
}
