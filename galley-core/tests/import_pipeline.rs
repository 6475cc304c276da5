mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use galley::database::entities::{
    assets, content_type_fields, content_types, data_templates, flow_states, flows, frames,
    layouts, themes,
};
use galley::errors::{ImportExportError, ImportWarning, StorageError, StorageResult};
use galley::import::ImportOptions;
use galley::storage::{MemoryObjectStorage, ObjectStorage};
use galley_test_utils::fixtures::{self, TEX_SOURCE};
use galley_test_utils::ArchiveBuilder;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde_json::json;

use common::{count_files, create_owner, Harness};

async fn row_counts(db: &DatabaseConnection) -> [usize; 8] {
    [
        themes::Entity::find().all(db).await.unwrap().len(),
        flows::Entity::find().all(db).await.unwrap().len(),
        flow_states::Entity::find().all(db).await.unwrap().len(),
        frames::Entity::find().all(db).await.unwrap().len(),
        layouts::Entity::find().all(db).await.unwrap().len(),
        content_types::Entity::find().all(db).await.unwrap().len(),
        data_templates::Entity::find().all(db).await.unwrap().len(),
        assets::Entity::find().all(db).await.unwrap().len(),
    ]
}

#[tokio::test]
async fn full_archive_creates_every_entity() {
    let h = Harness::new().await;

    let result = h
        .app
        .import_template_archive(
            fixtures::full_archive(),
            h.organisation_id,
            h.creator_id,
            ImportOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(result.created_count(), 6);
    assert!(result.warnings.is_empty());

    let theme = result.theme.as_ref().unwrap();
    assert_eq!(theme.name, "Corporate");
    assert_eq!(theme.font.as_deref(), Some("Inter"));
    assert_eq!(theme.primary_color.as_deref(), Some("#0044cc"));
    assert_eq!(theme.font_asset_id_list().len(), 2);

    let flow = result.flow.as_ref().unwrap();
    assert!(flow.controlled);
    let states: Vec<(&str, i32)> = result
        .flow_states
        .iter()
        .map(|s| (s.state.as_str(), s.order))
        .collect();
    assert_eq!(states, vec![("Draft", 1), ("Publish", 2)]);

    let frame = result.frame.as_ref().unwrap();
    assert_eq!(frame.frame_type, "latex");
    let frame_file = h
        .frames
        .path()
        .join(h.organisation_id.to_string())
        .join(frame.id.to_string())
        .join("article.tex");
    assert_eq!(std::fs::read_to_string(frame_file).unwrap(), TEX_SOURCE);

    let layout = result.layout.as_ref().unwrap();
    assert_eq!(layout.slug, "a4-letterhead");
    assert!(layout.engine_id.is_some());
    assert_eq!(layout.frame_id, Some(frame.id));

    let content_type = result.content_type.as_ref().unwrap();
    assert_eq!(content_type.prefix, "RPT");
    assert_eq!(content_type.theme_id, theme.id);
    assert_eq!(content_type.layout_id, layout.id);
    assert_eq!(content_type.flow_id, flow.id);

    let fields = &result.content_type_fields;
    assert_eq!(
        fields.iter().map(|f| f.order).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(fields[0].required);
    assert!(fields[0].field_type_id.is_some());
    assert!(fields[1].field_type_id.is_some());
    assert_eq!(fields[2].name, "Mood");
    assert_eq!(fields[2].field_type_id, None);

    let template = result.data_template.as_ref().unwrap();
    assert_eq!(template.content_type_id, content_type.id);
    assert_eq!(template.data, "# Summary\n\nPrepared by [Author]");
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&template.serialized).unwrap(),
        fixtures::template_tree()
    );

    assert_eq!(result.assets.len(), 4);
    assert_eq!(h.storage.len().await, 4);
    for asset in &result.assets {
        assert_eq!(asset.organisation_id, h.organisation_id);
        assert!(h.storage.get(&asset.storage_key).await.is_ok());
    }
}

#[tokio::test]
async fn missing_sections_are_reported_together() {
    let h = Harness::new().await;
    let archive = ArchiveBuilder::new()
        .json("manifest.json", &json!({ "flow": { "name": "Review" } }))
        .build();

    let err = h
        .app
        .import_template_archive(archive, h.organisation_id, h.creator_id, ImportOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ImportExportError::MissingRequiredSections { .. }));
    let items: Vec<&str> = err.missing_items().iter().map(|i| i.item.as_str()).collect();
    assert_eq!(items, vec!["theme", "layout", "variant"]);
    assert_eq!(row_counts(h.db()).await, [0; 8]);
}

#[tokio::test]
async fn declared_sections_need_their_folders() {
    let h = Harness::new().await;
    let archive = ArchiveBuilder::new()
        .json("manifest.json", &fixtures::manifest())
        .json("template.json", &fixtures::template_tree())
        .file("theme/Inter-Regular.ttf", fixtures::FONT_BYTES)
        .build();

    let err = h
        .app
        .import_template_archive(archive, h.organisation_id, h.creator_id, ImportOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ImportExportError::MissingRequiredFolders { .. }));
    let items: Vec<&str> = err.missing_items().iter().map(|i| i.item.as_str()).collect();
    assert_eq!(items, vec!["layout", "frame"]);
}

#[tokio::test]
async fn malformed_manifest_is_rejected_before_any_write() {
    let h = Harness::new().await;
    let archive = ArchiveBuilder::new()
        .json(
            "manifest.json",
            &json!({ "theme": { "name": 7 }, "flow": { "name": "Review" } }),
        )
        .build();

    let err = h
        .app
        .import_template_archive(archive, h.organisation_id, h.creator_id, ImportOptions::default())
        .await
        .unwrap_err();

    match err {
        ImportExportError::ManifestMalformed { messages } => {
            assert!(messages.contains(&"theme.name: expected string".to_string()));
        }
        other => panic!("expected malformed manifest, got {other:?}"),
    }
    assert!(h.storage.is_empty().await);
}

#[tokio::test]
async fn repeated_imports_increment_names() {
    let h = Harness::new().await;

    let mut theme_names = Vec::new();
    let mut titles = Vec::new();
    for _ in 0..3 {
        let result = h
            .app
            .import_template_archive(
                fixtures::full_archive(),
                h.organisation_id,
                h.creator_id,
                ImportOptions::default(),
            )
            .await
            .unwrap();
        theme_names.push(result.theme.unwrap().name);
        titles.push(result.data_template.unwrap().title);
    }

    assert_eq!(theme_names, vec!["Corporate", "Corporate 2", "Corporate 3"]);
    assert_eq!(titles, vec!["Q1 Report", "Q1 Report 2", "Q1 Report 3"]);
}

#[tokio::test]
async fn names_are_scoped_to_the_organisation() {
    let h = Harness::new().await;
    let (other_org, other_creator) = create_owner(h.db(), "Globex").await;

    for (org, creator) in [(h.organisation_id, h.creator_id), (other_org, other_creator)] {
        let result = h
            .app
            .import_template_archive(fixtures::full_archive(), org, creator, ImportOptions::default())
            .await
            .unwrap();
        assert_eq!(result.theme.unwrap().name, "Corporate");
        assert_eq!(result.flow.unwrap().name, "Review");
    }
}

#[tokio::test]
async fn failed_template_conversion_rolls_back_everything() {
    let h = Harness::new().await;
    let archive = ArchiveBuilder::new()
        .json("manifest.json", &fixtures::manifest())
        .json(
            "template.json",
            &json!({ "type": "doc", "content": [{ "type": "carousel" }] }),
        )
        .file("theme/Inter-Regular.ttf", fixtures::FONT_BYTES)
        .file("theme/Inter-Bold.ttf", fixtures::FONT_BYTES)
        .file("layout/letterhead.pdf", fixtures::PDF_BYTES)
        .file("frame/article.tex", TEX_SOURCE.as_bytes())
        .build();

    let err = h
        .app
        .import_template_archive(archive, h.organisation_id, h.creator_id, ImportOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ImportExportError::Markdown(_)));
    assert_eq!(row_counts(h.db()).await, [0; 8]);
    assert!(h.storage.is_empty().await);
    assert_eq!(count_files(h.frames.path()), 0);
}

#[tokio::test]
async fn unknown_engine_is_a_warning() {
    let h = Harness::new().await;
    let mut manifest = fixtures::manifest();
    manifest["layout"]["engine"] = json!("groff/ms");

    let result = h
        .app
        .import_template_archive(
            fixtures::full_archive_builder(&manifest).build(),
            h.organisation_id,
            h.creator_id,
            ImportOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(result.layout.unwrap().engine_id, None);
    assert_eq!(
        result.warnings,
        vec![ImportWarning::EngineNotFound {
            engine: "groff/ms".to_string()
        }]
    );
}

#[tokio::test]
async fn supplied_ids_reuse_existing_entities() {
    let h = Harness::new().await;
    let first = h
        .app
        .import_template_archive(
            fixtures::full_archive(),
            h.organisation_id,
            h.creator_id,
            ImportOptions::default(),
        )
        .await
        .unwrap();

    let archive = ArchiveBuilder::new()
        .json(
            "manifest.json",
            &json!({
                "flow": { "name": "Review" },
                "theme": { "name": "Ignored" }
            }),
        )
        .file("theme/Other-Regular.ttf", fixtures::FONT_BYTES)
        .build();
    let options = ImportOptions {
        theme_id: first.theme.as_ref().map(|t| t.id),
        layout_id: first.layout.as_ref().map(|l| l.id),
        content_type_id: first.content_type.as_ref().map(|c| c.id),
        ..Default::default()
    };

    let second = h
        .app
        .import_template_archive(archive, h.organisation_id, h.creator_id, options)
        .await
        .unwrap();

    assert_eq!(second.created_count(), 1);
    assert!(second.theme.is_none());
    assert_eq!(second.flow.unwrap().name, "Review 2");
    assert!(second.assets.is_empty());
    assert_eq!(themes::Entity::find().all(h.db()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn supplied_ids_must_belong_to_the_organisation() {
    let h = Harness::new().await;
    let first = h
        .app
        .import_template_archive(
            fixtures::full_archive(),
            h.organisation_id,
            h.creator_id,
            ImportOptions::default(),
        )
        .await
        .unwrap();
    let theme_id = first.theme.unwrap().id;
    let (other_org, other_creator) = create_owner(h.db(), "Globex").await;

    let options = ImportOptions {
        theme_id: Some(theme_id),
        ..Default::default()
    };
    let mut manifest = fixtures::manifest();
    manifest.as_object_mut().unwrap().remove("theme");

    let err = h
        .app
        .import_template_archive(
            fixtures::full_archive_builder(&manifest).build(),
            other_org,
            other_creator,
            options,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ImportExportError::ReferenceNotFound { entity: "theme", id } if id == theme_id
    ));
    assert_eq!(flows::Entity::find().all(h.db()).await.unwrap().len(), 1);
}

/// Refuses every upload of the bold font.
struct RejectBold {
    inner: Arc<MemoryObjectStorage>,
}

#[async_trait]
impl ObjectStorage for RejectBold {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> StorageResult<()> {
        if key.ends_with("Inter-Bold.ttf") {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "bucket unavailable",
            )));
        }
        self.inner.put(key, bytes).await
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }

    async fn signed_url(&self, key: &str, ttl: Duration) -> StorageResult<String> {
        self.inner.signed_url(key, ttl).await
    }
}

#[tokio::test]
async fn font_failures_do_not_abort_the_theme() {
    let inner = Arc::new(MemoryObjectStorage::new());
    let h = Harness::with_object_storage(
        inner.clone(),
        Arc::new(RejectBold {
            inner: inner.clone(),
        }),
    )
    .await;

    let result = h
        .app
        .import_template_archive(
            fixtures::full_archive(),
            h.organisation_id,
            h.creator_id,
            ImportOptions::default(),
        )
        .await
        .unwrap();

    let theme = result.theme.unwrap();
    assert_eq!(theme.font_asset_id_list().len(), 1);
    assert_eq!(result.warnings.len(), 1);
    assert!(matches!(
        &result.warnings[0],
        ImportWarning::FontExtractionFailed { file, .. } if file == "theme/Inter-Bold.ttf"
    ));
    // regular font, layout PDF and frame
    assert_eq!(inner.len().await, 3);
}

#[tokio::test]
async fn import_from_path_reads_the_file() {
    let h = Harness::new().await;
    let dir = galley_test_utils::TempDir::new().unwrap();
    let path = dir.write("upload/template.zip", &fixtures::full_archive()).unwrap();

    let result = h
        .app
        .import_template_from_path(&path, h.organisation_id, h.creator_id, ImportOptions::default())
        .await
        .unwrap();
    assert_eq!(result.created_count(), 6);
}

#[tokio::test]
async fn import_from_url_rejects_non_http_schemes() {
    let h = Harness::new().await;
    let err = h
        .app
        .import_template_from_url(
            "file:///etc/passwd",
            h.organisation_id,
            h.creator_id,
            ImportOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ImportExportError::DownloadFailed(_)));
}
