use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use growlog_lib::gallery::channel::{handle_method_call, SAVE_IMAGE_TO_GALLERY};
use growlog_lib::gallery::{
    GalleryConfig, GalleryImporter, InMemoryMediaIndex, MethodCall, MethodResponse, SqliteMediaIndex,
};
use proptest::prelude::*;
use serde_json::json;

fn sample_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 256) as u8).collect()
}

#[test]
fn capture_lands_in_growlog_album() {
    let device = tempfile::tempdir().expect("device root");
    let scratch = tempfile::tempdir().expect("scratch dir");
    let source = scratch.path().join("cap.jpg");
    let bytes = sample_bytes(10_240);
    fs::write(&source, &bytes).expect("write capture");

    let index = Arc::new(SqliteMediaIndex::open_in_memory(device.path()).expect("open index"));
    let importer = GalleryImporter::new(index.clone(), GalleryConfig::default());

    let path = source.to_string_lossy().to_string();
    let uri = importer.import(Some(path.as_str())).expect("import should succeed");

    assert!(uri.as_str().starts_with("content://media/"));
    let record = index.find(&uri).expect("find").expect("record exists");
    assert_eq!(record.display_name, "cap.jpg");
    assert_eq!(record.mime_type, "image/jpeg");
    assert_eq!(record.size, 10_240);
    assert_eq!(
        PathBuf::from(&record.data_path),
        device.path().join("Pictures").join("GrowLog").join("cap.jpg")
    );
    assert_eq!(fs::read(&record.data_path).expect("read gallery copy"), bytes);
    // 源文件保持不变
    assert_eq!(fs::read(&source).expect("read source"), bytes);
}

#[test]
fn importing_twice_keeps_both_copies() {
    let device = tempfile::tempdir().expect("device root");
    let scratch = tempfile::tempdir().expect("scratch dir");
    let source = scratch.path().join("photo1.jpg");
    fs::write(&source, b"first").expect("write source");

    let index = Arc::new(SqliteMediaIndex::open_in_memory(device.path()).expect("open index"));
    let importer = GalleryImporter::new(index.clone(), GalleryConfig::default());
    let path = source.to_string_lossy().to_string();

    let first = importer.import(Some(path.as_str())).expect("first import");
    fs::write(&source, b"second").expect("rewrite source");
    let second = importer.import(Some(path.as_str())).expect("second import");

    let first = index.find(&first).expect("find").expect("first record");
    let second = index.find(&second).expect("find").expect("second record");
    assert_eq!(first.display_name, second.display_name);
    assert_eq!(fs::read(&first.data_path).expect("read"), b"first");
    assert_eq!(fs::read(&second.data_path).expect("read"), b"second");
    assert_eq!(index.list_recent(10).expect("list").len(), 2);
}

#[test]
fn channel_reports_failures_without_creating_entries() {
    let scratch = tempfile::tempdir().expect("scratch dir");
    let index = Arc::new(InMemoryMediaIndex::new());
    let importer = GalleryImporter::new(index.clone(), GalleryConfig::default());

    let missing = scratch.path().join("gone.jpg");
    let calls = [
        MethodCall::new(SAVE_IMAGE_TO_GALLERY, json!({})),
        MethodCall::new(SAVE_IMAGE_TO_GALLERY, json!({ "imagePath": null })),
        MethodCall::new(
            SAVE_IMAGE_TO_GALLERY,
            json!({ "imagePath": missing.to_string_lossy() }),
        ),
    ];

    for call in &calls {
        assert_eq!(handle_method_call(&importer, call), MethodResponse::unavailable());
    }
    assert!(index.is_empty());

    let other = MethodCall::new("shareImage", json!({ "imagePath": "/tmp/x.jpg" }));
    assert_eq!(handle_method_call(&importer, &other), MethodResponse::NotImplemented);
}

#[test]
fn broken_destination_never_exhausts_handle_pool() {
    let scratch = tempfile::tempdir().expect("scratch dir");
    let source = scratch.path().join("leaf.jpg");
    fs::write(&source, sample_bytes(64 * 1024)).expect("write source");

    let index = Arc::new(InMemoryMediaIndex::with_writer_limit(1));
    index.fail_writes_after(Some(1));
    let importer = GalleryImporter::new(index.clone(), GalleryConfig::default());
    let call = MethodCall::new(
        SAVE_IMAGE_TO_GALLERY,
        json!({ "imagePath": source.to_string_lossy() }),
    );

    for _ in 0..25 {
        assert_eq!(handle_method_call(&importer, &call), MethodResponse::unavailable());
        assert_eq!(index.open_writers(), 0);
    }
    assert_eq!(index.len(), 25);

    index.fail_writes_after(None);
    assert!(matches!(
        handle_method_call(&importer, &call),
        MethodResponse::Success { .. }
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn gallery_copy_is_byte_identical(bytes in proptest::collection::vec(any::<u8>(), 0..20_000)) {
        let scratch = tempfile::tempdir().expect("scratch dir");
        let source = scratch.path().join("any.jpg");
        fs::write(&source, &bytes).expect("write source");

        let index = Arc::new(InMemoryMediaIndex::new());
        let importer = GalleryImporter::new(index.clone(), GalleryConfig::default());
        let path = source.to_string_lossy().to_string();
        let uri = importer.import(Some(path.as_str())).expect("import");

        let entry = index.entry(&uri).expect("entry");
        prop_assert_eq!(entry.bytes.len(), bytes.len());
        prop_assert_eq!(entry.bytes, bytes);
        prop_assert_eq!(entry.display_name, "any.jpg");
    }
}
