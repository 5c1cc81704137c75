//! Catalog, cache, and progress integration tests.
//!
//! These tests seed a `MemoryStore` from the bundle-shaped fixture under
//! `fixtures/` and exercise the typed fetch layer the way the app screens
//! do: aggregated course reads, ordered module listings, the read-through
//! recent-courses cache, scoped cancellation, and progress write-back.

use std::path::PathBuf;
use std::sync::Arc;

use lilt_content::{
    fetch_chapter, fetch_course, fetch_module, recent_courses, CatalogError, ChapterKind,
    DocPath, DocumentStore, FetchScope, MemoryCache, MemoryStore,
};
use lilt_progress::{completion_percentage, ProgressTracker};
use serde_json::Value;

/// Path to the sample course fixture.
fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/sample-course.json")
}

/// Seeds a store from the bundle-shaped fixture file.
async fn seeded_from_fixture() -> MemoryStore {
    let raw = std::fs::read_to_string(fixture_path()).expect("fixture readable");
    let bundle: Value = serde_json::from_str(&raw).expect("fixture is valid JSON");
    let store = MemoryStore::new();

    for course in bundle["courses"].as_array().expect("courses array") {
        let course_id = course["id"].as_str().expect("course id");
        store
            .write(&DocPath::course(course_id), strip(course, &["id", "modules"]))
            .await
            .expect("seed course");
        for module in course["modules"].as_array().expect("modules array") {
            let module_id = module["id"].as_str().expect("module id");
            store
                .write(
                    &DocPath::module(course_id, module_id),
                    strip(module, &["id", "chapters"]),
                )
                .await
                .expect("seed module");
            for chapter in module["chapters"].as_array().expect("chapters array") {
                let chapter_id = chapter["id"].as_str().expect("chapter id");
                store
                    .write(
                        &DocPath::chapter(course_id, module_id, chapter_id),
                        strip(chapter, &["id"]),
                    )
                    .await
                    .expect("seed chapter");
            }
        }
    }

    for entry in bundle["progress"].as_array().expect("progress array") {
        let user = entry["user"].as_str().expect("user id");
        let course = entry["course"].as_str().expect("course id");
        store
            .write(
                &DocPath::progress(user, course),
                serde_json::json!({"completedChapters": entry["completedChapters"]}),
            )
            .await
            .expect("seed progress");
    }

    store
}

/// A copy of an object value without the given keys.
fn strip(value: &Value, keys: &[&str]) -> Value {
    let mut object = value.as_object().expect("object document").clone();
    for key in keys {
        object.remove(*key);
    }
    Value::Object(object)
}

#[tokio::test]
async fn test_fixture_course_aggregates_in_order() {
    let store = seeded_from_fixture().await;
    let course = fetch_course(&store, "electronics-101").await.expect("course");

    assert_eq!(course.course_name, "Electronics 101");
    assert_eq!(course.tutor_name, "R. Ohm");

    // Stored with moduleno 2 first; fetch returns ascending order.
    let numbers: Vec<u32> = course.modules.iter().map(|m| m.moduleno).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(course.modules[0].module_name, "Basics");
    assert_eq!(course.modules[0].total_chapters, 3);
    assert_eq!(course.modules[1].total_chapters, 2);
    assert_eq!(course.total_chapters(), 5);
}

#[tokio::test]
async fn test_fixture_module_lists_chapters_in_order() {
    let store = seeded_from_fixture().await;
    let module = fetch_module(&store, "electronics-101", "m-basics")
        .await
        .expect("module");

    let numbers: Vec<u32> = module.chapters.iter().map(|c| c.chapterno).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(module.chapters[1].kind, Some(ChapterKind::Quiz));
    assert_eq!(module.chapters[2].kind, Some(ChapterKind::Video));
}

#[tokio::test]
async fn test_fixture_chapters_resolve_or_fall_back() {
    let store = seeded_from_fixture().await;

    let lab = fetch_chapter(&store, "electronics-101", "m-components", "ch-find-resistor")
        .await
        .expect("lab chapter");
    assert!(lab.content.is_available());
    assert!(lab.lint().is_empty());

    let unimplemented = fetch_chapter(&store, "electronics-101", "m-components", "ch-match-symbols")
        .await
        .expect("match chapter");
    assert!(!unimplemented.content.is_available());
    assert_eq!(unimplemented.lint().len(), 1);
}

#[tokio::test]
async fn test_progress_overlay_and_write_back() {
    let store: Arc<dyn DocumentStore> = Arc::new(seeded_from_fixture().await);
    let tracker = ProgressTracker::new(Arc::clone(&store), "learner-1");

    // The fixture starts the learner with one of five chapters done.
    let record = tracker.fetch("electronics-101").await.expect("record");
    assert!(record.is_chapter_complete("ch-voltage"));
    assert_eq!(record.completion(5), 20);

    // Completing the quiz chapter moves the badge and the percentage.
    assert!(tracker
        .mark_chapter_complete("electronics-101", "ch-ohms-law")
        .await
        .expect("write-back"));
    let record = tracker.fetch("electronics-101").await.expect("record");
    assert!(record.is_chapter_complete("ch-ohms-law"));
    assert_eq!(record.completion(5), 40);

    // Idempotent: marking again writes nothing new.
    assert!(!tracker
        .mark_chapter_complete("electronics-101", "ch-ohms-law")
        .await
        .expect("write-back"));

    // Another user still sees an empty record.
    let other = ProgressTracker::new(Arc::clone(&store), "learner-2");
    let record = other.fetch("electronics-101").await.expect("record");
    assert_eq!(record.completed_count(), 0);
}

#[tokio::test]
async fn test_completion_percentage_properties() {
    assert_eq!(completion_percentage(0, 0), 0);
    assert_eq!(completion_percentage(2, 4), 50);
    assert_eq!(completion_percentage(3, 4), 75);
    assert_eq!(completion_percentage(3, 3), 100);
}

#[tokio::test]
async fn test_recent_courses_read_through_cache() {
    let store = seeded_from_fixture().await;
    let cache = MemoryCache::new();

    let first = recent_courses(&store, &cache).await.expect("first read");
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].id, "electronics-101");

    // Second read is served from the cache: wipe the store to prove it.
    let empty_store = MemoryStore::new();
    let second = recent_courses(&empty_store, &cache).await.expect("cached read");
    assert_eq!(second, first);
}

#[tokio::test]
async fn test_scope_cancellation_stops_delivery() {
    let store = seeded_from_fixture().await;
    let scope = FetchScope::new();

    let stalled = scope.run(async {
        // Simulates a slow backend: waits long past the cancel below.
        tokio::time::sleep(std::time::Duration::from_secs(30)).await;
        fetch_course(&store, "electronics-101").await
    });
    let cancel = async {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        scope.cancel();
    };

    let (result, ()) = tokio::join!(stalled, cancel);
    assert!(matches!(result, Err(CatalogError::Cancelled)));

    // Once the view is gone, nothing new runs under its scope either.
    let refused = scope.run(fetch_course(&store, "electronics-101")).await;
    assert!(matches!(refused, Err(CatalogError::Cancelled)));
}
