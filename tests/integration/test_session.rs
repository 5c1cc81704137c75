//! End-to-end chapter session tests.
//!
//! Each test walks the full path a screen visit takes: seed the document
//! store, fetch a chapter through the typed catalog layer, let the renderer
//! selector pick the handler, drive the interaction, and (where the
//! scenario calls for it) persist completion through the progress tracker.

use std::sync::Arc;

use lilt_content::{fetch_chapter, DocPath, DocumentStore, MemoryStore};
use lilt_engine::{
    ChapterOutcome, ImageSize, Point, QuizStep, ScreenContent, TapOutcome,
};
use lilt_progress::ProgressTracker;
use serde_json::json;

async fn store_with_chapter(chapter_id: &str, doc: serde_json::Value) -> MemoryStore {
    let store = MemoryStore::new();
    store
        .write(&DocPath::course("c1"), json!({"courseName": "Course"}))
        .await
        .expect("seed course");
    store
        .write(
            &DocPath::module("c1", "m1"),
            json!({"moduleno": 1, "moduleName": "Module"}),
        )
        .await
        .expect("seed module");
    store
        .write(&DocPath::chapter("c1", "m1", chapter_id), doc)
        .await
        .expect("seed chapter");
    store
}

/// Two questions, Q1 correct option 0, Q2 correct option 1. The learner
/// answers 0 and 0, finishing with 50.0% and a corrected Q2 in the review.
#[tokio::test]
async fn test_quiz_walkthrough_scores_half() {
    let store = store_with_chapter(
        "quiz1",
        json!({
            "chapterno": 1,
            "chapterName": "Quiz",
            "type": "quiz",
            "details": {"questions": [
                {
                    "question": "Q1",
                    "hint": "h1",
                    "options": [
                        {"option": "alpha", "isCorrect": true},
                        {"option": "beta", "isCorrect": false}
                    ]
                },
                {
                    "question": "Q2",
                    "hint": "h2",
                    "options": [
                        {"option": "gamma", "isCorrect": false},
                        {"option": "delta", "isCorrect": true}
                    ]
                }
            ]}
        }),
    )
    .await;

    let chapter = fetch_chapter(&store, "c1", "m1", "quiz1")
        .await
        .expect("chapter fetch");
    let ScreenContent::Quiz(mut session) = ScreenContent::for_chapter(&chapter) else {
        panic!("expected the quiz handler");
    };

    session.select_option(0);
    assert_eq!(
        session.next().expect("answered"),
        QuizStep::Advanced { question_index: 1 }
    );
    session.select_option(0); // wrong; correct is index 1
    assert_eq!(session.next().expect("answered"), QuizStep::Finished);

    assert!((session.score() - 50.0).abs() < f64::EPSILON);

    let review = session.review();
    let q2 = &review[1];
    let chosen = q2.selection.as_ref().expect("Q2 was answered");
    assert_eq!(chosen.label, "gamma");
    assert!(!chosen.is_correct);
    assert_eq!(q2.correct_label.as_deref(), Some("delta"));

    // The finished quiz signals completion; the glue decides to persist it.
    let handler = ScreenContent::Quiz(session);
    let outcome = handler.completion().expect("finished quiz completes");
    assert_eq!(outcome, ChapterOutcome::QuizFinished { score: 50.0 });

    let store: Arc<dyn DocumentStore> = Arc::new(store);
    let tracker = ProgressTracker::new(store, "u1");
    assert!(tracker
        .mark_chapter_complete("c1", "quiz1")
        .await
        .expect("write-back"));
    let record = tracker.fetch("c1").await.expect("progress fetch");
    assert!(record.is_chapter_complete("quiz1"));
    assert_eq!(record.completion(4), 25);
}

/// Target at native (100, 100) on an 800x600 image rendered at 400x300: a
/// tap at rendered (50, 50) projects straight onto the target.
#[tokio::test]
async fn test_lab_scaled_tap_hits_on_first_attempt() {
    let store = store_with_chapter(
        "lab1",
        json!({
            "chapterno": 1,
            "chapterName": "Lab",
            "type": "lab",
            "details": {
                "imageUrl": "https://cdn.example/board.png",
                "question": "Tap the target",
                "answerArea": {"x": 100.0, "y": 100.0},
                "videoUrl": "https://cdn.example/why.mp4"
            }
        }),
    )
    .await;

    let chapter = fetch_chapter(&store, "c1", "m1", "lab1")
        .await
        .expect("chapter fetch");
    let ScreenContent::Lab(mut session) = ScreenContent::for_chapter(&chapter) else {
        panic!("expected the lab handler");
    };

    session.image_loaded(ImageSize::new(800.0, 600.0));
    let outcome = session.tap(Point::new(50.0, 50.0), ImageSize::new(400.0, 300.0));
    assert_eq!(outcome, TapOutcome::Hit { attempts: 1 });
    assert_eq!(session.attempts(), 1);

    let notice = session.notice().expect("success notice is up");
    assert_eq!(notice.attempts, 1);
    assert_eq!(
        notice.explainer_url.as_deref(),
        Some("https://cdn.example/why.mp4")
    );

    // Dismissing the notice returns control without locking input.
    session.dismiss_notice();
    assert_eq!(
        session.tap(Point::new(0.0, 0.0), ImageSize::new(400.0, 300.0)),
        TapOutcome::Miss
    );
    assert_eq!(session.attempts(), 2);

    let handler = ScreenContent::Lab(session);
    assert_eq!(
        handler.completion(),
        Some(ChapterOutcome::LabSolved { attempts: 2 })
    );
}

/// A declared-but-unimplemented chapter kind must render the fallback
/// state, never a blank screen and never a panic.
#[tokio::test]
async fn test_match_chapter_renders_fallback() {
    let store = store_with_chapter(
        "match1",
        json!({
            "chapterno": 1,
            "chapterName": "Matching",
            "type": "match",
            "details": {}
        }),
    )
    .await;

    let chapter = fetch_chapter(&store, "c1", "m1", "match1")
        .await
        .expect("chapter fetch");
    let handler = ScreenContent::for_chapter(&chapter);
    let ScreenContent::Fallback(view) = &handler else {
        panic!("expected the fallback handler, got {}", handler.label());
    };
    assert!(!view.message.is_empty());
    assert!(handler.completion().is_none());
}

/// A video chapter completes only once playback reports the end.
#[tokio::test]
async fn test_video_completes_after_playback_ends() {
    let store = store_with_chapter(
        "vid1",
        json!({
            "chapterno": 1,
            "chapterName": "Video",
            "type": "video",
            "details": {"videoUrl": "https://cdn.example/v.mp4"}
        }),
    )
    .await;

    let chapter = fetch_chapter(&store, "c1", "m1", "vid1")
        .await
        .expect("chapter fetch");
    let ScreenContent::Video(mut player) = ScreenContent::for_chapter(&chapter) else {
        panic!("expected the video handler");
    };
    assert!(ScreenContent::Video(player.clone()).completion().is_none());

    player.mark_finished();
    assert_eq!(
        ScreenContent::Video(player).completion(),
        Some(ChapterOutcome::VideoFinished)
    );
}

/// Retrying a finished quiz lands back in the initial state and the next
/// run is scored from scratch.
#[tokio::test]
async fn test_quiz_retry_then_perfect_run() {
    let store = store_with_chapter(
        "quiz2",
        json!({
            "chapterno": 1,
            "chapterName": "Quiz",
            "type": "quiz",
            "details": {"questions": [{
                "question": "Only question",
                "hint": "",
                "options": [
                    {"option": "right", "isCorrect": true},
                    {"option": "wrong", "isCorrect": false}
                ]
            }]}
        }),
    )
    .await;

    let chapter = fetch_chapter(&store, "c1", "m1", "quiz2")
        .await
        .expect("chapter fetch");
    let ScreenContent::Quiz(mut session) = ScreenContent::for_chapter(&chapter) else {
        panic!("expected the quiz handler");
    };

    session.select_option(1);
    session.next().expect("answered");
    assert!(session.is_finished());
    assert!((session.score() - 0.0).abs() < f64::EPSILON);

    session.retry();
    assert!(!session.is_finished());
    assert_eq!(session.current_index(), 0);
    assert!(session.current_selection().is_none());

    session.select_option(0);
    session.next().expect("answered");
    assert!((session.score() - 100.0).abs() < f64::EPSILON);
}
