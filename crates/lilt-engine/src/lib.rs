//! LILT Interaction Engines
//!
//! The decision logic behind a chapter screen: selecting the handler for a
//! chapter's content, running a quiz to its result summary, hit-testing lab
//! taps, and signalling when a chapter counts as completed. Everything here
//! is synchronous in-memory state driven by the host view; persistence and
//! fetching live in the neighboring crates.

pub mod lab;
pub mod quiz;
pub mod render;

pub use lab::{
    ImageSize, LabSession, Point, SuccessNotice, TapMarker, TapOutcome, FEEDBACK_DWELL,
    HIT_THRESHOLD,
};
pub use quiz::{AnswerRequired, QuestionReview, QuizSession, QuizStep, SelectedAnswer};
pub use render::{ChapterOutcome, FallbackView, ScreenContent, TextView, VideoPlayer};
