//! Renderer selection: one chapter, exactly one handler.
//!
//! [`ScreenContent::for_chapter`] is the single dispatch point between a
//! resolved chapter and the interaction engines. The match is exhaustive
//! over [`ChapterContent`], so a new content kind is a compile-time decision
//! here rather than a string comparison scattered across screens, and
//! anything unrenderable lands in an explicit fallback view.

use lilt_content::{Chapter, ChapterContent};
use tracing::debug;

use crate::lab::LabSession;
use crate::quiz::QuizSession;

/// A text chapter's markup, ready for the host renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextView {
    /// HTML-like markup as authored.
    pub content: String,
}

impl TextView {
    /// The markup reduced to plain text: tags stripped, whitespace
    /// collapsed. Used where a rich renderer is unavailable, e.g. terminal
    /// previews.
    #[must_use]
    pub fn plain_text(&self) -> String {
        use regex::Regex;

        let Ok(tags) = Regex::new(r"<[^>]*>") else {
            return self.content.clone();
        };
        let stripped = tags.replace_all(&self.content, " ");
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// A video chapter handed to the host player.
///
/// Playback itself belongs to the platform; the engine only tracks whether
/// the learner watched to the end, which is what makes a video chapter
/// completable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPlayer {
    /// Playable media URL.
    pub url: String,

    finished: bool,
}

impl VideoPlayer {
    /// Creates a player that has not finished playback.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            finished: false,
        }
    }

    /// Records that playback reached the end.
    pub fn mark_finished(&mut self) {
        self.finished = true;
    }

    /// Whether playback reached the end at least once.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }
}

/// The explicit "missing content" state.
///
/// Shown for unimplemented or unknown chapter kinds and for chapters whose
/// required detail fields are absent. Never blank, never a crash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackView {
    /// Learner-facing explanation.
    pub message: String,
}

/// What a finished interaction reports back to the screen glue.
///
/// Emitting an outcome does not persist anything; whether to record the
/// chapter as complete is the caller's decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChapterOutcome {
    /// A text chapter was viewed.
    TextViewed,
    /// A video was watched to the end.
    VideoFinished,
    /// A quiz reached its result summary.
    QuizFinished {
        /// Final score percentage, one decimal.
        score: f64,
    },
    /// A lab target was found.
    LabSolved {
        /// Attempts taken.
        attempts: u32,
    },
}

/// The one handler rendered for a chapter visit.
#[derive(Debug, Clone)]
pub enum ScreenContent {
    /// Markup text.
    Text(TextView),
    /// Hosted video playback.
    Video(VideoPlayer),
    /// Interactive quiz.
    Quiz(QuizSession),
    /// Image-tap lab exercise.
    Lab(LabSession),
    /// Explicit missing-content state.
    Fallback(FallbackView),
}

impl ScreenContent {
    /// Selects the handler for a chapter's resolved content.
    ///
    /// Exactly one variant comes back for any chapter, including ones whose
    /// content is unavailable.
    #[must_use]
    pub fn for_chapter(chapter: &Chapter) -> Self {
        let selected = match &chapter.content {
            ChapterContent::Text { content } => Self::Text(TextView {
                content: content.clone(),
            }),
            ChapterContent::Video { video_url } => Self::Video(VideoPlayer::new(video_url)),
            ChapterContent::Quiz { questions } => Self::Quiz(QuizSession::new(questions.clone())),
            ChapterContent::Lab {
                image_url,
                question,
                answer_area,
                explainer_url,
            } => Self::Lab(LabSession::new(
                image_url,
                question,
                *answer_area,
                explainer_url.clone(),
            )),
            ChapterContent::Unavailable(gap) => Self::Fallback(FallbackView {
                message: gap.message(),
            }),
        };
        debug!(chapter = %chapter.id, handler = selected.label(), "selected content handler");
        selected
    }

    /// Short name of the selected handler, for logs and previews.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Video(_) => "video",
            Self::Quiz(_) => "quiz",
            Self::Lab(_) => "lab",
            Self::Fallback(_) => "fallback",
        }
    }

    /// The chapter outcome this handler has produced so far, if any.
    ///
    /// Text chapters complete by being viewed; the other handlers complete
    /// when their interaction says so. Fallback content never completes.
    #[must_use]
    pub fn completion(&self) -> Option<ChapterOutcome> {
        match self {
            Self::Text(_) => Some(ChapterOutcome::TextViewed),
            Self::Video(player) => player
                .is_finished()
                .then_some(ChapterOutcome::VideoFinished),
            Self::Quiz(session) => session.is_finished().then(|| ChapterOutcome::QuizFinished {
                score: session.score(),
            }),
            Self::Lab(session) => session.is_solved().then(|| ChapterOutcome::LabSolved {
                attempts: session.attempts(),
            }),
            Self::Fallback(_) => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
