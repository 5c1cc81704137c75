//! Catalog data model for the LILT learning platform.
//!
//! Courses contain ordered modules, modules contain ordered chapters, and a
//! chapter carries exactly one kind of interactive content. Stored chapter
//! documents arrive with a free-string `type` tag and a `details` map of
//! optional fields; this module converts that wire shape once, up front, into
//! the [`ChapterContent`] sum type so every downstream consumer sees either a
//! fully-formed payload or an explicit [`ContentGap`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// ChapterKind
// ============================================================================

/// The declared content kind of a chapter, as stored in its `type` field.
///
/// `Match` is declared by content authors but has no interaction handler;
/// chapters tagged with it render the fallback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChapterKind {
    /// Markup text content.
    Text,
    /// A hosted video.
    Video,
    /// A multi-question quiz.
    Quiz,
    /// A matching exercise (declared, not implemented).
    Match,
    /// An image-tap lab exercise.
    Lab,
}

impl ChapterKind {
    /// Parses a stored `type` tag.
    ///
    /// Returns `None` for tags this application does not know about.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "text" => Some(Self::Text),
            "video" => Some(Self::Video),
            "quiz" => Some(Self::Quiz),
            "match" => Some(Self::Match),
            "lab" => Some(Self::Lab),
            _ => None,
        }
    }

    /// Returns `true` if an interaction handler exists for this kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use lilt_content::ChapterKind;
    ///
    /// assert!(ChapterKind::Quiz.has_handler());
    /// assert!(!ChapterKind::Match.has_handler());
    /// ```
    #[must_use]
    pub const fn has_handler(&self) -> bool {
        !matches!(self, Self::Match)
    }
}

impl std::fmt::Display for ChapterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Video => write!(f, "video"),
            Self::Quiz => write!(f, "quiz"),
            Self::Match => write!(f, "match"),
            Self::Lab => write!(f, "lab"),
        }
    }
}

// ============================================================================
// Quiz and lab payload pieces
// ============================================================================

/// One selectable answer within a quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    /// Text shown to the learner.
    #[serde(rename = "option")]
    pub label: String,

    /// Whether choosing this option scores the question as correct.
    pub is_correct: bool,
}

/// A single quiz question with its hint and answer options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// The question text.
    #[serde(rename = "question")]
    pub prompt: String,

    /// Hint text the learner can reveal; scoring ignores it.
    #[serde(default)]
    pub hint: String,

    /// Answer options in declaration order.
    pub options: Vec<AnswerOption>,
}

impl Question {
    /// Returns the authoritative correct option for this question.
    ///
    /// Stored data may flag more than one option as correct; the first one in
    /// declaration order wins. Returns `None` when no option is flagged,
    /// which [`Chapter::lint`] reports as a content defect.
    #[must_use]
    pub fn correct_option(&self) -> Option<(usize, &AnswerOption)> {
        self.options
            .iter()
            .enumerate()
            .find(|(_, option)| option.is_correct)
    }
}

/// The target point of a lab exercise, in the image's native pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnswerArea {
    /// Horizontal coordinate in native pixels.
    pub x: f64,
    /// Vertical coordinate in native pixels.
    pub y: f64,
}

// ============================================================================
// Wire documents
// ============================================================================

/// The stored `details` map of a chapter document.
///
/// Every field is optional on the wire; which ones are required depends on
/// the chapter's declared kind and is resolved by [`Chapter::from_doc`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsDoc {
    /// Markup content for text chapters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Question list for quiz chapters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<Question>>,

    /// Playable media URL for video chapters, or the optional post-success
    /// explainer for lab chapters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    /// Exercise image URL for lab chapters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Prompt text for lab chapters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,

    /// Target point for lab chapters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer_area: Option<AnswerArea>,
}

/// A chapter document as stored, before content conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDoc {
    /// Module-relative sequence number, 1-based.
    pub chapterno: u32,

    /// Display name.
    pub chapter_name: String,

    /// Free-string content kind tag.
    #[serde(rename = "type")]
    pub kind: String,

    /// Kind-dependent payload fields.
    #[serde(default)]
    pub details: DetailsDoc,
}

/// A course document as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDoc {
    /// Display name.
    pub course_name: String,

    /// Thumbnail image reference.
    #[serde(default)]
    pub thumbnail_url: String,

    /// Free-text description.
    #[serde(default)]
    pub course_desc: String,

    /// Instructor display name.
    #[serde(default)]
    pub tutor_name: String,

    /// When the course was added to the catalog; orders the recent list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_date: Option<DateTime<Utc>>,
}

/// A module document as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDoc {
    /// Course-relative sequence number, 1-based.
    pub moduleno: u32,

    /// Display name.
    pub module_name: String,

    /// Informational kind tag shown on the course screen.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

// ============================================================================
// Aggregated catalog views
// ============================================================================

/// A catalog entry for the recent-courses list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    /// Document id.
    pub id: String,

    /// Display name.
    pub course_name: String,

    /// Thumbnail image reference.
    pub thumbnail_url: String,

    /// When the course was added; newest first in the recent list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_date: Option<DateTime<Utc>>,
}

/// A module as listed on the course screen: metadata plus chapter count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSummary {
    /// Document id.
    pub id: String,

    /// Course-relative sequence number, 1-based.
    pub moduleno: u32,

    /// Display name.
    pub module_name: String,

    /// Informational kind tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Number of chapters in this module.
    pub total_chapters: usize,
}

/// A fully resolved course with its modules in `moduleno` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Document id.
    pub id: String,

    /// Display name.
    pub course_name: String,

    /// Thumbnail image reference.
    pub thumbnail_url: String,

    /// Free-text description.
    pub course_desc: String,

    /// Instructor display name.
    pub tutor_name: String,

    /// Modules ordered by `moduleno` ascending.
    pub modules: Vec<ModuleSummary>,
}

impl Course {
    /// Total chapter count across all modules.
    #[must_use]
    pub fn total_chapters(&self) -> usize {
        self.modules.iter().map(|m| m.total_chapters).sum()
    }
}

/// A chapter as listed on the module screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterSummary {
    /// Document id.
    pub id: String,

    /// Module-relative sequence number, 1-based.
    pub chapterno: u32,

    /// Display name.
    pub chapter_name: String,

    /// Parsed kind tag; `None` when the stored tag is unknown.
    pub kind: Option<ChapterKind>,
}

/// A module with its chapters in `chapterno` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Document id.
    pub id: String,

    /// Course-relative sequence number, 1-based.
    pub moduleno: u32,

    /// Display name.
    pub module_name: String,

    /// Chapters ordered by `chapterno` ascending.
    pub chapters: Vec<ChapterSummary>,
}

// ============================================================================
// ChapterContent
// ============================================================================

/// Why a chapter has no renderable content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GapReason {
    /// The kind is declared in the data model but has no handler.
    UnimplementedKind(ChapterKind),

    /// The stored `type` tag is not part of the data model at all.
    UnknownKind(String),

    /// Required detail fields for the declared kind are absent.
    MissingFields(Vec<&'static str>),

    /// A quiz chapter with an empty question list.
    EmptyQuiz,
}

impl std::fmt::Display for GapReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnimplementedKind(kind) => {
                write!(f, "'{kind}' chapters are not supported yet")
            }
            Self::UnknownKind(tag) => write!(f, "unrecognized chapter type '{tag}'"),
            Self::MissingFields(fields) => {
                write!(f, "missing required fields: {}", fields.join(", "))
            }
            Self::EmptyQuiz => write!(f, "quiz has no questions"),
        }
    }
}

/// Describes a chapter whose content cannot be rendered.
///
/// Gaps are display data, not errors: the renderer shows them as an explicit
/// "missing content" state instead of a blank screen or a crash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentGap {
    /// The `type` tag as stored on the chapter document.
    pub declared: String,

    /// Why no handler applies.
    pub reason: GapReason,
}

impl ContentGap {
    /// A learner-facing message for the fallback view.
    #[must_use]
    pub fn message(&self) -> String {
        format!("This chapter's content is unavailable: {}.", self.reason)
    }
}

/// The resolved, kind-specific payload of a chapter.
///
/// Conversion from the wire shape never fails; anything that cannot be
/// rendered becomes [`ChapterContent::Unavailable`].
#[derive(Debug, Clone, PartialEq)]
pub enum ChapterContent {
    /// Markup text. An absent `content` field reads as the empty string.
    Text {
        /// HTML-like markup.
        content: String,
    },

    /// A hosted video.
    Video {
        /// Playable media URL.
        video_url: String,
    },

    /// A quiz with at least one question.
    Quiz {
        /// Questions in presentation order.
        questions: Vec<Question>,
    },

    /// An image-tap lab exercise.
    Lab {
        /// Exercise image URL.
        image_url: String,
        /// Prompt shown above the image.
        question: String,
        /// Target point in native pixel space.
        answer_area: AnswerArea,
        /// Optional post-success explainer video.
        explainer_url: Option<String>,
    },

    /// No handler applies; render the fallback state.
    Unavailable(ContentGap),
}

impl ChapterContent {
    /// Resolves the declared kind tag and detail fields into a payload.
    fn resolve(tag: &str, details: DetailsDoc) -> Self {
        let gap = |reason| Self::Unavailable(ContentGap {
            declared: tag.to_string(),
            reason,
        });

        let Some(kind) = ChapterKind::from_tag(tag) else {
            return gap(GapReason::UnknownKind(tag.to_string()));
        };

        match kind {
            ChapterKind::Text => Self::Text {
                content: details.content.unwrap_or_default(),
            },
            ChapterKind::Video => match details.video_url {
                Some(video_url) => Self::Video { video_url },
                None => gap(GapReason::MissingFields(vec!["videoUrl"])),
            },
            ChapterKind::Quiz => match details.questions {
                Some(questions) if !questions.is_empty() => Self::Quiz { questions },
                Some(_) => gap(GapReason::EmptyQuiz),
                None => gap(GapReason::MissingFields(vec!["questions"])),
            },
            ChapterKind::Lab => match (details.image_url, details.question, details.answer_area) {
                (Some(image_url), Some(question), Some(answer_area)) => Self::Lab {
                    image_url,
                    question,
                    answer_area,
                    explainer_url: details.video_url,
                },
                (image_url, question, answer_area) => {
                    let mut missing = Vec::new();
                    if image_url.is_none() {
                        missing.push("imageUrl");
                    }
                    if question.is_none() {
                        missing.push("question");
                    }
                    if answer_area.is_none() {
                        missing.push("answerArea");
                    }
                    gap(GapReason::MissingFields(missing))
                }
            },
            ChapterKind::Match => gap(GapReason::UnimplementedKind(kind)),
        }
    }

    /// Returns `true` when a handler can render this content.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable(_))
    }
}

// ============================================================================
// Chapter
// ============================================================================

/// A fully resolved chapter, ready for the renderer selector.
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    /// Document id.
    pub id: String,

    /// Module-relative sequence number, 1-based.
    pub chapterno: u32,

    /// Display name.
    pub chapter_name: String,

    /// Resolved content payload.
    pub content: ChapterContent,
}

impl Chapter {
    /// Converts a stored chapter document into a resolved chapter.
    ///
    /// Never fails: documents whose kind tag or detail fields do not line up
    /// resolve to [`ChapterContent::Unavailable`], with the gap logged.
    ///
    /// # Examples
    ///
    /// ```
    /// use lilt_content::{Chapter, ChapterDoc, ChapterContent, DetailsDoc};
    ///
    /// let doc = ChapterDoc {
    ///     chapterno: 1,
    ///     chapter_name: "Intro".to_string(),
    ///     kind: "text".to_string(),
    ///     details: DetailsDoc {
    ///         content: Some("<p>Welcome</p>".to_string()),
    ///         ..DetailsDoc::default()
    ///     },
    /// };
    /// let chapter = Chapter::from_doc("ch1", doc);
    /// assert!(matches!(chapter.content, ChapterContent::Text { .. }));
    /// ```
    #[must_use]
    pub fn from_doc(id: impl Into<String>, doc: ChapterDoc) -> Self {
        let id = id.into();
        let content = ChapterContent::resolve(&doc.kind, doc.details);
        if let ChapterContent::Unavailable(gap) = &content {
            tracing::warn!(
                chapter = %id,
                declared = %gap.declared,
                reason = %gap.reason,
                "chapter content unavailable"
            );
        }
        Self {
            id,
            chapterno: doc.chapterno,
            chapter_name: doc.chapter_name,
            content,
        }
    }

    /// Reports author-facing content defects for this chapter.
    ///
    /// Unavailable content is a finding, as is any quiz question with zero
    /// or more than one `isCorrect` option. The interaction engines tolerate
    /// all of these at runtime; the findings exist so authors can fix the
    /// data.
    #[must_use]
    pub fn lint(&self) -> Vec<ContentFinding> {
        let mut findings = Vec::new();
        match &self.content {
            ChapterContent::Unavailable(gap) => {
                findings.push(ContentFinding::Unavailable(gap.clone()));
            }
            ChapterContent::Quiz { questions } => {
                for (index, question) in questions.iter().enumerate() {
                    let correct = question.options.iter().filter(|o| o.is_correct).count();
                    if correct == 0 {
                        findings.push(ContentFinding::NoCorrectOption {
                            question_index: index,
                        });
                    } else if correct > 1 {
                        findings.push(ContentFinding::MultipleCorrectOptions {
                            question_index: index,
                            count: correct,
                        });
                    }
                }
            }
            ChapterContent::Text { .. } | ChapterContent::Video { .. } | ChapterContent::Lab { .. } => {}
        }
        findings
    }
}

/// An author-facing content defect found by [`Chapter::lint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentFinding {
    /// The chapter renders the fallback state.
    Unavailable(ContentGap),

    /// A quiz question with no option flagged correct.
    NoCorrectOption {
        /// 0-based question index.
        question_index: usize,
    },

    /// A quiz question with several options flagged correct; the first wins.
    MultipleCorrectOptions {
        /// 0-based question index.
        question_index: usize,
        /// How many options are flagged.
        count: usize,
    },
}

impl std::fmt::Display for ContentFinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(gap) => write!(f, "content unavailable ({})", gap.reason),
            Self::NoCorrectOption { question_index } => {
                write!(f, "question {} has no correct option", question_index + 1)
            }
            Self::MultipleCorrectOptions {
                question_index,
                count,
            } => write!(
                f,
                "question {} flags {count} options as correct; the first is used",
                question_index + 1
            ),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
