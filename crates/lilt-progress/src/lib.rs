//! LILT Progress Tracking
//!
//! Per-(user, course) completion records: which chapters a learner has
//! finished and what fraction of a course that amounts to. Records live in
//! the document store at `users/{user}/progress/{course}`; an absent record
//! reads as empty. Completion gates badges and percentages only; a learner
//! may revisit or skip ahead freely, so nothing here blocks navigation.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use lilt_content::{DocPath, DocumentStore, StoreError};

/// A specialized `Result` type for progress operations.
pub type Result<T> = std::result::Result<T, ProgressError>;

/// Errors surfaced by progress reads and writes.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// The stored progress document does not decode.
    #[error("malformed progress document at '{path}': {message}")]
    Malformed {
        /// Path of the offending document.
        path: String,
        /// Decode failure description.
        message: String,
    },

    /// The store backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// Completion arithmetic
// ============================================================================

/// Integer completion percentage in `[0, 100]`.
///
/// Defined as `round(100 * completed / total)`, and `0` when `total` is
/// zero, an explicit boundary rule rather than a crash path. Stale completed ids
/// (chapters since removed) can push the ratio past one; the result clamps
/// at 100.
///
/// # Examples
///
/// ```
/// use lilt_progress::completion_percentage;
///
/// assert_eq!(completion_percentage(0, 0), 0);
/// assert_eq!(completion_percentage(2, 4), 50);
/// assert_eq!(completion_percentage(3, 4), 75);
/// assert_eq!(completion_percentage(3, 3), 100);
/// ```
#[must_use]
pub fn completion_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    #[allow(clippy::cast_precision_loss)] // chapter counts are far below 2^52
    let ratio = completed as f64 / total as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    // clamped to [0, 100] before the cast
    let percent = (ratio * 100.0).round().clamp(0.0, 100.0) as u8;
    percent
}

// ============================================================================
// ProgressRecord
// ============================================================================

/// A user's completion record for one course.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    /// Ids of completed chapters. Membership is what matters; the set
    /// collapses any duplicates the wire may carry.
    #[serde(default)]
    pub completed_chapters: BTreeSet<String>,

    /// When the record last changed; absent on records written before the
    /// field existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    /// Membership test backing the chapter badge.
    #[must_use]
    pub fn is_chapter_complete(&self, chapter_id: &str) -> bool {
        self.completed_chapters.contains(chapter_id)
    }

    /// Number of completed chapters.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed_chapters.len()
    }

    /// Completion percentage against a course's total chapter count.
    #[must_use]
    pub fn completion(&self, total_chapters: usize) -> u8 {
        completion_percentage(self.completed_count(), total_chapters)
    }
}

// ============================================================================
// ProgressTracker
// ============================================================================

/// Reads and writes one user's progress records.
///
/// The store handle and user identity are explicit constructor dependencies
/// so tests run against an in-memory store without any ambient state.
#[derive(Clone)]
pub struct ProgressTracker {
    store: Arc<dyn DocumentStore>,
    user_id: String,
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

impl ProgressTracker {
    /// Creates a tracker for one user over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
        }
    }

    /// The user this tracker belongs to.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Fetches the user's record for a course.
    ///
    /// An absent document is an empty record, not an error.
    pub async fn fetch(&self, course_id: &str) -> Result<ProgressRecord> {
        let path = DocPath::progress(&self.user_id, course_id);
        match self.store.read(&path).await? {
            Some(value) => {
                let record =
                    serde_json::from_value(value).map_err(|e| ProgressError::Malformed {
                        path: path.as_str().to_string(),
                        message: e.to_string(),
                    })?;
                debug!(user = %self.user_id, course = course_id, "fetched progress");
                Ok(record)
            }
            None => Ok(ProgressRecord::default()),
        }
    }

    /// Records a chapter as completed for a course.
    ///
    /// Idempotent: returns `true` when the chapter was newly added, `false`
    /// when it was already complete (in which case nothing is written). The
    /// read-modify-write is safe because the current session is the only
    /// writer of this user's record.
    pub async fn mark_chapter_complete(
        &self,
        course_id: &str,
        chapter_id: &str,
    ) -> Result<bool> {
        let mut record = self.fetch(course_id).await?;
        if !record.completed_chapters.insert(chapter_id.to_string()) {
            return Ok(false);
        }
        record.updated_at = Some(Utc::now());

        let path = DocPath::progress(&self.user_id, course_id);
        let value = serde_json::to_value(&record).map_err(|e| ProgressError::Malformed {
            path: path.as_str().to_string(),
            message: e.to_string(),
        })?;
        self.store.write(&path, value).await?;

        info!(
            user = %self.user_id,
            course = course_id,
            chapter = chapter_id,
            completed = record.completed_count(),
            "chapter marked complete"
        );
        Ok(true)
    }
}

// ============================================================================
// Tests
// ============================================================================
