//! Typed catalog reads over the document store.
//!
//! Each screen-level fetch maps to one function here: the course screen
//! aggregates modules with chapter counts, the module screen lists chapters
//! in order, the chapter screen resolves a single chapter's content, and the
//! home screen lists recently added courses. Failures are classified by
//! cause so the caller can render the affected section empty without
//! disturbing its neighbors.
//!
//! A [`FetchScope`] ties in-flight reads to the lifetime of the view that
//! started them: cancelling the scope makes every wrapped future resolve to
//! [`CatalogError::Cancelled`] instead of delivering data to a view that no
//! longer exists.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use futures::future::{try_join, try_join_all, AbortHandle, Abortable};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::model::{
    Chapter, ChapterDoc, ChapterKind, ChapterSummary, Course, CourseDoc, CourseSummary, Module,
    ModuleDoc, ModuleSummary,
};
use crate::store::{CollectionPath, DocPath, DocumentStore, StoreError};

/// How many entries the recent-courses list holds.
pub const RECENT_COURSES_LIMIT: usize = 5;

/// Errors classified by cause for catalog reads.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The addressed document does not exist.
    #[error("document not found: '{path}'")]
    Missing {
        /// Path of the absent document.
        path: String,
    },

    /// The document exists but does not decode into the expected shape.
    #[error("malformed document at '{path}': {message}")]
    Malformed {
        /// Path of the offending document.
        path: String,
        /// Decode failure description.
        message: String,
    },

    /// The owning view was torn down before the read completed.
    #[error("fetch cancelled")]
    Cancelled,

    /// The store backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CatalogError {
    fn missing(path: &DocPath) -> Self {
        Self::Missing {
            path: path.as_str().to_string(),
        }
    }
}

/// Decodes a raw document into `T`, attributing failures to `path`.
fn decode<T: DeserializeOwned>(path: &DocPath, value: Value) -> Result<T, CatalogError> {
    serde_json::from_value(value).map_err(|e| CatalogError::Malformed {
        path: path.as_str().to_string(),
        message: e.to_string(),
    })
}

/// Reads a document that is required to exist.
async fn read_required<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    path: &DocPath,
) -> Result<T, CatalogError> {
    match store.read(path).await? {
        Some(value) => decode(path, value),
        None => Err(CatalogError::missing(path)),
    }
}

// ============================================================================
// Catalog fetchers
// ============================================================================

/// Fetches a course with its modules in `moduleno` order.
///
/// Chapter counts are gathered per module concurrently, matching the course
/// screen's aggregation.
pub async fn fetch_course(
    store: &dyn DocumentStore,
    course_id: &str,
) -> Result<Course, CatalogError> {
    let course_path = DocPath::course(course_id);
    let doc: CourseDoc = read_required(store, &course_path).await?;

    let module_entries = store.children(&course_path.collection("modules")).await?;
    let mut modules = try_join_all(module_entries.into_iter().map(|(module_id, value)| {
        async move {
            let module_path = DocPath::module(course_id, &module_id);
            let module_doc: ModuleDoc = decode(&module_path, value)?;
            let chapters = store.children(&module_path.collection("chapters")).await?;
            Ok::<_, CatalogError>(ModuleSummary {
                id: module_id,
                moduleno: module_doc.moduleno,
                module_name: module_doc.module_name,
                kind: module_doc.kind,
                total_chapters: chapters.len(),
            })
        }
    }))
    .await?;
    modules.sort_by_key(|m| m.moduleno);

    debug!(course = course_id, modules = modules.len(), "fetched course");
    Ok(Course {
        id: course_id.to_string(),
        course_name: doc.course_name,
        thumbnail_url: doc.thumbnail_url,
        course_desc: doc.course_desc,
        tutor_name: doc.tutor_name,
        modules,
    })
}

/// Fetches a module with its chapters in `chapterno` order.
///
/// The module document and its chapter listing are independent reads joined
/// concurrently.
pub async fn fetch_module(
    store: &dyn DocumentStore,
    course_id: &str,
    module_id: &str,
) -> Result<Module, CatalogError> {
    let module_path = DocPath::module(course_id, module_id);
    let (doc, chapter_entries) = try_join(
        read_required::<ModuleDoc>(store, &module_path),
        async {
            store
                .children(&module_path.collection("chapters"))
                .await
                .map_err(CatalogError::from)
        },
    )
    .await?;

    let mut chapters = chapter_entries
        .into_iter()
        .map(|(chapter_id, value)| {
            let chapter_path = module_path.child("chapters", &chapter_id);
            let chapter_doc: ChapterDoc = decode(&chapter_path, value)?;
            Ok(ChapterSummary {
                id: chapter_id,
                chapterno: chapter_doc.chapterno,
                chapter_name: chapter_doc.chapter_name,
                kind: ChapterKind::from_tag(&chapter_doc.kind),
            })
        })
        .collect::<Result<Vec<_>, CatalogError>>()?;
    chapters.sort_by_key(|c| c.chapterno);

    debug!(
        course = course_id,
        module = module_id,
        chapters = chapters.len(),
        "fetched module"
    );
    Ok(Module {
        id: module_id.to_string(),
        moduleno: doc.moduleno,
        module_name: doc.module_name,
        chapters,
    })
}

/// Fetches one chapter and resolves its content payload.
pub async fn fetch_chapter(
    store: &dyn DocumentStore,
    course_id: &str,
    module_id: &str,
    chapter_id: &str,
) -> Result<Chapter, CatalogError> {
    let path = DocPath::chapter(course_id, module_id, chapter_id);
    let doc: ChapterDoc = read_required(store, &path).await?;
    debug!(chapter = chapter_id, kind = %doc.kind, "fetched chapter");
    Ok(Chapter::from_doc(chapter_id, doc))
}

/// Fetches the most recently added courses, newest first.
///
/// Courses without an `addedDate` sort last. The result is capped at
/// `limit` entries.
pub async fn fetch_recent_courses(
    store: &dyn DocumentStore,
    limit: usize,
) -> Result<Vec<CourseSummary>, CatalogError> {
    let courses = CollectionPath::root("courses");
    let entries = store.children(&courses).await?;

    let mut summaries = entries
        .into_iter()
        .map(|(course_id, value)| {
            let path = courses.doc(&course_id);
            let doc: CourseDoc = decode(&path, value)?;
            Ok(CourseSummary {
                id: course_id,
                course_name: doc.course_name,
                thumbnail_url: doc.thumbnail_url,
                added_date: doc.added_date,
            })
        })
        .collect::<Result<Vec<_>, CatalogError>>()?;

    summaries.sort_by(|a, b| b.added_date.cmp(&a.added_date));
    summaries.truncate(limit);
    Ok(summaries)
}

// ============================================================================
// FetchScope
// ============================================================================

/// Cancellation scope for a view's in-flight reads.
///
/// The view glue owns a scope and runs every fetch through it. On teardown
/// (explicit [`FetchScope::cancel`] or drop), wrapped futures resolve to
/// [`CatalogError::Cancelled`] and their results never reach the departed
/// view.
///
/// # Examples
///
/// ```
/// use lilt_content::{CatalogError, FetchScope};
///
/// let scope = FetchScope::new();
/// let value = futures::executor::block_on(
///     scope.run(async { Ok::<_, CatalogError>(21) }),
/// );
/// assert_eq!(value.ok(), Some(21));
///
/// scope.cancel();
/// let after = futures::executor::block_on(
///     scope.run(async { Ok::<_, CatalogError>(21) }),
/// );
/// assert!(matches!(after, Err(CatalogError::Cancelled)));
/// ```
#[derive(Debug, Default)]
pub struct FetchScope {
    handles: Mutex<Vec<AbortHandle>>,
    cancelled: AtomicBool,
}

impl FetchScope {
    /// Creates a live scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs a fetch future under this scope.
    ///
    /// Returns [`CatalogError::Cancelled`] if the scope was already
    /// cancelled, or becomes cancelled while the future is in flight.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, CatalogError>
    where
        F: Future<Output = Result<T, CatalogError>>,
    {
        if self.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }

        let (handle, registration) = AbortHandle::new_pair();
        if let Ok(mut handles) = self.handles.lock() {
            handles.push(handle);
        }

        match Abortable::new(fut, registration).await {
            Ok(result) => result,
            Err(_aborted) => Err(CatalogError::Cancelled),
        }
    }

    /// Cancels the scope: aborts in-flight reads and refuses new ones.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Ok(mut handles) = self.handles.lock() {
            for handle in handles.drain(..) {
                handle.abort();
            }
        }
    }

    /// Returns `true` once the scope has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for FetchScope {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ============================================================================
// Tests
// ============================================================================
