//! LILT Course Content
//!
//! Data model and storage boundary for the LILT learning platform: courses,
//! modules, chapters with their variant-specific payloads, the document-store
//! abstraction the app reads them through, and a small read-through cache for
//! the recent-courses list.

pub mod cache;
pub mod fetch;
pub mod model;
pub mod store;

pub use cache::{recent_courses, LocalCache, MemoryCache, RECENT_COURSES_KEY};
pub use fetch::{
    fetch_chapter, fetch_course, fetch_module, fetch_recent_courses, CatalogError, FetchScope,
    RECENT_COURSES_LIMIT,
};
pub use model::{
    AnswerArea, AnswerOption, Chapter, ChapterContent, ChapterDoc, ChapterKind, ChapterSummary,
    ContentFinding, ContentGap, Course, CourseDoc, CourseSummary, DetailsDoc, GapReason, Module,
    ModuleDoc, ModuleSummary, Question,
};
pub use store::{CollectionPath, DocPath, DocumentStore, MemoryStore, StoreError};
