//! Document store boundary.
//!
//! The hosted backend is reached through the narrow [`DocumentStore`] trait:
//! path-addressed reads of single documents, listings of a document's child
//! collection, and whole-document writes. Paths mirror the stored hierarchy
//! (`courses/{c}/modules/{m}/chapters/{ch}`, `users/{u}/progress/{c}`).
//! [`MemoryStore`] is the in-process implementation used by tests and the
//! CLI bundle loader.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

/// A specialized `Result` type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by a document store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend failed to serve the request.
    #[error("store backend error at '{path}': {message}")]
    Backend {
        /// Path of the failed operation.
        path: String,
        /// Backend-supplied description.
        message: String,
    },
}

impl StoreError {
    /// Creates a new `Backend` error.
    #[must_use]
    pub fn backend(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            path: path.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Paths
// ============================================================================

/// Path of a single document: alternating collection and document segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath {
    joined: String,
}

impl DocPath {
    /// Path of a course document.
    #[must_use]
    pub fn course(course_id: &str) -> Self {
        Self {
            joined: format!("courses/{course_id}"),
        }
    }

    /// Path of a module document within a course.
    #[must_use]
    pub fn module(course_id: &str, module_id: &str) -> Self {
        Self::course(course_id).child("modules", module_id)
    }

    /// Path of a chapter document within a module.
    #[must_use]
    pub fn chapter(course_id: &str, module_id: &str, chapter_id: &str) -> Self {
        Self::module(course_id, module_id).child("chapters", chapter_id)
    }

    /// Path of a user's progress document for one course.
    #[must_use]
    pub fn progress(user_id: &str, course_id: &str) -> Self {
        Self {
            joined: format!("users/{user_id}/progress/{course_id}"),
        }
    }

    /// Path of a document inside a child collection of this document.
    #[must_use]
    pub fn child(&self, collection: &str, document_id: &str) -> Self {
        Self {
            joined: format!("{}/{collection}/{document_id}", self.joined),
        }
    }

    /// Path of a child collection of this document.
    #[must_use]
    pub fn collection(&self, name: &str) -> CollectionPath {
        CollectionPath {
            joined: format!("{}/{name}", self.joined),
        }
    }

    /// The path as a `/`-joined string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.joined
    }
}

impl std::fmt::Display for DocPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.joined)
    }
}

/// Path of a collection of documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    joined: String,
}

impl CollectionPath {
    /// A top-level collection such as `courses`.
    #[must_use]
    pub fn root(name: &str) -> Self {
        Self {
            joined: name.to_string(),
        }
    }

    /// Path of a document inside this collection.
    #[must_use]
    pub fn doc(&self, document_id: &str) -> DocPath {
        DocPath {
            joined: format!("{}/{document_id}", self.joined),
        }
    }

    /// The path as a `/`-joined string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.joined
    }
}

impl std::fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.joined)
    }
}

// ============================================================================
// DocumentStore
// ============================================================================

/// Narrow asynchronous contract over the hosted document database.
///
/// An absent document is `Ok(None)`, not an error; callers decide whether
/// absence matters. Implementations must be safe to share behind an `Arc`
/// across view tasks.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads one document, returning its field map if present.
    async fn read(&self, path: &DocPath) -> Result<Option<Value>>;

    /// Lists the documents of a collection as `(id, fields)` pairs.
    ///
    /// An empty or absent collection is an empty list.
    async fn children(&self, collection: &CollectionPath) -> Result<Vec<(String, Value)>>;

    /// Writes a whole document, replacing any existing content at the path.
    async fn write(&self, path: &DocPath, document: Value) -> Result<()>;
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory [`DocumentStore`] keyed by path.
///
/// Lock discipline: the map mutex is only held across synchronous map
/// operations, never across an await point.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, path: &str) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Value>>> {
        self.documents
            .lock()
            .map_err(|_| StoreError::backend(path, "store lock poisoned"))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read(&self, path: &DocPath) -> Result<Option<Value>> {
        let documents = self.lock(path.as_str())?;
        Ok(documents.get(path.as_str()).cloned())
    }

    async fn children(&self, collection: &CollectionPath) -> Result<Vec<(String, Value)>> {
        let prefix = format!("{}/", collection.as_str());
        let documents = self.lock(collection.as_str())?;
        Ok(documents
            .iter()
            .filter_map(|(key, value)| {
                let rest = key.strip_prefix(&prefix)?;
                // Only direct children; deeper paths belong to subcollections.
                if rest.contains('/') {
                    return None;
                }
                Some((rest.to_string(), value.clone()))
            })
            .collect())
    }

    async fn write(&self, path: &DocPath, document: Value) -> Result<()> {
        let mut documents = self.lock(path.as_str())?;
        documents.insert(path.as_str().to_string(), document);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
