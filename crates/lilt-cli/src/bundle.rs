//! Course bundle loading.
//!
//! A bundle is one JSON file holding course documents with their nested
//! module and chapter documents, plus optional per-user progress. The CLI
//! seeds a [`MemoryStore`] from it so every command exercises the same
//! fetch path the app screens use.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use serde_json::{Map, Value};

use lilt_content::{DocPath, MemoryStore};

/// A parsed course bundle.
#[derive(Debug, Deserialize)]
pub struct Bundle {
    /// Courses with nested modules and chapters.
    #[serde(default)]
    pub courses: Vec<CourseEntry>,

    /// Per-user progress records.
    #[serde(default)]
    pub progress: Vec<ProgressEntry>,
}

/// One course document plus its nested modules.
#[derive(Debug, Deserialize)]
pub struct CourseEntry {
    /// Document id.
    pub id: String,

    /// Nested module entries.
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,

    /// The course document's own fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// One module document plus its nested chapters.
#[derive(Debug, Deserialize)]
pub struct ModuleEntry {
    /// Document id.
    pub id: String,

    /// Nested chapter entries.
    #[serde(default)]
    pub chapters: Vec<ChapterEntry>,

    /// The module document's own fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// One chapter document.
#[derive(Debug, Deserialize)]
pub struct ChapterEntry {
    /// Document id.
    pub id: String,

    /// The chapter document's own fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A user's completed chapters for one course.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    /// User id.
    pub user: String,

    /// Course id.
    pub course: String,

    /// Completed chapter ids.
    #[serde(default)]
    pub completed_chapters: Vec<String>,
}

/// Reads and parses a bundle file.
pub fn load(path: &Path) -> anyhow::Result<Bundle> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read bundle '{}'", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("bundle '{}' is not valid JSON", path.display()))
}

/// Seeds a store with every document in the bundle.
pub async fn seed(store: &MemoryStore, bundle: &Bundle) -> anyhow::Result<()> {
    use lilt_content::DocumentStore;

    for course in &bundle.courses {
        store
            .write(
                &DocPath::course(&course.id),
                Value::Object(course.fields.clone()),
            )
            .await?;
        for module in &course.modules {
            store
                .write(
                    &DocPath::module(&course.id, &module.id),
                    Value::Object(module.fields.clone()),
                )
                .await?;
            for chapter in &module.chapters {
                store
                    .write(
                        &DocPath::chapter(&course.id, &module.id, &chapter.id),
                        Value::Object(chapter.fields.clone()),
                    )
                    .await?;
            }
        }
    }

    for entry in &bundle.progress {
        store
            .write(
                &DocPath::progress(&entry.user, &entry.course),
                serde_json::json!({ "completedChapters": entry.completed_chapters }),
            )
            .await?;
    }

    Ok(())
}
