//! LILT CLI
//!
//! Works with course bundles offline: validates chapter content, prints a
//! course outline with completion badges, and records chapter completion.
//! Every command seeds an in-memory document store from the bundle and goes
//! through the same fetch layer the app screens use.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use lilt_content::{
    fetch_chapter, fetch_course, fetch_module, Course, FetchScope, MemoryStore, Module,
};
use lilt_engine::ScreenContent;
use lilt_progress::{ProgressRecord, ProgressTracker};
use tracing_subscriber::EnvFilter;

mod bundle;

/// LILT - Course Bundle Tool
///
/// Inspects and validates LILT course bundles: the JSON document sets that
/// back the learning app's course, module, and chapter screens.
#[derive(Parser, Debug)]
#[command(name = "lilt")]
#[command(version, about, long_about = None)]
struct Args {
    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check every chapter in a bundle for content gaps and quiz defects
    Validate {
        /// Path to the bundle JSON file
        #[arg(value_name = "BUNDLE")]
        bundle: PathBuf,
    },

    /// Print a course outline with completion badges
    Outline {
        /// Path to the bundle JSON file
        #[arg(value_name = "BUNDLE")]
        bundle: PathBuf,

        /// Course id (defaults to the bundle's first course)
        #[arg(short, long)]
        course: Option<String>,

        /// User whose progress to overlay
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Mark a chapter complete for a user and print the updated percentage
    Complete {
        /// Path to the bundle JSON file
        #[arg(value_name = "BUNDLE")]
        bundle: PathBuf,

        /// User id
        #[arg(long)]
        user: String,

        /// Course id
        #[arg(long)]
        course: String,

        /// Chapter id
        #[arg(long)]
        chapter: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(args.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(command: Command) -> anyhow::Result<ExitCode> {
    match command {
        Command::Validate { bundle } => validate(&bundle).await,
        Command::Outline {
            bundle,
            course,
            user,
        } => outline(&bundle, course.as_deref(), user.as_deref()).await,
        Command::Complete {
            bundle,
            user,
            course,
            chapter,
        } => complete(&bundle, &user, &course, &chapter).await,
    }
}

/// Loads a bundle and seeds a fresh in-memory store from it.
async fn open_store(path: &std::path::Path) -> anyhow::Result<(MemoryStore, bundle::Bundle)> {
    let parsed = bundle::load(path)?;
    let store = MemoryStore::new();
    bundle::seed(&store, &parsed).await?;
    Ok((store, parsed))
}

// ============================================================================
// validate
// ============================================================================

async fn validate(path: &std::path::Path) -> anyhow::Result<ExitCode> {
    let (store, parsed) = open_store(path).await?;
    let mut findings = 0usize;

    for course_entry in &parsed.courses {
        let course = fetch_course(&store, &course_entry.id).await?;
        println!("course {} ({})", course.id, course.course_name);

        for module_entry in &course_entry.modules {
            let module = fetch_module(&store, &course.id, &module_entry.id).await?;
            for summary in &module.chapters {
                match fetch_chapter(&store, &course.id, &module.id, &summary.id).await {
                    Ok(chapter) => {
                        for finding in chapter.lint() {
                            findings += 1;
                            println!(
                                "  {}/{}/{}: {finding}",
                                module.id, chapter.id, chapter.chapter_name
                            );
                        }
                    }
                    Err(e) => {
                        findings += 1;
                        println!("  {}/{}: {e}", module.id, summary.id);
                    }
                }
            }
        }
    }

    if findings == 0 {
        println!("No content findings.");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{findings} content finding(s).");
        Ok(ExitCode::from(1))
    }
}

// ============================================================================
// outline
// ============================================================================

async fn outline(
    path: &std::path::Path,
    course_id: Option<&str>,
    user_id: Option<&str>,
) -> anyhow::Result<ExitCode> {
    let (store, parsed) = open_store(path).await?;
    let course_id = match course_id {
        Some(id) => id.to_string(),
        None => parsed
            .courses
            .first()
            .map(|c| c.id.clone())
            .ok_or_else(|| anyhow::anyhow!("bundle contains no courses"))?,
    };

    // The outline is one screen visit: its fetches share a scope, the way a
    // view ties reads to its own lifetime.
    let scope = FetchScope::new();
    let course = scope.run(fetch_course(&store, &course_id)).await?;

    let store: Arc<dyn lilt_content::DocumentStore> = Arc::new(store);
    // A progress failure only costs the badges; the outline still renders.
    let record = match user_id {
        Some(user) => {
            let tracker = ProgressTracker::new(Arc::clone(&store), user);
            match tracker.fetch(&course.id).await {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, "progress unavailable, rendering without badges");
                    None
                }
            }
        }
        None => None,
    };

    print_course_header(&course, record.as_ref());
    for module_summary in &course.modules {
        let module = scope
            .run(fetch_module(store.as_ref(), &course.id, &module_summary.id))
            .await?;
        print_module(&module, record.as_ref());
    }

    Ok(ExitCode::SUCCESS)
}

fn print_course_header(course: &Course, record: Option<&ProgressRecord>) {
    match record {
        Some(record) => println!(
            "{} by {} ({}% complete)",
            course.course_name,
            course.tutor_name,
            record.completion(course.total_chapters())
        ),
        None => println!("{} by {}", course.course_name, course.tutor_name),
    }
}

fn print_module(module: &Module, record: Option<&ProgressRecord>) {
    println!(
        "  {}. {} [{} chapters]",
        module.moduleno,
        module.module_name,
        module.chapters.len()
    );
    for chapter in &module.chapters {
        let kind = chapter
            .kind
            .map_or_else(|| "unknown".to_string(), |k| k.to_string());
        let badge = record
            .is_some_and(|r| r.is_chapter_complete(&chapter.id))
            .then_some(" *")
            .unwrap_or("");
        println!(
            "     {}. {} ({kind}){badge}",
            chapter.chapterno, chapter.chapter_name
        );
    }
}

// ============================================================================
// complete
// ============================================================================

async fn complete(
    path: &std::path::Path,
    user_id: &str,
    course_id: &str,
    chapter_id: &str,
) -> anyhow::Result<ExitCode> {
    let (store, _parsed) = open_store(path).await?;

    // Refuse ids the bundle doesn't know; completion badges should never
    // reference phantom chapters.
    let course = fetch_course(&store, course_id).await?;
    let mut chapter_known = false;
    for module_summary in &course.modules {
        let module = fetch_module(&store, course_id, &module_summary.id).await?;
        if let Some(summary) = module.chapters.iter().find(|c| c.id == chapter_id) {
            chapter_known = true;
            let chapter = fetch_chapter(&store, course_id, &module.id, &summary.id).await?;
            let handler = ScreenContent::for_chapter(&chapter);
            tracing::debug!(chapter = chapter_id, handler = handler.label(), "completing");
            break;
        }
    }
    anyhow::ensure!(
        chapter_known,
        "chapter '{chapter_id}' is not part of course '{course_id}'"
    );

    let store: Arc<dyn lilt_content::DocumentStore> = Arc::new(store);
    let tracker = ProgressTracker::new(Arc::clone(&store), user_id);
    let newly = tracker.mark_chapter_complete(course_id, chapter_id).await?;
    let record = tracker.fetch(course_id).await?;

    if newly {
        println!(
            "Marked {chapter_id} complete. {} now {}% complete for {user_id}.",
            course.course_name,
            record.completion(course.total_chapters())
        );
    } else {
        println!(
            "{chapter_id} was already complete. {} remains {}% complete for {user_id}.",
            course.course_name,
            record.completion(course.total_chapters())
        );
    }
    Ok(ExitCode::SUCCESS)
}
