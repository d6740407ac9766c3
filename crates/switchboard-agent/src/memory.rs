//! Memory system: the context store the orchestrator reads before each model
//! call and appends to after each dispatch branch.
//!
//! [`FileMemoryStore`] keeps memory as plain files in the workspace:
//! - **Long-term memory**: `workspace/memory/MEMORY.md`, curated facts and prefs
//! - **Daily notes**: `workspace/memory/YYYY-MM-DD.md`, one bullet per recorded entry
//!
//! [`InMemoryStore`] holds a fixed context and an ordered entry log; it backs
//! tests and offline runs.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use switchboard_core::error::{Collaborator, CollaboratorError, CollaboratorResult};
use switchboard_core::utils::{clock_time, today_date, truncate_string};

/// Maximum number of note lines returned as related context.
const MAX_RELATED_NOTES: usize = 20;

/// Query words shorter than this are too common to select notes by.
const MIN_KEYWORD_LEN: usize = 4;

// ─────────────────────────────────────────────
// ContextStore trait
// ─────────────────────────────────────────────

/// Source of per-query context and sink for memory entries.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Context text for `query`. Empty when nothing is known.
    async fn get_context(&self, query: &str) -> CollaboratorResult<String>;

    /// Record an entry. Entries are never read back within the same turn.
    async fn add_memory(&self, entry: &str) -> CollaboratorResult<()>;
}

fn io_unavailable(action: &str, path: &Path, e: std::io::Error) -> CollaboratorError {
    CollaboratorError::unavailable(
        Collaborator::ContextStore,
        format!("failed to {action} {}: {e}", path.display()),
    )
}

// ─────────────────────────────────────────────
// FileMemoryStore
// ─────────────────────────────────────────────

/// File-based memory store rooted at `workspace/memory/`.
pub struct FileMemoryStore {
    memory_dir: PathBuf,
    memory_file: PathBuf,
    /// Number of most recent daily note files searched for related notes.
    recent_days: usize,
    /// Upper bound on the context returned by `get_context`.
    max_context_chars: usize,
    /// Serializes appends to the daily notes file.
    write_lock: tokio::sync::Mutex<()>,
}

impl FileMemoryStore {
    /// Create a new memory store, creating the `memory/` directory if needed.
    pub fn new(workspace: &Path) -> std::io::Result<Self> {
        let memory_dir = workspace.join("memory");
        if !memory_dir.exists() {
            std::fs::create_dir_all(&memory_dir)?;
            debug!(dir = %memory_dir.display(), "created memory directory");
        }
        let memory_file = memory_dir.join("MEMORY.md");
        Ok(Self {
            memory_dir,
            memory_file,
            recent_days: 3,
            max_context_chars: 8000,
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Override how many days of notes are searched and the context size cap.
    pub fn with_limits(mut self, recent_days: usize, max_context_chars: usize) -> Self {
        self.recent_days = recent_days;
        self.max_context_chars = max_context_chars;
        self
    }

    // ────────────── Long-term memory ──────────────

    /// Read the long-term memory file. Returns empty string if absent.
    pub fn read_long_term(&self) -> String {
        std::fs::read_to_string(&self.memory_file).unwrap_or_default()
    }

    /// Overwrite the entire long-term memory file.
    pub fn write_long_term(&self, content: &str) -> std::io::Result<()> {
        self.ensure_dir()?;
        std::fs::write(&self.memory_file, content)
    }

    // ────────────── Daily notes ──────────────

    /// Path to today's daily notes file.
    pub fn today_file(&self) -> PathBuf {
        self.memory_dir.join(format!("{}.md", today_date()))
    }

    /// Read today's daily notes. Returns empty string if absent.
    pub fn read_today(&self) -> String {
        std::fs::read_to_string(self.today_file()).unwrap_or_default()
    }

    /// Append a line to today's notes, creating the file with a date header.
    fn append_today(&self, line: &str) -> std::io::Result<()> {
        use std::io::Write;

        self.ensure_dir()?;
        let path = self.today_file();
        let is_new = !path.exists();
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        if is_new {
            writeln!(file, "# {}\n", today_date())?;
        }
        writeln!(file, "{line}")
    }

    /// List daily note files, newest first.
    pub fn list_memory_files(&self) -> Vec<PathBuf> {
        let mut files = daily_note_files(&self.memory_dir);
        files.sort();
        files.reverse();
        files
    }

    // ────────────── Retrieval ──────────────

    /// Note lines from the recent daily files that share a keyword with `query`.
    pub fn related_notes(&self, query: &str) -> Vec<String> {
        let keywords = keywords(query);
        if keywords.is_empty() {
            return Vec::new();
        }

        self.list_memory_files()
            .into_iter()
            .take(self.recent_days)
            .filter_map(|f| std::fs::read_to_string(f).ok())
            .flat_map(|content| {
                content
                    .lines()
                    .rev()
                    .filter(|l| l.starts_with("- "))
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|line| {
                let lowered = line.to_lowercase();
                keywords.iter().any(|k| lowered.contains(k.as_str()))
            })
            .take(MAX_RELATED_NOTES)
            .collect()
    }

    /// Build the context string for `query`.
    ///
    /// Format:
    /// ```text
    /// ## Long-term Memory
    /// <content of MEMORY.md>
    ///
    /// ## Related Notes
    /// - [HH:MM:SS] ...
    /// ```
    pub fn memory_context(&self, query: &str) -> String {
        let mut sections = Vec::new();

        let long_term = self.read_long_term();
        if !long_term.trim().is_empty() {
            sections.push(format!("## Long-term Memory\n\n{}", long_term.trim()));
        }

        let related = self.related_notes(query);
        if !related.is_empty() {
            sections.push(format!("## Related Notes\n\n{}", related.join("\n")));
        }

        truncate_string(&sections.join("\n\n"), self.max_context_chars)
    }

    pub fn memory_dir(&self) -> &Path {
        &self.memory_dir
    }

    pub fn memory_file(&self) -> &Path {
        &self.memory_file
    }

    fn ensure_dir(&self) -> std::io::Result<()> {
        if !self.memory_dir.exists() {
            std::fs::create_dir_all(&self.memory_dir)?;
        }
        Ok(())
    }
}

#[async_trait]
impl ContextStore for FileMemoryStore {
    async fn get_context(&self, query: &str) -> CollaboratorResult<String> {
        if !self.memory_dir.exists() {
            return Err(CollaboratorError::unavailable(
                Collaborator::ContextStore,
                format!("memory directory missing: {}", self.memory_dir.display()),
            ));
        }
        let context = self.memory_context(query);
        debug!(context_len = context.len(), "memory context built");
        Ok(context)
    }

    async fn add_memory(&self, entry: &str) -> CollaboratorResult<()> {
        // One bullet per entry keeps notes line-addressable.
        let flattened = entry.split_whitespace().collect::<Vec<_>>().join(" ");
        let line = format!("- [{}] {}", clock_time(), flattened);

        let _guard = self.write_lock.lock().await;
        self.append_today(&line)
            .map_err(|e| io_unavailable("append to", &self.today_file(), e))?;
        debug!(entry_len = entry.len(), "memory entry recorded");
        Ok(())
    }
}

// ─────────────────────────────────────────────
// InMemoryStore
// ─────────────────────────────────────────────

/// A store with a fixed context and an in-process entry log.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    context: String,
    entries: Mutex<Vec<String>>,
}

impl InMemoryStore {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// All recorded entries, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ContextStore for InMemoryStore {
    async fn get_context(&self, _query: &str) -> CollaboratorResult<String> {
        Ok(self.context.clone())
    }

    async fn add_memory(&self, entry: &str) -> CollaboratorResult<()> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry.to_string());
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────

/// `YYYY-MM-DD.md` files in a directory.
fn daily_note_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            let name = p.file_name().and_then(|n| n.to_str()).unwrap_or("");
            is_daily_note_name(name.as_bytes())
        })
        .collect()
}

/// `YYYY-MM-DD.md`
fn is_daily_note_name(name: &[u8]) -> bool {
    name.len() == 13
        && name.ends_with(b".md")
        && name[4] == b'-'
        && name[7] == b'-'
        && [0, 1, 2, 3, 5, 6, 8, 9].iter().all(|&i| name[i].is_ascii_digit())
}

/// Distinct lowercase words of at least `MIN_KEYWORD_LEN` characters.
fn keywords(query: &str) -> Vec<String> {
    let mut words: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_KEYWORD_LEN)
        .map(str::to_lowercase)
        .collect();
    words.sort();
    words.dedup();
    words
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
