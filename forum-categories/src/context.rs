//! CategoryContext - file-backed category storage
//!
//! The whole category table lives in one JSON document so that a reorder can
//! be committed with a single atomic rename. Commits are serialized through an
//! exclusive lock file.

use crate::config::{EngineConfig, DEFAULT_LOCK_TIMEOUT_MS};
use crate::error::{CategoryError, Result};
use crate::store::{CategoryStore, CommitReceipt, RankPlan, Snapshot};
use crate::types::{Category, LogEntry};
use async_trait::async_trait;
use fs2::FileExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, trace};

/// Interval between lock attempts while waiting
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Context giving access to the category store on disk
pub struct CategoryContext {
    /// Path to the store directory
    root: PathBuf,
    lock_timeout: Duration,
}

impl CategoryContext {
    /// Create a new context for the given store directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            lock_timeout: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
        }
    }

    /// Create a context that takes its lock timeout from `config`
    pub fn from_config(root: impl Into<PathBuf>, config: &EngineConfig) -> Self {
        Self::new(root).with_lock_timeout(Duration::from_millis(config.lock_timeout_ms))
    }

    /// How long a commit waits for the lock before giving up
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }

    // =========================================================================
    // Path helpers
    // =========================================================================

    /// Get the store directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to categories.json
    pub fn table_path(&self) -> PathBuf {
        self.root.join("categories.json")
    }

    /// Path to the activity directory
    pub fn activity_dir(&self) -> PathBuf {
        self.root.join("activity")
    }

    /// Path to the current activity log
    pub fn activity_path(&self) -> PathBuf {
        self.root.join("activity").join("current.jsonl")
    }

    /// Path to the lock file
    pub fn lock_path(&self) -> PathBuf {
        self.root.join(".lock")
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Check if the store is initialized
    pub fn is_initialized(&self) -> bool {
        self.table_path().exists()
    }

    /// Create the directory structure. Idempotent.
    pub async fn create_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        fs::create_dir_all(self.activity_dir()).await?;
        Ok(())
    }

    /// Create the store with an initial set of categories, replacing any
    /// existing table
    pub async fn init(&self, categories: Vec<Category>) -> Result<()> {
        self.create_directories().await?;
        let count = categories.len();
        self.write_snapshot(&Snapshot::new(categories)).await?;
        info!(root = %self.root.display(), categories = count, "initialized category store");
        Ok(())
    }

    // =========================================================================
    // Table I/O
    // =========================================================================

    /// Read the category table
    pub async fn read_snapshot(&self) -> Result<Snapshot> {
        let path = self.table_path();
        if !path.exists() {
            return Err(CategoryError::NotInitialized {
                path: self.root.clone(),
            });
        }

        let content = fs::read_to_string(&path).await?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        trace!(categories = snapshot.categories.len(), "read category table");
        Ok(snapshot)
    }

    /// Write the category table (atomic write via temp file)
    pub async fn write_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let content = serde_json::to_string_pretty(snapshot)?;
        atomic_write(&self.table_path(), content.as_bytes()).await
    }

    // =========================================================================
    // Activity logging
    // =========================================================================

    /// Read activity log entries, newest first. Lines that no longer parse
    /// are skipped.
    pub async fn read_activity(&self, limit: Option<usize>) -> Result<Vec<LogEntry>> {
        let content = match fs::read_to_string(self.activity_path()).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(content
            .lines()
            .rev()
            .filter_map(|line| serde_json::from_str(line).ok())
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }

    // =========================================================================
    // Locking
    // =========================================================================

    /// Try to acquire the commit lock without waiting
    pub async fn lock(&self) -> Result<CategoryLock> {
        self.try_lock().await?.ok_or(CategoryError::LockBusy)
    }

    /// Acquire the commit lock, polling until the configured timeout
    pub async fn lock_with_timeout(&self) -> Result<CategoryLock> {
        let start = Instant::now();
        loop {
            if let Some(lock) = self.try_lock().await? {
                return Ok(lock);
            }
            if start.elapsed() >= self.lock_timeout {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                debug!(elapsed_ms, "gave up waiting for the category lock");
                return Err(CategoryError::LockTimeout { elapsed_ms });
            }
            tokio::time::sleep(LOCK_POLL_INTERVAL).await;
        }
    }

    /// `None` when another holder has the lock
    async fn try_lock(&self) -> Result<Option<CategoryLock>> {
        let path = self.lock_path();
        ensure_parent(&path).await?;

        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)?;
        Ok(file.try_lock_exclusive().ok().map(|()| CategoryLock { file }))
    }
}

#[async_trait]
impl CategoryStore for CategoryContext {
    async fn load(&self) -> Result<Snapshot> {
        self.read_snapshot().await
    }

    async fn commit_ranks(&self, plan: &RankPlan) -> Result<CommitReceipt> {
        let _lock = self.lock_with_timeout().await?;

        // Re-read under the lock; the caller validated against an older copy
        let mut snapshot = self.read_snapshot().await?;
        let receipt = snapshot.apply(plan)?;
        self.write_snapshot(&snapshot).await?;

        debug!(
            updated = receipt.updated,
            groups = receipt.versions.len(),
            "committed category ranks"
        );
        Ok(receipt)
    }

    async fn append_activity(&self, entry: &LogEntry) -> Result<()> {
        let path = self.activity_path();
        ensure_parent(&path).await?;

        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

/// RAII lock guard - releases on drop
pub struct CategoryLock {
    file: std::fs::File,
}

impl Drop for CategoryLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

async fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    Ok(())
}

/// Replace `path` with `content` so readers see the old or the new table,
/// never a partial one
async fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    ensure_parent(path).await?;

    let staged = path.with_extension("json.tmp");
    fs::write(&staged, content).await?;
    fs::rename(&staged, path).await?;
    Ok(())
}
