// src/model.rs

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::path::Path;

/// Hex-encoded object id of a commit
pub type CommitId = String;

/// Hex-encoded object id of a blob
pub type BlobId = String;

/// A commit as read from history
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub id: CommitId,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub time: DateTime<FixedOffset>,
    pub parents: Vec<CommitId>,
}

impl CommitInfo {
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// First line of the message, for log output
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// How a path changed between a commit and its first parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Deleted,
    Modified,
    Renamed,
    Other,
}

impl From<git2::Delta> for ChangeKind {
    fn from(delta: git2::Delta) -> Self {
        match delta {
            git2::Delta::Added => ChangeKind::Added,
            git2::Delta::Deleted => ChangeKind::Deleted,
            git2::Delta::Modified => ChangeKind::Modified,
            git2::Delta::Renamed => ChangeKind::Renamed,
            _ => ChangeKind::Other,
        }
    }
}

/// One changed path of a commit, diffed against the first parent
#[derive(Debug, Clone)]
pub struct FileChange {
    /// Path after the change; the old path for deletions
    pub path: String,
    pub old_path: Option<String>,
    pub kind: ChangeKind,
    pub old_blob: Option<BlobId>,
    pub new_blob: Option<BlobId>,
}

impl FileChange {
    /// Final path component, used to name the output files
    pub fn base_name(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.path)
    }

    /// Containing directory relative to the repository root, empty at top level
    pub fn relative_directory(&self) -> String {
        Path::new(&self.path)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Added and deleted line counts of one changed path
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineStats {
    pub added: usize,
    pub deleted: usize,
}

/// A row of `commit_info.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRow {
    pub commit_id: String,
    pub commit_message: String,
    pub file: String,
    pub relative_directory: String,
    pub lines_added: usize,
    pub lines_deleted: usize,
    pub change_type: ChangeKind,
    pub author_name: String,
    pub author_email: String,
    pub commit_date: String,
}

impl CommitRow {
    pub fn new(commit: &CommitInfo, change: &FileChange, stats: LineStats) -> Self {
        CommitRow {
            commit_id: commit.id.clone(),
            commit_message: commit.message.clone(),
            file: change.path.clone(),
            relative_directory: change.relative_directory(),
            lines_added: stats.added,
            lines_deleted: stats.deleted,
            change_type: change.kind,
            author_name: commit.author_name.clone(),
            author_email: commit.author_email.clone(),
            commit_date: commit.time.to_rfc3339(),
        }
    }
}

/// Counters reported at the end of a run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub commits_scanned: usize,
    pub commits_matched: usize,
    pub root_commits_skipped: usize,
    pub files_written: usize,
    pub binary_skipped: usize,
}
