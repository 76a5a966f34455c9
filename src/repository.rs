// src/repository.rs

use crate::error::{ExtractError, Result};
use crate::model::*;
use chrono::{DateTime, FixedOffset, TimeZone};
use git2::build::RepoBuilder;
use git2::{
    Blob, Commit, Cred, CredentialType, DiffFindOptions, DiffOptions, FetchOptions, Oid, Patch, RemoteCallbacks,
    Repository,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Read access to a commit history.
///
/// `commits` must yield the same sequence every time it is called on an
/// unchanged history, so a run can be repeated with identical output.
pub trait History {
    /// All commits reachable from HEAD, newest first
    fn commits(&self) -> Result<Box<dyn Iterator<Item = Result<CommitInfo>> + '_>>;

    /// Changed paths between `commit` and its first parent; empty for root commits
    fn changes(&self, commit: &CommitInfo) -> Result<Vec<FileChange>>;

    /// Raw content of a blob
    fn read_blob(&self, id: &str) -> Result<Vec<u8>>;

    /// Line counts between the pre- and post-image of `change`
    fn line_stats(&self, change: &FileChange) -> Result<LineStats>;
}

/// Credential requests answered before a clone gives up
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// `History` backed by a libgit2 repository
pub struct GitHistory {
    repo: Repository,
}

impl GitHistory {
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::open(path)?;
        info!("Opened repository at {}", path.display());
        Ok(GitHistory { repo })
    }

    /// Opens a local path, or clones a remote URL into `clone_dir` unless a
    /// clone with the same name is already there.
    pub fn resolve(reference: &str, clone_dir: &Path) -> Result<Self> {
        if !is_remote(reference) {
            return Self::open(Path::new(reference));
        }

        let target = clone_target(reference, clone_dir)?;
        if target.exists() {
            info!("Reusing existing clone at {}", target.display());
            return Self::open(&target);
        }

        info!("Cloning {} into {}", reference, target.display());
        let mut attempts = 0;
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |_url, username, allowed| {
            attempts += 1;
            clone_credentials(attempts, username, allowed)
        });
        let mut fetch_opts = FetchOptions::new();
        fetch_opts.remote_callbacks(callbacks);

        let repo = RepoBuilder::new().fetch_options(fetch_opts).clone(reference, &target)?;
        Ok(GitHistory { repo })
    }

    fn find_blob(&self, id: &str) -> Result<Blob<'_>> {
        Ok(self.repo.find_blob(Oid::from_str(id)?)?)
    }
}

/// Answers a transport's credential request: SSH keys come from the agent
fn clone_credentials(
    attempt: usize,
    username: Option<&str>,
    allowed: CredentialType,
) -> std::result::Result<Cred, git2::Error> {
    if attempt > MAX_CREDENTIAL_ATTEMPTS {
        return Err(git2::Error::from_str("authentication failed"));
    }
    if allowed.contains(CredentialType::USERNAME) {
        return Cred::username(username.unwrap_or("git"));
    }
    if allowed.contains(CredentialType::SSH_KEY) {
        return Cred::ssh_key_from_agent(username.unwrap_or("git"));
    }
    if allowed.contains(CredentialType::DEFAULT) {
        return Cred::default();
    }
    Err(git2::Error::from_str("no supported credential type offered"))
}

impl History for GitHistory {
    fn commits(&self) -> Result<Box<dyn Iterator<Item = Result<CommitInfo>> + '_>> {
        if self.repo.is_empty()? {
            debug!("Repository has no commits");
            return Ok(Box::new(std::iter::empty()));
        }

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(git2::Sort::TIME)?;

        Ok(Box::new(revwalk.map(move |oid| -> Result<CommitInfo> {
            let commit = self.repo.find_commit(oid?)?;
            commit_info(&commit)
        })))
    }

    fn changes(&self, info: &CommitInfo) -> Result<Vec<FileChange>> {
        if info.is_root() {
            return Ok(Vec::new());
        }

        let commit = self.repo.find_commit(Oid::from_str(&info.id)?)?;
        let current_tree = commit.tree()?;
        let parent_tree = commit.parent(0)?.tree()?;

        let mut diff_opts = DiffOptions::new();
        diff_opts.include_untracked(false);
        diff_opts.ignore_filemode(true);

        let mut diff = self.repo.diff_tree_to_tree(Some(&parent_tree), Some(&current_tree), Some(&mut diff_opts))?;
        diff.find_similar(Some(DiffFindOptions::new().renames(true)))?;

        let mut changes = Vec::with_capacity(diff.deltas().len());
        for idx in 0..diff.deltas().len() {
            let Some(delta) = diff.get_delta(idx) else { continue };

            let old_path = delta.old_file().path().map(|p| p.to_string_lossy().into_owned());
            let new_path = delta.new_file().path().map(|p| p.to_string_lossy().into_owned());
            let Some(path) = new_path.or_else(|| old_path.clone()) else { continue };

            changes.push(FileChange {
                path,
                old_path,
                kind: delta.status().into(),
                old_blob: blob_id(delta.old_file().id()),
                new_blob: blob_id(delta.new_file().id()),
            });
        }

        Ok(changes)
    }

    fn read_blob(&self, id: &str) -> Result<Vec<u8>> {
        Ok(self.find_blob(id)?.content().to_vec())
    }

    fn line_stats(&self, change: &FileChange) -> Result<LineStats> {
        let old = change.old_blob.as_deref().map(|id| self.find_blob(id)).transpose()?;
        let new = change.new_blob.as_deref().map(|id| self.find_blob(id)).transpose()?;

        let patch = match (&old, &new) {
            (Some(old), Some(new)) => Patch::from_blobs(old, None, new, None, None)?,
            (Some(old), None) => Patch::from_blob_and_buffer(old, None, &[], None, None)?,
            (None, Some(new)) => Patch::from_buffers(&[], None, new.content(), None, None)?,
            (None, None) => return Ok(LineStats::default()),
        };
        let (_, added, deleted) = patch.line_stats()?;
        Ok(LineStats { added, deleted })
    }
}

fn blob_id(oid: Oid) -> Option<BlobId> {
    (!oid.is_zero()).then(|| oid.to_string())
}

fn commit_info(commit: &Commit) -> Result<CommitInfo> {
    let id = commit.id().to_string();
    let author = commit.author();
    let time = commit_time(commit.time()).ok_or_else(|| ExtractError::Time { commit: id.clone() })?;

    Ok(CommitInfo {
        message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
        author_name: author.name().unwrap_or("Unknown").to_string(),
        author_email: author.email().unwrap_or("").to_string(),
        time,
        parents: commit.parent_ids().map(|p| p.to_string()).collect(),
        id,
    })
}

fn commit_time(time: git2::Time) -> Option<DateTime<FixedOffset>> {
    FixedOffset::east_opt(time.offset_minutes() * 60)?
        .timestamp_opt(time.seconds(), 0)
        .single()
}

/// Whether a repository reference names a remote rather than a local path
pub fn is_remote(reference: &str) -> bool {
    ["http://", "https://", "ssh://", "git://", "git@"]
        .iter()
        .any(|scheme| reference.starts_with(scheme))
}

/// Local directory a remote reference is cloned into: its last path segment
pub fn clone_target(reference: &str, clone_dir: &Path) -> Result<PathBuf> {
    reference
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .filter(|name| !name.is_empty())
        .map(|name| clone_dir.join(name))
        .ok_or_else(|| ExtractError::Config(format!("cannot derive a clone directory from {reference}")))
}
