// src/test_support.rs

use git2::{Oid, Repository, Signature, Time};
use std::cell::Cell;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Scratch repository with deterministic authors and commit times
pub struct Fixture {
    dir: TempDir,
    repo: Repository,
    clock: Cell<i64>,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        Fixture { dir, repo, clock: Cell::new(1_700_000_000) }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes (`Some`) or deletes (`None`) the given files and commits them on HEAD.
    pub fn commit(&self, message: &str, files: &[(&str, Option<&str>)]) -> Oid {
        let files: Vec<(&str, Option<&[u8]>)> = files.iter().map(|(p, c)| (*p, c.map(str::as_bytes))).collect();
        self.commit_bytes(message, &files)
    }

    pub fn commit_bytes(&self, message: &str, files: &[(&str, Option<&[u8]>)]) -> Oid {
        self.record(Some("HEAD"), None, message, files)
    }

    /// Commits on top of HEAD without moving it, as on a side branch.
    ///
    /// The files stay staged; later commits overwrite them path by path.
    pub fn commit_aside(&self, message: &str, files: &[(&str, Option<&str>)]) -> Oid {
        let files: Vec<(&str, Option<&[u8]>)> = files.iter().map(|(p, c)| (*p, c.map(str::as_bytes))).collect();
        self.record(None, None, message, &files)
    }

    /// Commits a merge of HEAD (first parent) and `other` (second parent).
    pub fn merge(&self, message: &str, other: Oid, files: &[(&str, Option<&str>)]) -> Oid {
        let files: Vec<(&str, Option<&[u8]>)> = files.iter().map(|(p, c)| (*p, c.map(str::as_bytes))).collect();
        self.record(Some("HEAD"), Some(other), message, &files)
    }

    fn record(&self, update_ref: Option<&str>, other: Option<Oid>, message: &str, files: &[(&str, Option<&[u8]>)]) -> Oid {
        let mut index = self.repo.index().unwrap();
        for (path, content) in files {
            let full = self.dir.path().join(path);
            match content {
                Some(bytes) => {
                    fs::create_dir_all(full.parent().unwrap()).unwrap();
                    fs::write(&full, bytes).unwrap();
                    index.add_path(Path::new(path)).unwrap();
                }
                None => {
                    fs::remove_file(&full).unwrap();
                    index.remove_path(Path::new(path)).unwrap();
                }
            }
        }
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();

        let seconds = self.clock.get();
        self.clock.set(seconds + 60);
        let signature = Signature::new("Ada Lovelace", "ada@example.com", &Time::new(seconds, 0)).unwrap();

        let head = self.repo.head().ok().and_then(|head| head.peel_to_commit().ok());
        let other = other.map(|oid| self.repo.find_commit(oid).unwrap());
        let parents: Vec<&git2::Commit> = head.iter().chain(other.iter()).collect();
        self.repo.commit(update_ref, &signature, &signature, message, &tree, &parents).unwrap()
    }
}
