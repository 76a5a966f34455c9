// src/writer.rs

use crate::error::{ExtractError, Result};
use crate::model::CommitRow;
use std::fs;
use std::path::{Path, PathBuf};

pub const MESSAGE_FILE: &str = "commit_message.txt";
pub const TABLE_FILE: &str = "commit_info.csv";

/// Root directories receiving pre-images (buggy) and post-images (fixed)
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub buggy_root: PathBuf,
    pub fixed_root: PathBuf,
}

impl OutputLayout {
    pub fn new(buggy_root: impl Into<PathBuf>, fixed_root: impl Into<PathBuf>) -> Self {
        OutputLayout { buggy_root: buggy_root.into(), fixed_root: fixed_root.into() }
    }

    /// Creates (or reuses) the per-commit directory pair
    pub fn prepare(&self, commit_id: &str) -> Result<CommitOutput> {
        let output = CommitOutput {
            buggy_dir: self.buggy_root.join(commit_id),
            fixed_dir: self.fixed_root.join(commit_id),
        };
        create_dir(&output.buggy_dir)?;
        create_dir(&output.fixed_dir)?;
        Ok(output)
    }
}

/// Output directories of a single accepted commit
#[derive(Debug, Clone)]
pub struct CommitOutput {
    pub buggy_dir: PathBuf,
    pub fixed_dir: PathBuf,
}

impl CommitOutput {
    pub fn write_pair(&self, file_name: &str, before: &[u8], after: &[u8]) -> Result<()> {
        write_file(&self.buggy_dir.join(file_name), before)?;
        write_file(&self.fixed_dir.join(file_name), after)
    }

    pub fn write_message(&self, message: &str) -> Result<()> {
        write_file(&self.fixed_dir.join(MESSAGE_FILE), message.as_bytes())
    }

    /// Replaces the commit table with a header plus `rows`
    pub fn write_table(&self, rows: &[CommitRow]) -> Result<()> {
        let path = self.fixed_dir.join(TABLE_FILE);
        let mut writer = csv::Writer::from_path(&path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush().map_err(|e| ExtractError::io(&path, e))
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| ExtractError::io(path, e))
}

fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    fs::write(path, content).map_err(|e| ExtractError::io(path, e))
}
