// src/extractor.rs

use crate::cli::BinaryPolicy;
use crate::error::{ExtractError, Result};
use crate::model::*;
use crate::repository::History;
use crate::writer::{CommitOutput, OutputLayout};
use indicatif::ProgressBar;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Case-insensitive substring match against commit messages
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    keywords: Vec<String>,
}

impl KeywordFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        KeywordFilter { keywords: keywords.into_iter().map(|k| k.as_ref().to_lowercase()).collect() }
    }

    pub fn matches(&self, message: &str) -> bool {
        let message = message.to_lowercase();
        self.keywords.iter().any(|k| message.contains(k.as_str()))
    }
}

/// Suffix match against changed paths
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    suffixes: Vec<String>,
}

impl ExtensionFilter {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExtensionFilter { suffixes: suffixes.into_iter().map(Into::into).collect() }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.suffixes.iter().any(|s| path.ends_with(s.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub write_message: bool,
    pub write_table: bool,
    pub binary: BinaryPolicy,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions { write_message: true, write_table: true, binary: BinaryPolicy::Skip }
    }
}

/// Walks a history and writes buggy/fixed file pairs for matching commits
pub struct Extractor<'a, H: History> {
    history: &'a H,
    keywords: KeywordFilter,
    extensions: ExtensionFilter,
    layout: OutputLayout,
    options: ExtractOptions,
    progress: ProgressBar,
}

impl<'a, H: History> Extractor<'a, H> {
    pub fn new(history: &'a H, keywords: KeywordFilter, extensions: ExtensionFilter, layout: OutputLayout) -> Self {
        Extractor {
            history,
            keywords,
            extensions,
            layout,
            options: ExtractOptions::default(),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn run(&self) -> Result<ExtractionSummary> {
        let mut summary = ExtractionSummary::default();
        self.progress.set_message("Scanning commits");

        for commit in self.history.commits()? {
            let commit = commit?;
            summary.commits_scanned += 1;
            self.progress.inc(1);

            if !self.keywords.matches(&commit.message) {
                continue;
            }
            summary.commits_matched += 1;

            if commit.is_root() {
                self.progress.suspend(|| debug!("Skipping root commit {}", commit.id));
                summary.root_commits_skipped += 1;
                continue;
            }

            self.progress.suspend(|| info!("Commit {}: {}", commit.id, commit.summary()));
            self.extract_commit(&commit, &mut summary)?;
        }

        self.progress.finish_with_message("Scan complete");
        Ok(summary)
    }

    fn extract_commit(&self, commit: &CommitInfo, summary: &mut ExtractionSummary) -> Result<()> {
        let output = self.layout.prepare(&commit.id)?;
        if self.options.write_message {
            output.write_message(&commit.message)?;
        }

        let mut rows = Vec::new();
        let mut written = HashSet::new();

        for change in self.history.changes(commit)? {
            if change.kind != ChangeKind::Modified || !self.extensions.matches(&change.path) {
                continue;
            }
            self.progress.suspend(|| debug!("Changed file {}", change.path));

            if !self.extract_change(commit, &change, &output)? {
                summary.binary_skipped += 1;
                continue;
            }

            if !written.insert(change.base_name().to_string()) {
                self.progress.suspend(|| {
                    warn!("{} overwrites an earlier file of the same name in commit {}", change.path, commit.id)
                });
            }
            summary.files_written += 1;

            if self.options.write_table {
                let stats = self.history.line_stats(&change)?;
                rows.push(CommitRow::new(commit, &change, stats));
            }
        }

        if !rows.is_empty() {
            output.write_table(&rows)?;
        }
        Ok(())
    }

    /// Writes the pre/post pair for one change; `false` when skipped as binary
    fn extract_change(&self, commit: &CommitInfo, change: &FileChange, output: &CommitOutput) -> Result<bool> {
        let before = self.read_side(change.old_blob.as_deref())?;
        let after = self.read_side(change.new_blob.as_deref())?;

        let is_text = std::str::from_utf8(&before).is_ok() && std::str::from_utf8(&after).is_ok();
        if !is_text {
            match self.options.binary {
                BinaryPolicy::Skip => {
                    self.progress.suspend(|| warn!("Skipping binary file {} in commit {}", change.path, commit.id));
                    return Ok(false);
                }
                BinaryPolicy::Fail => {
                    return Err(ExtractError::BinaryContent { commit: commit.id.clone(), path: change.path.clone() });
                }
                BinaryPolicy::Raw => {}
            }
        }

        output.write_pair(change.base_name(), &before, &after)?;
        Ok(true)
    }

    fn read_side(&self, blob: Option<&str>) -> Result<Vec<u8>> {
        match blob {
            Some(id) => self.history.read_blob(id),
            None => Ok(Vec::new()),
        }
    }
}
