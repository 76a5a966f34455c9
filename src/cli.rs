// src/cli.rs

use crate::error::{ExtractError, Result};
use crate::extractor::{ExtensionFilter, ExtractOptions, KeywordFilter};
use crate::writer::OutputLayout;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Extract buggy/fixed file pairs from commits matching keywords", long_about = None)]
pub struct Args {
    /// Path to the local git repository or URL of a remote one
    #[arg(short, long = "repo_path", alias = "repo-path")]
    pub repo_path: String,

    /// Comma-separated keywords to search for in commit messages (case-insensitive)
    #[arg(short, long)]
    pub keywords: String,

    /// Comma-separated file suffixes to extract, e.g. `.py,.java`
    #[arg(short = 'e', long = "file_extensions", aliases = ["file_extension", "file-extensions"])]
    pub file_extensions: String,

    /// Directory receiving pre-change file content [default: <install dir>/bugs]
    #[arg(short, long = "buggy_dir", alias = "buggy-dir")]
    pub buggy_dir: Option<PathBuf>,

    /// Directory receiving post-change file content [default: <install dir>/fixes]
    #[arg(short, long = "fixed_dir", alias = "fixed-dir")]
    pub fixed_dir: Option<PathBuf>,

    /// Directory remote repositories are cloned into
    #[arg(long = "clone_dir", alias = "clone-dir", default_value = ".")]
    pub clone_dir: PathBuf,

    /// Handling of files whose content is not UTF-8 text
    #[arg(long, value_enum, default_value_t = BinaryPolicy::Skip)]
    pub binary: BinaryPolicy,

    /// Do not write commit_message.txt
    #[arg(long = "no_message", alias = "no-message")]
    pub no_message: bool,

    /// Do not write commit_info.csv
    #[arg(long = "no_csv", alias = "no-csv")]
    pub no_csv: bool,

    /// Log every changed file
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, Copy, Default, PartialEq, Eq)]
pub enum BinaryPolicy {
    /// Leave the file out and keep going
    #[default]
    Skip,
    /// Abort the run
    Fail,
    /// Write the bytes unchanged
    Raw,
}

/// Fully resolved settings of a run
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub repo: String,
    pub clone_dir: PathBuf,
    pub keywords: KeywordFilter,
    pub extensions: ExtensionFilter,
    pub layout: OutputLayout,
    pub options: ExtractOptions,
}

impl Args {
    pub fn resolve(&self) -> Result<ExtractConfig> {
        let keywords = split_list(&self.keywords);
        if keywords.is_empty() {
            return Err(ExtractError::Config("no keywords given".into()));
        }
        let extensions = split_list(&self.file_extensions);
        if extensions.is_empty() {
            return Err(ExtractError::Config("no file extensions given".into()));
        }

        let buggy_root = match &self.buggy_dir {
            Some(dir) => dir.clone(),
            None => install_dir()?.join("bugs"),
        };
        let fixed_root = match &self.fixed_dir {
            Some(dir) => dir.clone(),
            None => install_dir()?.join("fixes"),
        };

        Ok(ExtractConfig {
            repo: self.repo_path.clone(),
            clone_dir: self.clone_dir.clone(),
            keywords: KeywordFilter::new(&keywords),
            extensions: ExtensionFilter::new(extensions),
            layout: OutputLayout::new(buggy_root, fixed_root),
            options: ExtractOptions {
                write_message: !self.no_message,
                write_table: !self.no_csv,
                binary: self.binary,
            },
        })
    }
}

/// Splits a comma-separated list, dropping blank entries
fn split_list(list: &str) -> Vec<String> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}

/// Directory holding the running executable
fn install_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().map_err(|e| ExtractError::Config(format!("cannot locate executable: {e}")))?;
    exe.parent()
        .map(PathBuf::from)
        .ok_or_else(|| ExtractError::Config(format!("{} has no parent directory", exe.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("git-bugmine").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn short_flags_match_long_names() {
        let args = parse(&["-r", "repo", "-k", "fix,bug", "-e", ".py", "-b", "out/b", "-f", "out/f"]);
        assert_eq!(args.repo_path, "repo");
        assert_eq!(args.buggy_dir, Some(PathBuf::from("out/b")));
        assert_eq!(args.fixed_dir, Some(PathBuf::from("out/f")));
        assert_eq!(args.binary, BinaryPolicy::Skip);
    }

    #[test]
    fn singular_extension_flag_is_accepted() {
        let args = parse(&["--repo_path", "repo", "--keywords", "bug", "--file_extension", ".java"]);
        assert_eq!(args.file_extensions, ".java");
    }

    #[test]
    fn missing_required_argument_is_rejected() {
        assert!(Args::try_parse_from(["git-bugmine", "-r", "repo", "-k", "bug"]).is_err());
    }

    #[test]
    fn lists_are_trimmed_and_blanks_dropped() {
        assert_eq!(split_list(" fix, Bug ,,"), ["fix", "Bug"]);
        assert!(split_list(" , ").is_empty());
    }

    #[test]
    fn resolve_builds_filters_and_options() {
        let args = parse(&["-r", "repo", "-k", "FIX", "-e", ".py, .rs", "-b", "b", "-f", "f", "--no_csv", "--binary", "raw"]);
        let config = args.resolve().unwrap();
        assert!(config.keywords.matches("hotfix"));
        assert!(config.extensions.matches("main.rs"));
        assert_eq!(config.layout.buggy_root, PathBuf::from("b"));
        assert!(config.options.write_message);
        assert!(!config.options.write_table);
        assert_eq!(config.options.binary, BinaryPolicy::Raw);
    }

    #[test]
    fn output_roots_default_next_to_executable() {
        let config = parse(&["-r", "repo", "-k", "bug", "-e", ".py"]).resolve().unwrap();
        assert!(config.layout.buggy_root.ends_with("bugs"));
        assert!(config.layout.fixed_root.ends_with("fixes"));
    }

    #[test]
    fn blank_keyword_list_is_a_config_error() {
        let err = parse(&["-r", "repo", "-k", " , ", "-e", ".py"]).resolve().unwrap_err();
        assert!(matches!(err, ExtractError::Config(_)));
    }
}
