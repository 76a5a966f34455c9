// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    #[error("cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write commit table: {0}")]
    Csv(#[from] csv::Error),

    #[error("{path} in commit {commit} is not valid UTF-8 text")]
    BinaryContent { commit: String, path: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("commit {commit} has a timestamp outside the representable range")]
    Time { commit: String },
}

impl ExtractError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExtractError::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
