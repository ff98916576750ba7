use std::path::PathBuf;

use thiserror::Error;

use crate::filename_parser::SeasonOffsetError;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to metadata provider failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("metadata provider returned status {status}, response: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode provider response: {source}, response: {body}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("credential file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0} cannot be empty")]
    EmptyInput(&'static str),
    #[error("invalid media type choice '{0}', expected 1 or 2")]
    InvalidMediaKind(String),
    #[error("invalid TMDB ID '{0}'")]
    InvalidTmdbId(String),
    #[error("invalid season offset '{0}'")]
    InvalidSeasonOffset(String),
    #[error(transparent)]
    SeasonOffset(#[from] SeasonOffsetError),
    #[error("invalid {field} '{value}', expected a positive number")]
    InvalidNumber { field: &'static str, value: String },
    #[error("no matching files for '{title}' in {}", .dir.display())]
    NoMatchingFiles { dir: PathBuf, title: String },
    #[error("failed to scan directory: {0}")]
    Scan(#[from] walkdir::Error),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("console I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
