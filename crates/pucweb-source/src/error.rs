//! Error types for pucweb-source

use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("JSON error at {location}: {message}")]
    JsonError {
        location: String,
        message: String,
    },

    #[error("Invalid record: {message}")]
    InvalidRecord { message: String },

    #[error("IO error")]
    IoError(#[from] io::Error),

    #[error("Internal error")]
    InternalError,
}
