use std::path::PathBuf;
use thiserror::Error;

use crate::geometry::EmptyMaskError;

/// The main error type for polycoco operations.
#[derive(Debug, Error)]
pub enum PolycocoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid input {path}: {message}")]
    InvalidInput { path: PathBuf, message: String },

    #[error("failed to parse LabelMe document {path}: {source}")]
    DocumentParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode embedded image data in {path}: {message}")]
    ImageDecode { path: PathBuf, message: String },

    #[error("shape '{label}' in {path}: {source}")]
    EmptyMask {
        path: PathBuf,
        label: String,
        #[source]
        source: EmptyMaskError,
    },

    #[error("label '{label}' not found in categories [{known}]")]
    UnknownCategory { label: String, known: String },

    #[error("failed to write dataset to {path}: {source}")]
    DatasetWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
