use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(
        "{resource}: truncated {structure} at offset {offset:#x} (need {need} bytes, have {have})"
    )]
    TruncatedInput {
        resource: String,
        structure: &'static str,
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("{resource}: {structure} index {index:#x} out of range (limit {limit:#x})")]
    OutOfRange {
        resource: String,
        structure: &'static str,
        index: usize,
        limit: usize,
    },

    #[error("missing resource {}", path.display())]
    MissingResource { path: PathBuf },

    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DecodeError {
    pub fn out_of_range(
        resource: &str,
        structure: &'static str,
        index: usize,
        limit: usize,
    ) -> Self {
        DecodeError::OutOfRange {
            resource: resource.to_string(),
            structure,
            index,
            limit,
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
