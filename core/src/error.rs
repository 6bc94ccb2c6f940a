use thiserror::Error;

/// Failure loading a ROM image.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RomLoadError {
    #[error("ROM image is empty")]
    Empty,
}

/// Failure parsing a GT1 program file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Gt1ParseError {
    #[error("GT1 input is empty")]
    Empty,
    #[error("truncated segment header at offset {offset}")]
    TruncatedSegmentHeader { offset: usize },
    #[error("segment at offset {offset} declares {declared} bytes but only {available} remain")]
    TruncatedSegmentPayload {
        offset: usize,
        declared: usize,
        available: usize,
    },
    #[error("truncated start-address record at offset {offset}")]
    TruncatedStartAddress { offset: usize },
}

/// Reserved for loader runtime faults. The bit-banging protocol is
/// deterministic once a `Gt1File` has parsed, so this is never raised
/// by [`crate::loader::Loader`] today; it exists so `has_error`/`get_error`
/// have a real type to report instead of a magic sentinel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoaderError {
    #[error("loader protocol fault: {0}")]
    Protocol(String),
}
