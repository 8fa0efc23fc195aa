use thiserror::Error;

/// Errors raised by document operations.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("invalid offset {offset} (length {length}) for visible text of length {visible_len}")]
    InvalidOffset {
        offset: usize,
        length: usize,
        visible_len: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no filename specified")]
    NoFilename,

    #[error("invalid search query: {0}")]
    InvalidQuery(#[from] regex::Error),
}
