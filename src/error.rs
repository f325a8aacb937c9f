use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CodecError>;

#[derive(Debug, Error)]
pub enum CodecError {
    /// Artifact is shorter than the fixed-width length field.
    #[error("malformed artifact: header truncated")]
    TruncatedHeader,

    /// Tree bits ran out before the structure was complete.
    #[error("malformed artifact: tree truncated")]
    TruncatedTree,

    /// Tree bits parse but do not describe a usable code.
    #[error("malformed artifact: invalid tree ({0})")]
    InvalidTree(&'static str),

    /// Body bits ran out before the declared number of bytes was recovered.
    #[error("malformed artifact: body truncated after {decoded} of {expected} bytes")]
    TruncatedBody { expected: u64, decoded: u64 },

    #[error("input of {0} bytes does not fit in the length field")]
    InputTooLarge(usize),

    #[error("declared length {0} cannot be allocated")]
    LengthTooLarge(u64),

    /// Raw unpacker read past the end of its buffer.
    #[error("bit stream exhausted")]
    Exhausted,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("header field: {0}")]
    Header(String),
}

impl CodecError {
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            CodecError::TruncatedHeader
                | CodecError::TruncatedTree
                | CodecError::InvalidTree(_)
                | CodecError::TruncatedBody { .. }
                | CodecError::LengthTooLarge(_)
        )
    }
}
