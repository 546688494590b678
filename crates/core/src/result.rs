//! Core result and error types

use thiserror::Error;

/// Core error type encompassing all core module errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file at the specified path.
    #[error("could not read file '{path}': {source}")]
    FileRead {
        /// The path to the file that could not be read.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file at the specified path.
    #[error("could not write file '{path}': {source}")]
    FileWrite {
        /// The path to the file that could not be written.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid hexadecimal in seed.
    #[error("invalid hexadecimal in seed")]
    InvalidSeedHex,

    /// Invalid seed length.
    #[error("invalid seed length: expected 64 hex chars, got {0}")]
    InvalidSeedLength(usize),

    /// A profile file could not be parsed.
    #[error("profile file '{path}' is corrupt: {source}")]
    ProfileParse {
        /// The path to the profile that failed to parse.
        path: String,
        /// The underlying decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// A profile could not be serialized.
    #[error("profile serialization failed: {0}")]
    ProfileEncode(#[source] serde_json::Error),

    /// The input text is too short to hold a single n-gram.
    #[error("text of length {len} is shorter than the n-gram order {order}")]
    TextTooShort {
        /// Length of the offending text in bytes.
        len: usize,
        /// The configured n-gram order.
        order: usize,
    },
}

/// Core result type
pub type Result<T> = std::result::Result<T, Error>;
