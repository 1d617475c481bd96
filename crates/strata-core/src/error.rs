//! Errors raised while loading model source files.

use std::path::PathBuf;

use thiserror::Error;

use crate::parser::SyntaxError;

/// Error produced when a model file cannot be turned into entity metadata.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid Go source.
    #[error("syntax error in {}: {source}", path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: SyntaxError,
    },

    /// The file declares no struct type.
    #[error("no struct declaration found in {}", path.display())]
    NoStruct { path: PathBuf },
}

impl ParseError {
    /// Path of the file that failed to parse.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Syntax { path, .. } | Self::NoStruct { path } => path,
        }
    }
}
