//! Error taxonomy for the single-shot transfer transaction

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can end a transaction early. Each variant maps to the
/// same top-level policy: drop whatever handles are open, print one line,
/// exit nonzero. There is no retry path anywhere.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Pre-flight validation failure. No socket has been opened yet.
    #[error("{0}")]
    Usage(String),

    /// Control connect, name resolution, or data bind/listen failure.
    #[error("{context}: {source}")]
    Connect {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The server answered the command with something other than the
    /// acknowledgement literal. Carries the server's text verbatim so the
    /// operator sees the server's own diagnostic, not a generic one.
    #[error("{0}")]
    Rejected(String),

    /// Peer closed or errored before a full frame was seen, a deadline
    /// lapsed, or the received bytes were not valid text.
    #[error("{0}")]
    Transport(String),

    /// Destination file could not be written.
    #[error("write {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TransferError {
    pub(crate) fn connect(context: impl Into<String>, source: io::Error) -> Self {
        TransferError::Connect {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn transport(context: &str, err: io::Error) -> Self {
        TransferError::Transport(format!("{context}: {err}"))
    }

    /// Process exit status for this failure. Usage errors follow the clap
    /// convention; every runtime failure exits 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            TransferError::Usage(_) => 2,
            _ => 1,
        }
    }
}
