use std::io;
use thiserror::Error;

use crate::buffer::BufferError;

/// Errors that end the read-eval loop. Command failures are reported and the loop continues.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
