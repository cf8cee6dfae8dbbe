//! Content input from a flag, a file, or piped stdin.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::config::defaults;

#[cfg(test)]
#[path = "input_tests.rs"]
mod tests;

const CHUNK_SIZE: usize = 8 * 1024;

/// Errors from obtaining content.
#[derive(Debug, Error)]
pub enum InputError {
    /// The content file could not be read.
    #[error("Failed to read file '{}': {source}", path.display())]
    FileRead {
        /// Path that was requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Reading piped stdin failed.
    #[error("Failed to read stdin: {0}")]
    Stdin(#[source] std::io::Error),

    /// Nothing to send.
    #[error("No content provided. Use --content, --file, or pipe to stdin")]
    Empty,
}

/// Where content comes from, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Text given on the command line.
    Inline(String),
    /// A file to read.
    File(PathBuf),
    /// Piped standard input.
    Stdin,
}

impl ContentSource {
    /// Picks the source: inline text wins over a file, stdin is the fallback.
    #[must_use]
    pub fn from_args(content: Option<String>, file: Option<PathBuf>) -> Self {
        match (content, file) {
            (Some(text), _) => Self::Inline(text),
            (None, Some(path)) => Self::File(path),
            (None, None) => Self::Stdin,
        }
    }
}

/// Reads content from `source`, trimmed.
///
/// Stdin is skipped when it is a terminal. Otherwise the first chunk must
/// arrive within [`defaults::stdin_wait`], after which it is read to EOF.
///
/// # Errors
///
/// Returns [`InputError::FileRead`] for an unreadable file, and
/// [`InputError::Empty`] when the trimmed content is empty.
pub async fn read_content(source: ContentSource) -> Result<String, InputError> {
    let raw = match source {
        ContentSource::Inline(text) => text,
        ContentSource::File(path) => std::fs::read_to_string(&path)
            .map_err(|source| InputError::FileRead { path, source })?,
        ContentSource::Stdin => {
            if std::io::stdin().is_terminal() {
                String::new()
            } else {
                read_piped(tokio::io::stdin(), defaults::stdin_wait()).await?
            }
        }
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }
    Ok(trimmed.to_string())
}

/// Reads a pipe to EOF, or returns an empty string if nothing arrives in time.
///
/// Only the first chunk is bounded by `wait`; a slow producer that has started
/// writing is read to completion. Invalid UTF-8 is replaced.
///
/// # Errors
///
/// Returns [`InputError::Stdin`] on read failure.
pub async fn read_piped<R>(mut reader: R, wait: Duration) -> Result<String, InputError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0; CHUNK_SIZE];
    let Ok(first) = tokio::time::timeout(wait, reader.read(&mut buf)).await else {
        tracing::debug!("No piped input within {}ms", wait.as_millis());
        return Ok(String::new());
    };

    let n = first.map_err(InputError::Stdin)?;
    buf.truncate(n);
    if n > 0 {
        reader
            .read_to_end(&mut buf)
            .await
            .map_err(InputError::Stdin)?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
