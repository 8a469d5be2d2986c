//! Error enum
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Serde(serde_json::Error),
    /// Source file does not exist.
    MissingInput(PathBuf),
    /// Source file kind can't be inferred from its name.
    UnsupportedInput(PathBuf),
    InvalidArgument(String),
    ArticleNotFound(String),
    /// A batch could not be committed to the frequency store.
    /// Nothing from that batch (counts or progress) has been persisted.
    Commit {
        page_index: u64,
        source: Box<Error>,
    },
    Custom(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {}", e),
            Error::Serde(e) => write!(f, "serialization error: {}", e),
            Error::MissingInput(p) => write!(f, "could not find input file {:?}", p),
            Error::UnsupportedInput(p) => write!(
                f,
                "unsupported input {:?} (expected .xml, .xml.gz or .jsonl)",
                p
            ),
            Error::InvalidArgument(s) => write!(f, "invalid argument: {}", s),
            Error::ArticleNotFound(t) => write!(f, "could not find article '{}'", t),
            Error::Commit { page_index, source } => write!(
                f,
                "batch ending at page {} was not committed: {}",
                page_index, source
            ),
            Error::Custom(s) => write!(f, "{}", s),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Serde(e) => Some(e),
            Error::Commit { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Serde(e)
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}
