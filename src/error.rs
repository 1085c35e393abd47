use std::{io, path::PathBuf};

/// Errors raised by the response engine and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
    /// A term reached the weighing step without an IDF entry.
    /// Ingestion always precedes weighing, so this is a sequencing bug.
    #[error("term `{term}` has no idf entry")]
    MissingTerm { term: String },

    #[error("failed to read resource {}: {source}", path.display())]
    Resource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config error: {0}")]
    Config(String),

    /// The query text was empty. Callers treat this as the end of the session.
    #[error("empty query")]
    EmptyQuery,

    #[error("document store error: {0}")]
    Store(String),

    #[error("clustering failed: {0}")]
    Cluster(String),
}

impl ResponderError {
    pub(crate) fn resource(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Resource {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_cbor::Error> for ResponderError {
    fn from(err: serde_cbor::Error) -> Self {
        Self::Store(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ResponderError>;
