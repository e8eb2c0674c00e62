//! Document sink contract for the remote store.

use crate::model::sample::LocationDocument;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upload failure reported by a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// Store is unreachable right now.
    Unavailable(String),
    /// Store refused the document.
    Rejected(String),
}

impl Display for SinkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "document store unavailable: {message}"),
            Self::Rejected(message) => write!(f, "document rejected: {message}"),
        }
    }
}

impl Error for SinkError {}

/// Writes location documents into the `locations` collection.
pub trait DocumentSink {
    /// Adds one document and returns the store-generated document id.
    fn write_document(&mut self, document: &LocationDocument) -> Result<String, SinkError>;
}
