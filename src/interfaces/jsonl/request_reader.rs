use super::request::Request;
use crate::error::{MarketplaceError, Result};
use std::io::{BufRead, BufReader, Read};

/// Reads requests from a JSON-lines source.
///
/// Each non-blank line holds one request object. Lines are decoded lazily, so
/// large request logs are processed in a streaming fashion.
pub struct RequestReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> RequestReader<R> {
    /// Creates a new `RequestReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
        }
    }

    /// Returns an iterator that lazily reads and deserializes requests.
    pub fn requests(self) -> impl Iterator<Item = Result<Request>> {
        self.reader.lines().filter_map(|line| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(serde_json::from_str(&line).map_err(MarketplaceError::from)),
            Err(e) => Some(Err(MarketplaceError::from(e))),
        })
    }
}
