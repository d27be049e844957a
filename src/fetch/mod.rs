//! Artifact downloads.
//!
//! The cache never talks to the network itself; it hands a [`Fetcher`] the
//! temporary file to stream into. [`HttpFetcher`] is the real
//! implementation, tests substitute scripted fetchers to simulate failures
//! part-way through a download.

pub mod http;

pub use http::HttpFetcher;

use anyhow::Result;
use std::io::Write;

/// Streams the body behind a URL into a writer.
pub trait Fetcher {
    /// Write the full body of `url` into `sink`, returning the byte count.
    ///
    /// An error may arrive after some bytes were already written; callers
    /// must treat the sink's contents as garbage in that case.
    fn fetch_to(&self, url: &str, sink: &mut dyn Write) -> Result<u64>;
}
