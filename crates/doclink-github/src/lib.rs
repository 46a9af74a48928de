//! Source-control host abstraction for doclink
//!
//! Retrieves raw file content at a commit, decodes it, and slices the
//! requested line range. The HTTP transport itself lives behind the
//! [`SourceHost`] trait.

pub mod error;
pub mod fetcher;
pub mod host;

pub use error::{Error, Result};
pub use fetcher::{ContentFetcher, RetrievedContent, slice_lines};
pub use host::{AccessToken, BranchInfo, FileContent, SourceHost};
