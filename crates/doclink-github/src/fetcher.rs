//! Content retrieval and line-range extraction

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::host::{AccessToken, SourceHost};
use crate::{Error, Result};
use doclink_types::Coordinates;

/// Decoded file content at a specific commit plus the requested line-range
/// slice. Ephemeral: discarded after the drift check or display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedContent {
    /// The full decoded file text
    pub full_text: String,
    /// The `[start_line, end_line]` window of `full_text`
    pub slice: String,
}

/// Extract the inclusive, 1-indexed `[start_line, end_line]` window.
///
/// Lines are split on both bare and carriage-return-prefixed line endings.
/// `end_line: None` takes to end of file. `start_line > end_line` returns
/// the entire text unsliced; callers rely on that fallback, it is not an
/// error.
pub fn slice_lines(text: &str, start_line: u32, end_line: Option<u32>) -> String {
    if let Some(end) = end_line
        && start_line > end
    {
        return text.to_string();
    }

    let start = start_line.max(1) as usize;
    let lines = text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line));

    let selected: Vec<&str> = match end_line {
        Some(end) => {
            let window = (end as usize).saturating_sub(start) + 1;
            lines.skip(start - 1).take(window).collect()
        }
        None => lines.skip(start - 1).collect(),
    };

    selected.join("\n")
}

/// Retrieves file content from a [`SourceHost`] and slices line ranges.
#[derive(Clone)]
pub struct ContentFetcher {
    host: Arc<dyn SourceHost>,
}

impl ContentFetcher {
    pub fn new(host: Arc<dyn SourceHost>) -> Self {
        Self { host }
    }

    /// Fetch the file at the coordinates' anchor commit, decode it, and
    /// slice the requested line range.
    ///
    /// # Errors
    ///
    /// `NotFound` if the host reports no such path/commit, `Base64`/`Utf8`
    /// if the payload cannot be decoded, `Network`/`Unauthenticated` from
    /// the transport.
    pub async fn fetch_range(
        &self,
        token: &AccessToken,
        coordinates: &Coordinates,
    ) -> Result<RetrievedContent> {
        self.fetch_range_at(token, coordinates, &coordinates.commit_id)
            .await
    }

    /// Like [`fetch_range`](Self::fetch_range) but at an explicit commit,
    /// keeping the coordinates' line range. Used by the drift detector to
    /// read the same range at the branch head.
    pub async fn fetch_range_at(
        &self,
        token: &AccessToken,
        coordinates: &Coordinates,
        commit_id: &str,
    ) -> Result<RetrievedContent> {
        let payload = self
            .host
            .file_at_commit(
                token,
                &coordinates.owner,
                &coordinates.repo,
                &coordinates.path,
                commit_id,
            )
            .await?;

        let full_text = decode_content(&payload.content)?;
        let slice = slice_lines(&full_text, coordinates.start_line, coordinates.end_line);

        tracing::debug!(
            path = %coordinates.path,
            commit_id,
            lines = slice.lines().count(),
            "Fetched line range"
        );

        Ok(RetrievedContent { full_text, slice })
    }

    /// Current tip commit id of a branch.
    ///
    /// # Errors
    ///
    /// `NotFound` if the branch does not exist or the host call fails.
    pub async fn branch_head(
        &self,
        token: &AccessToken,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<String> {
        let info = self.host.branch_head(token, owner, repo, branch).await?;
        Ok(info.commit_id)
    }
}

/// Decode a transport-encoded (base64) payload into text.
///
/// Hosts wrap base64 bodies with newlines, so whitespace is stripped before
/// decoding.
fn decode_content(encoded: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact.as_bytes()).map_err(Error::from)?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{BranchInfo, FileContent};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    struct SingleFileHost {
        content: String,
    }

    #[async_trait]
    impl SourceHost for SingleFileHost {
        async fn file_at_commit(
            &self,
            _token: &AccessToken,
            _owner: &str,
            _repo: &str,
            _path: &str,
            _commit_id: &str,
        ) -> Result<FileContent> {
            Ok(FileContent {
                content: self.content.clone(),
            })
        }

        async fn branch_head(
            &self,
            _token: &AccessToken,
            _owner: &str,
            _repo: &str,
            _branch: &str,
        ) -> Result<BranchInfo> {
            Ok(BranchInfo {
                commit_id: "head".to_string(),
            })
        }
    }

    fn coordinates(start_line: u32, end_line: Option<u32>) -> Coordinates {
        Coordinates {
            owner: "octocat".to_string(),
            repo: "hello-world".to_string(),
            branch: "main".to_string(),
            path: "src/lib.rs".to_string(),
            commit_id: "c1".to_string(),
            start_line,
            end_line,
        }
    }

    fn numbered_lines(count: u32) -> String {
        (1..=count)
            .map(|i| format!("line{i}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[rstest]
    #[case(1, Some(1), "line1")]
    #[case(2, Some(4), "line2\nline3\nline4")]
    #[case(5, Some(5), "line5")]
    #[case(1, Some(5), "line1\nline2\nline3\nline4\nline5")]
    fn test_slice_window(#[case] start: u32, #[case] end: Option<u32>, #[case] expected: &str) {
        let text = numbered_lines(5);
        assert_eq!(slice_lines(&text, start, end), expected);
    }

    #[test]
    fn test_slice_window_length() {
        // [start, end] inclusive: exactly end - start + 1 lines
        let text = numbered_lines(20);
        let slice = slice_lines(&text, 7, Some(13));
        assert_eq!(slice.lines().count(), 7);
        assert_eq!(slice.lines().next(), Some("line7"));
        assert_eq!(slice.lines().last(), Some("line13"));
    }

    #[test]
    fn test_slice_open_ended() {
        let text = numbered_lines(4);
        assert_eq!(slice_lines(&text, 3, None), "line3\nline4");
    }

    #[test]
    fn test_slice_inverted_range_returns_full_text() {
        // start > end falls back to the full text, never an error
        let text = numbered_lines(20);
        assert_eq!(slice_lines(&text, 5, Some(3)), text);
    }

    #[test]
    fn test_slice_crlf_input() {
        let text = "a\r\nb\r\nc";
        assert_eq!(slice_lines(text, 2, Some(3)), "b\nc");
    }

    #[test]
    fn test_slice_past_end_of_file() {
        let text = numbered_lines(3);
        assert_eq!(slice_lines(&text, 2, Some(10)), "line2\nline3");
        assert_eq!(slice_lines(&text, 8, Some(10)), "");
    }

    #[tokio::test]
    async fn test_fetch_range_decodes_and_slices() {
        let encoded = STANDARD.encode("a\nb\nc\nd");
        let fetcher = ContentFetcher::new(Arc::new(SingleFileHost { content: encoded }));
        let token = AccessToken::new("t");

        let retrieved = fetcher
            .fetch_range(&token, &coordinates(2, Some(3)))
            .await
            .unwrap();

        assert_eq!(retrieved.full_text, "a\nb\nc\nd");
        assert_eq!(retrieved.slice, "b\nc");
    }

    #[tokio::test]
    async fn test_fetch_range_accepts_wrapped_base64() {
        // Hosts return base64 bodies broken across lines
        let encoded = STANDARD.encode("a\nb\nc\nd");
        let wrapped = format!("{}\n{}\n", &encoded[..4], &encoded[4..]);
        let fetcher = ContentFetcher::new(Arc::new(SingleFileHost { content: wrapped }));
        let token = AccessToken::new("t");

        let retrieved = fetcher
            .fetch_range(&token, &coordinates(1, None))
            .await
            .unwrap();
        assert_eq!(retrieved.full_text, "a\nb\nc\nd");
    }

    #[tokio::test]
    async fn test_fetch_range_rejects_malformed_payload() {
        let fetcher = ContentFetcher::new(Arc::new(SingleFileHost {
            content: "not-base64!!!".to_string(),
        }));
        let token = AccessToken::new("t");

        let result = fetcher.fetch_range(&token, &coordinates(1, None)).await;
        assert!(matches!(result, Err(Error::Base64(_))));
    }

    #[tokio::test]
    async fn test_fetch_range_rejects_non_utf8_payload() {
        let fetcher = ContentFetcher::new(Arc::new(SingleFileHost {
            content: STANDARD.encode([0xff, 0xfe, 0xfd]),
        }));
        let token = AccessToken::new("t");

        let result = fetcher.fetch_range(&token, &coordinates(1, None)).await;
        assert!(matches!(result, Err(Error::Utf8(_))));
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = AccessToken::new("ghp_secret");
        assert_eq!(format!("{token:?}"), "AccessToken(..)");
    }
}
