//! Bearer token used for authenticated artifact downloads.
//!
//! The token lives in a plain text file, by default
//! `~/.config/github-token`. Only the first line is used, trimmed of
//! surrounding whitespace; no other validation is applied.

use crate::error::{PackagerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use directories_next::BaseDirs;
use std::fmt;

/// Token file location relative to the home directory.
const TOKEN_FILE_RELATIVE: &str = ".config/github-token";

/// An opaque GitHub token.
///
/// `Debug` output is redacted so the token never lands in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct GithubToken(String);

impl GithubToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Value for the `Authorization` header.
    ///
    /// ```
    /// use bliss_packager::token::GithubToken;
    ///
    /// let token = GithubToken::new("abc");
    /// assert_eq!(token.authorization_header(), "token abc");
    /// ```
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("token {}", self.0)
    }

    /// Return the raw token.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for GithubToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GithubToken(<redacted>)")
    }
}

/// Default token file path under the user's home directory.
///
/// Returns `None` when no home directory can be determined.
#[must_use]
pub fn default_token_path() -> Option<Utf8PathBuf> {
    let dirs = BaseDirs::new()?;
    Utf8PathBuf::try_from(dirs.home_dir().join(TOKEN_FILE_RELATIVE)).ok()
}

/// Read the token from the first line of `path`.
///
/// # Errors
///
/// Returns [`PackagerError::TokenUnavailable`] when the file cannot be read
/// or its first line is blank.
pub fn read_token(path: &Utf8Path) -> Result<GithubToken> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| PackagerError::TokenUnavailable {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
    let first_line = contents.lines().next().map(str::trim).unwrap_or_default();
    if first_line.is_empty() {
        return Err(PackagerError::TokenUnavailable {
            path: path.to_owned(),
            reason: "first line is empty".to_owned(),
        });
    }
    log::debug!("read bearer token from {path}");
    Ok(GithubToken::new(first_line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn token_dir() -> (TempDir, Utf8PathBuf) {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::try_from(temp.path().join("github-token")).expect("UTF-8 path");
        (temp, path)
    }

    #[rstest]
    #[case::plain("abc123", "abc123")]
    #[case::trailing_newline("abc123\n", "abc123")]
    #[case::surrounding_whitespace("  abc123  \r\n", "abc123")]
    #[case::extra_lines("abc123\nsecond line\n", "abc123")]
    fn reads_first_trimmed_line(
        token_dir: (TempDir, Utf8PathBuf),
        #[case] contents: &str,
        #[case] expected: &str,
    ) {
        let (_temp, path) = token_dir;
        std::fs::write(&path, contents).expect("write token");
        let token = read_token(&path).expect("token");
        assert_eq!(token.expose(), expected);
    }

    #[rstest]
    fn missing_file_is_unavailable(token_dir: (TempDir, Utf8PathBuf)) {
        let (_temp, path) = token_dir;
        let result = read_token(&path);
        assert!(matches!(result, Err(PackagerError::TokenUnavailable { .. })));
    }

    #[rstest]
    #[case::empty("")]
    #[case::blank_first_line("   \nabc")]
    fn blank_first_line_is_unavailable(
        token_dir: (TempDir, Utf8PathBuf),
        #[case] contents: &str,
    ) {
        let (_temp, path) = token_dir;
        std::fs::write(&path, contents).expect("write token");
        let err = read_token(&path).expect_err("blank token");
        assert!(err.to_string().contains("first line is empty"));
    }

    #[test]
    fn debug_output_is_redacted() {
        let token = GithubToken::new("super-secret");
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret"));
    }

    #[cfg(unix)]
    #[test]
    fn default_path_is_under_home() {
        let temp = tempfile::tempdir().expect("temp dir");
        let home = temp.path().to_path_buf();
        temp_env::with_var("HOME", Some(&home), || {
            let path = default_token_path().expect("home directory");
            assert!(path.as_std_path().starts_with(&home));
            assert!(path.as_str().ends_with(".config/github-token"));
        });
    }
}
