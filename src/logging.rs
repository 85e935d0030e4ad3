//! Safe logging helpers
//!
//! Keeps the GitHub token out of logs and `config show` output.

use std::fmt;

/// Masked representation of a secret token
///
/// Shows the first 4 characters followed by `***`; short or empty values
/// are fully masked.
#[derive(Clone, Debug)]
pub struct SensitiveToken<'a> {
    inner: &'a str,
}

impl<'a> SensitiveToken<'a> {
    /// ```
    /// use ghcp_stats::logging::SensitiveToken;
    ///
    /// let token = "ghp_abcdef1234567890";
    /// assert_eq!(SensitiveToken::new(token).to_string(), "ghp_***");
    /// ```
    pub fn new(token: &'a str) -> Self {
        Self { inner: token }
    }
}

impl<'a> fmt::Display for SensitiveToken<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const VISIBLE: usize = 4;
        if self.inner.is_empty() {
            write!(f, "<unset>")
        } else if self.inner.len() <= VISIBLE * 3 || !self.inner.is_char_boundary(VISIBLE) {
            write!(f, "***")
        } else {
            write!(f, "{}***", &self.inner[..VISIBLE])
        }
    }
}

pub fn mask_secret(value: &str) -> String {
    SensitiveToken::new(value).to_string()
}
