use thiserror::Error;

/// Errors raised by the survey backend client.
///
/// Timeouts surface through [`ClientError::Http`] (reqwest models them as
/// request errors) and are treated as the call's normal failure mode, not a
/// distinct crash path.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status} for {path}")]
    UnexpectedStatus { status: u16, path: String },
}
