use canvass_client::ClientError;
use canvass_engine::ResolverError;
use thiserror::Error;

/// Errors raised while driving a conversation session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// `begin` has not been called (or failed) — there is no question plan.
    #[error("conversation has not been started")]
    NotStarted,

    /// `begin` was called twice on the same session.
    #[error("conversation was already started")]
    AlreadyStarted,

    /// The survey is complete; no further turns are accepted.
    #[error("survey already completed")]
    AlreadyCompleted,

    /// A survey backend call failed.
    #[error("survey backend error: {0}")]
    Backend(#[from] ClientError),

    /// The resolver rejected an answer record.
    #[error(transparent)]
    Resolver(#[from] ResolverError),
}
