//! Domain client errors.

use rpc::RpcError;
use thiserror::Error;

use crate::UserId;

/// Errors returned by [`crate::Client`] operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The underlying caller failed. Passed through unchanged.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The server has no user with the requested id.
    #[error("no user with id {0}")]
    UserNotFound(UserId),
}
