//! HTTP response types

use crate::error::Error;

/// Result of every request helper - the decoded body or an [`Error`]
pub type Response<R, E = Error> = Result<R, E>;

/// Check if `status` is a success (2xx)
pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}
