//! The I/O seam between the request builder and the network.

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one `HttpRequest` against the backing store.
///
/// Implementations must return non-2xx responses as data, not as `Err`;
/// status interpretation belongs to `TodoClient::parse_*`. `Err` is for
/// requests that produced no response at all.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}
