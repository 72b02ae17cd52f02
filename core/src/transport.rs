//! The transport capability injected into `ListService`.
//!
//! Authentication, timeouts and cancellation are the transport's business.
//! The gateway only hands over fully built requests and reads back responses.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// An authenticated HTTP client able to execute GET, HEAD and POST requests.
///
/// Implementations must return non-2xx responses as `Ok(HttpResponse)` and
/// reserve `Err` for failures where no response was obtained at all.
#[async_trait]
pub trait SpHttpClient: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

