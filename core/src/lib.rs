//! Async gateway to the list endpoints of a SharePoint-style REST API.
//!
//! # Overview
//! `ListService` runs CAML queries against a list, enumerates the visible
//! lists of a web, and fetches list field metadata. It issues requests
//! through an injected `SpHttpClient`, which owns authentication, timeouts
//! and cancellation.
//!
//! # Design
//! - `ListService` only borrows the transport; it holds no other state.
//! - Each remote call is a `build_*` / `parse_*` pair in `requests`, so the
//!   I/O boundary is explicit and request shapes are testable without a
//!   network.
//! - Failed responses are returned whole inside `ApiError` so callers can
//!   inspect them; nothing is retried.

pub mod error;
pub mod http;
pub mod requests;
pub mod service;
pub mod transport;
pub mod types;

pub use error::{ApiError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use service::ListService;
pub use transport::SpHttpClient;
pub use types::{CamlQueryEnvelope, FieldsQuery};
