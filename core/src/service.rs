//! The list gateway: three read operations over an injected transport.
//!
//! # Design
//! `ListService` borrows its transport and keeps no other state, so a single
//! instance can serve any number of overlapping calls. Each operation issues
//! its requests strictly in sequence and never retries; every failure is
//! returned to the caller as-is.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::requests;
use crate::transport::SpHttpClient;

/// Gateway to the list endpoints of a content-management REST API.
#[derive(Debug)]
pub struct ListService<'a, C: ?Sized> {
    http: &'a C,
}

impl<C: ?Sized> Clone for ListService<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized> Copy for ListService<'_, C> {}

impl<'a, C: SpHttpClient + ?Sized> ListService<'a, C> {
    pub fn new(http: &'a C) -> Self {
        Self { http }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.http.execute(request).await?;
        debug!(status = response.status, "received response");
        Ok(response)
    }

    /// Run a CAML query against `list_title` and return the raw result.
    ///
    /// The web is probed with a HEAD first: posting to a web that does not
    /// exist misbehaves on some platform versions instead of failing cleanly.
    /// Only a 404 from the probe aborts; any other status, errors included,
    /// goes on to the POST.
    #[tracing::instrument(level = "debug", skip_all, fields(web = %web_url, list = %list_title))]
    pub async fn get_list_items_by_query(
        &self,
        web_url: &str,
        list_title: &str,
        caml_query: &str,
    ) -> Result<Value, ApiError> {
        let probe = self.send(requests::build_probe(web_url)).await?;
        if let Err(err) = requests::check_probe(probe) {
            warn!("web not found, skipping item query");
            return Err(err);
        }

        let request = requests::build_items_query(web_url, list_title, caml_query)?;
        requests::parse_items_query(self.send(request).await?)
    }

    /// Titles of the visible lists of a web, sorted ascending.
    #[tracing::instrument(level = "debug", skip_all, fields(web = %web_url))]
    pub async fn get_list_titles_from_web(&self, web_url: &str) -> Result<Vec<String>, ApiError> {
        let response = self.send(requests::build_list_titles(web_url)).await?;
        requests::parse_list_titles(response)
    }

    /// Field metadata of a list. `select` narrows the returned properties;
    /// `order_by` defaults to `InternalName`.
    #[tracing::instrument(level = "debug", skip_all, fields(web = %web_url, list = %list_title))]
    pub async fn get_list_fields<S: AsRef<str> + Sync>(
        &self,
        web_url: &str,
        list_title: &str,
        select: Option<&[S]>,
        order_by: Option<&str>,
    ) -> Result<Value, ApiError> {
        let request = requests::build_list_fields(web_url, list_title, select, order_by);
        requests::parse_list_fields(self.send(request).await?)
    }
}
