//! Request builders and response parsers for the list REST endpoints.
//!
//! # Design
//! Every remote call is split into a `build_*` function producing an
//! `HttpRequest` and a `parse_*` function consuming the `HttpResponse`.
//! `ListService` strings them together over a transport; keeping the pieces
//! free of I/O means URLs, headers and bodies can be checked directly.
//!
//! The web reference is taken per call and only has trailing slashes trimmed.
//! List titles go inside an OData string literal, so single quotes are
//! doubled before percent-encoding. Query option values are percent-encoded.

use std::borrow::Cow;

use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CamlQueryEnvelope, FieldsQuery, ListCollection};

pub const ITEMS_EXPAND: &str = "FieldValuesAsText,FieldValuesAsHtml";
pub const VISIBLE_LISTS_FILTER: &str =
    "(IsPrivate eq false) and (IsCatalog eq false) and (Hidden eq false)";
pub const ODATA_VERSION: &str = "3.0";

const ACCEPT_JSON: (&str, &str) = ("accept", "application/json");

fn web_root(web_url: &str) -> &str {
    web_url.trim_end_matches('/')
}

fn list_segment(list_title: &str) -> String {
    let escaped = list_title.replace('\'', "''");
    format!("GetByTitle('{}')", urlencoding::encode(&escaped))
}

fn query_value(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

fn headers(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// HEAD against the web itself, used to detect a missing web before posting.
pub fn build_probe(web_url: &str) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Head,
        url: web_root(web_url).to_string(),
        headers: Vec::new(),
        body: None,
    }
}

/// Only 404 stops the item query; every other status lets it proceed.
pub fn check_probe(response: HttpResponse) -> Result<(), ApiError> {
    if response.status == 404 {
        return Err(ApiError::ProbeNotFound(response));
    }
    Ok(())
}

pub fn build_items_query(
    web_url: &str,
    list_title: &str,
    caml_query: &str,
) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(&CamlQueryEnvelope::new(caml_query))
        .map_err(|e| ApiError::Serialization(e.to_string()))?;
    Ok(HttpRequest {
        method: HttpMethod::Post,
        url: format!(
            "{}/_api/web/lists/{}/GetItems?$expand={}",
            web_root(web_url),
            list_segment(list_title),
            query_value(ITEMS_EXPAND)
        ),
        headers: headers(&[
            ACCEPT_JSON,
            ("content-type", "application/json;odata=verbose"),
            ("odata-version", ODATA_VERSION),
        ]),
        body: Some(body),
    })
}

pub fn parse_items_query(response: HttpResponse) -> Result<Value, ApiError> {
    check_ok(response)?.json()
}

pub fn build_list_titles(web_url: &str) -> HttpRequest {
    HttpRequest {
        method: HttpMethod::Get,
        url: format!(
            "{}/_api/web/lists?$select=Title&$filter={}",
            web_root(web_url),
            query_value(VISIBLE_LISTS_FILTER)
        ),
        headers: headers(&[ACCEPT_JSON]),
        body: None,
    }
}

/// Titles sorted ascending by `str` ordering (byte-wise, so uppercase sorts
/// before lowercase).
pub fn parse_list_titles(response: HttpResponse) -> Result<Vec<String>, ApiError> {
    let lists: ListCollection = check_ok(response)?.json()?;
    let mut titles: Vec<String> = lists.value.into_iter().map(|l| l.title).collect();
    titles.sort();
    Ok(titles)
}

pub fn build_list_fields<S: AsRef<str>>(
    web_url: &str,
    list_title: &str,
    select: Option<&[S]>,
    order_by: Option<&str>,
) -> HttpRequest {
    let query = FieldsQuery::new(select, order_by);
    HttpRequest {
        method: HttpMethod::Get,
        url: format!(
            "{}/_api/web/lists/{}/Fields?$select={}&$orderby={}",
            web_root(web_url),
            list_segment(list_title),
            query_value(&query.select),
            query_value(&query.order_by)
        ),
        headers: headers(&[ACCEPT_JSON]),
        body: None,
    }
}

pub fn parse_list_fields(response: HttpResponse) -> Result<Value, ApiError> {
    check_ok(response)?.json()
}

fn check_ok(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.is_ok() {
        return Ok(response);
    }
    Err(ApiError::Rejected(response))
}
