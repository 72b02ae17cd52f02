use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::Value;
use tower::ServiceExt;

const ITEMS: &str = "/sites/dev/_api/web/lists/GetByTitle('Tasks')/GetItems";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn caml_request(uri: &str, odata_version: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json;odata=verbose");
    if let Some(version) = odata_version {
        builder = builder.header("odata-version", version);
    }
    builder.body(body.to_string()).unwrap()
}

fn caml_body(view_xml: &str) -> String {
    serde_json::json!({
        "query": { "__metadata": { "type": "SP.CamlQuery" }, "ViewXml": view_xml }
    })
    .to_string()
}

// --- web probe ---

#[tokio::test]
async fn head_known_web_returns_200() {
    let resp = app()
        .oneshot(Request::builder().method("HEAD").uri("/sites/dev").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn head_unknown_web_returns_404() {
    let resp = app()
        .oneshot(Request::builder().method("HEAD").uri("/sites/nope").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- list titles ---

#[tokio::test]
async fn list_titles_excludes_hidden_catalog_and_private() {
    let resp = app().oneshot(get("/sites/dev/_api/web/lists")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let titles: Vec<&str> = body["value"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["Title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Tasks", "Documents", "Site Pages", "announcements"]);
}

#[tokio::test]
async fn list_titles_unknown_web_returns_404() {
    let resp = app().oneshot(get("/sites/nope/_api/web/lists")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- items ---

#[tokio::test]
async fn get_items_returns_expanded_values() {
    let uri = format!("{ITEMS}?$expand=FieldValuesAsText%2CFieldValuesAsHtml");
    let resp = app()
        .oneshot(caml_request(&uri, Some("3.0"), &caml_body("<View/>")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let items = body["value"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[1]["FieldValuesAsText"]["Title"], "Fix <layout> bug");
    assert_eq!(items[1]["FieldValuesAsHtml"]["Title"], "Fix &lt;layout&gt; bug");
}

#[tokio::test]
async fn get_items_honors_row_limit() {
    let resp = app()
        .oneshot(caml_request(
            ITEMS,
            Some("3.0"),
            &caml_body("<View><RowLimit>1</RowLimit></View>"),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let items = body["value"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert!(items[0].get("FieldValuesAsText").is_none());
}

#[tokio::test]
async fn get_items_requires_odata_version_3() {
    let resp = app()
        .oneshot(caml_request(ITEMS, None, &caml_body("<View/>")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app()
        .oneshot(caml_request(ITEMS, Some("4.0"), &caml_body("<View/>")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_items_rejects_wrong_entity_type() {
    let body = r#"{"query":{"__metadata":{"type":"SP.List"},"ViewXml":"<View/>"}}"#;
    let resp = app().oneshot(caml_request(ITEMS, Some("3.0"), body)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_items_rejects_malformed_body() {
    let resp = app()
        .oneshot(caml_request(ITEMS, Some("3.0"), "not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_items_unknown_list_returns_404() {
    let uri = "/sites/dev/_api/web/lists/GetByTitle('Missing')/GetItems";
    let resp = app()
        .oneshot(caml_request(uri, Some("3.0"), &caml_body("<View/>")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_items_percent_encoded_title() {
    let uri = "/sites/dev/_api/web/lists/GetByTitle('Site%20Pages')/GetItems";
    let resp = app()
        .oneshot(caml_request(uri, Some("3.0"), &caml_body("<View/>")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["value"][0]["Title"], "Home");
}

// --- fields ---

#[tokio::test]
async fn fields_default_order_by_internal_name() {
    let resp = app()
        .oneshot(get("/sites/dev/_api/web/lists/GetByTitle('Tasks')/Fields?$select=&$orderby=InternalName"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let fields = body["value"].as_array().unwrap();
    let names: Vec<&str> = fields.iter().map(|f| f["InternalName"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Author", "ContentType", "ID", "Status", "Title"]);
    assert!(fields[0].get("TypeAsString").is_some());
}

#[tokio::test]
async fn fields_projection_and_order() {
    let resp = app()
        .oneshot(get("/sites/dev/_api/web/lists/GetByTitle('Tasks')/Fields?$select=Title%2CHidden&$orderby=Title"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let fields = body["value"].as_array().unwrap();
    assert_eq!(fields[0]["Title"], "Content Type");
    assert_eq!(fields[0].as_object().unwrap().len(), 2);
    assert!(fields[0].get("InternalName").is_none());
}

#[tokio::test]
async fn fields_bad_selector_returns_400() {
    let resp = app()
        .oneshot(get("/sites/dev/_api/web/lists/GetById('1')/Fields"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
