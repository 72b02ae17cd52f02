use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tracing::debug;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Field {
    pub internal_name: String,
    pub title: String,
    pub type_as_string: String,
    pub hidden: bool,
}

#[derive(Clone, Debug)]
pub struct Item {
    pub id: u32,
    pub title: String,
    pub status: String,
}

#[derive(Clone, Debug)]
pub struct List {
    pub title: String,
    pub hidden: bool,
    pub is_catalog: bool,
    pub is_private: bool,
    pub fields: Vec<Field>,
    pub items: Vec<Item>,
}

#[derive(Clone, Debug, Default)]
pub struct Site {
    pub lists: Vec<List>,
}

impl Site {
    fn list(&self, title: &str) -> Option<&List> {
        self.lists.iter().find(|l| l.title == title)
    }
}

#[derive(Deserialize)]
pub struct CamlQueryBody {
    pub query: CamlQuery,
}

#[derive(Deserialize)]
pub struct CamlQuery {
    #[serde(rename = "__metadata")]
    pub metadata: Metadata,
    #[serde(rename = "ViewXml")]
    pub view_xml: String,
}

#[derive(Deserialize)]
pub struct Metadata {
    #[serde(rename = "type")]
    pub type_name: String,
}

pub type Db = Arc<HashMap<String, Site>>;

type Failure = (StatusCode, String);

fn field(internal_name: &str, title: &str, type_as_string: &str, hidden: bool) -> Field {
    Field {
        internal_name: internal_name.to_string(),
        title: title.to_string(),
        type_as_string: type_as_string.to_string(),
        hidden,
    }
}

fn list(title: &str, hidden: bool, is_catalog: bool, is_private: bool, items: Vec<Item>) -> List {
    List {
        title: title.to_string(),
        hidden,
        is_catalog,
        is_private,
        fields: vec![
            field("Title", "Title", "Text", false),
            field("ID", "ID", "Counter", false),
            field("Status", "Status", "Choice", false),
            field("ContentType", "Content Type", "Computed", true),
            field("Author", "Created By", "User", false),
        ],
        items,
    }
}

fn item(id: u32, title: &str, status: &str) -> Item {
    Item {
        id,
        title: title.to_string(),
        status: status.to_string(),
    }
}

/// Site `dev` with visible, hidden, catalog and private lists.
pub fn fixture() -> HashMap<String, Site> {
    let tasks = vec![
        item(1, "Write docs", "Done"),
        item(2, "Fix <layout> bug", "In Progress"),
        item(3, "Ship release", "Not Started"),
    ];
    let site = Site {
        lists: vec![
            list("Tasks", false, false, false, tasks),
            list("Documents", false, false, false, Vec::new()),
            list("appdata", true, false, false, Vec::new()),
            list("Site Pages", false, false, false, vec![item(1, "Home", "Published")]),
            list("Master Page Gallery", false, true, false, Vec::new()),
            list("announcements", false, false, false, Vec::new()),
            list("User Information List", false, false, true, Vec::new()),
        ],
    };
    HashMap::from([("dev".to_string(), site)])
}

pub fn app() -> Router {
    app_with(fixture())
}

pub fn app_with(sites: HashMap<String, Site>) -> Router {
    let db: Db = Arc::new(sites);
    Router::new()
        .route("/sites/{site}", get(web_exists))
        .route("/sites/{site}/_api/web/lists", get(list_titles))
        .route("/sites/{site}/_api/web/lists/{selector}/GetItems", post(get_items))
        .route("/sites/{site}/_api/web/lists/{selector}/Fields", get(list_fields))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn site<'a>(db: &'a Db, name: &str) -> Result<&'a Site, Failure> {
    db.get(name).ok_or_else(|| {
        debug!(site = name, "unknown site");
        (StatusCode::NOT_FOUND, format!("Site '{name}' not found"))
    })
}

/// Extract the title from a `GetByTitle('...')` segment, undoing `''` escapes.
pub fn title_from_selector(selector: &str) -> Option<String> {
    let inner = selector.strip_prefix("GetByTitle('")?.strip_suffix("')")?;
    Some(inner.replace("''", "'"))
}

fn target_list<'a>(site: &'a Site, selector: &str) -> Result<&'a List, Failure> {
    let title = title_from_selector(selector)
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("Unsupported list selector: {selector}")))?;
    site.list(&title).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            format!("List '{title}' does not exist at this site"),
        )
    })
}

/// Value of `<RowLimit ...>N</RowLimit>` in a CAML view, if present.
pub fn row_limit(view_xml: &str) -> Option<usize> {
    let start = view_xml.find("<RowLimit")?;
    let rest = &view_xml[start..];
    let open_end = rest.find('>')?;
    let rest = &rest[open_end + 1..];
    let close = rest.find("</RowLimit>")?;
    rest[..close].trim().parse().ok()
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn item_json(item: &Item, expand: &[&str]) -> Value {
    let mut obj = Map::new();
    obj.insert("ID".into(), json!(item.id));
    obj.insert("Title".into(), json!(item.title));
    obj.insert("Status".into(), json!(item.status));
    if expand.contains(&"FieldValuesAsText") {
        obj.insert(
            "FieldValuesAsText".into(),
            json!({ "ID": item.id.to_string(), "Title": item.title, "Status": item.status }),
        );
    }
    if expand.contains(&"FieldValuesAsHtml") {
        obj.insert(
            "FieldValuesAsHtml".into(),
            json!({
                "ID": item.id.to_string(),
                "Title": html_escape(&item.title),
                "Status": html_escape(&item.status),
            }),
        );
    }
    Value::Object(obj)
}

fn sort_key(value: &Value, property: &str) -> String {
    match value.get(property) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

async fn web_exists(State(db): State<Db>, Path(site_name): Path<String>) -> Result<StatusCode, Failure> {
    site(&db, &site_name)?;
    Ok(StatusCode::OK)
}

async fn list_titles(State(db): State<Db>, Path(site_name): Path<String>) -> Result<Json<Value>, Failure> {
    let site = site(&db, &site_name)?;
    let value: Vec<Value> = site
        .lists
        .iter()
        .filter(|l| !l.is_private && !l.is_catalog && !l.hidden)
        .map(|l| json!({ "Title": l.title }))
        .collect();
    Ok(Json(json!({ "value": value })))
}

async fn get_items(
    State(db): State<Db>,
    Path((site_name, selector)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, Failure> {
    let site = site(&db, &site_name)?;

    let odata_version = headers.get("odata-version").and_then(|v| v.to_str().ok());
    if odata_version != Some("3.0") {
        return Err((StatusCode::BAD_REQUEST, "odata-version 3.0 required".to_string()));
    }
    let body: CamlQueryBody =
        serde_json::from_str(&body).map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid request body: {e}")))?;
    if body.query.metadata.type_name != "SP.CamlQuery" {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Unexpected entity type: {}", body.query.metadata.type_name),
        ));
    }
    if body.query.view_xml.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "ViewXml is required".to_string()));
    }

    let list = target_list(site, &selector)?;
    let expand: Vec<&str> = params
        .get("$expand")
        .map(|e| e.split(',').map(str::trim).collect())
        .unwrap_or_default();
    let limit = row_limit(&body.query.view_xml).unwrap_or(usize::MAX);
    let value: Vec<Value> = list.items.iter().take(limit).map(|i| item_json(i, &expand)).collect();
    Ok(Json(json!({ "value": value })))
}

async fn list_fields(
    State(db): State<Db>,
    Path((site_name, selector)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, Failure> {
    let site = site(&db, &site_name)?;
    let list = target_list(site, &selector)?;

    let mut fields: Vec<Value> = list
        .fields
        .iter()
        .map(|f| serde_json::to_value(f).map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())))
        .collect::<Result<_, _>>()?;

    if let Some(order_by) = params.get("$orderby").filter(|o| !o.is_empty()) {
        fields.sort_by_key(|f| sort_key(f, order_by));
    }

    let select: Vec<&str> = params
        .get("$select")
        .map(|s| s.split(',').map(str::trim).filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();
    if !select.is_empty() {
        fields = fields
            .into_iter()
            .map(|f| {
                let projected: Map<String, Value> = select
                    .iter()
                    .filter_map(|p| f.get(*p).map(|v| (p.to_string(), v.clone())))
                    .collect();
                Value::Object(projected)
            })
            .collect();
    }

    Ok(Json(json!({ "value": fields })))
}
