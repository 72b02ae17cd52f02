//! Wire DTOs for the list REST endpoints.
//!
//! # Design
//! Item and field payloads are left as `serde_json::Value` because their
//! shape depends on the list schema. Only the envelopes the gateway itself
//! reads or writes are typed here.

use serde::{Deserialize, Serialize};

/// OData type marker the remote store expects on a CAML query body.
pub const CAML_QUERY_TYPE: &str = "SP.CamlQuery";

/// Sort key used by `get_list_fields` when the caller supplies none.
pub const DEFAULT_FIELDS_ORDER_BY: &str = "InternalName";

/// Body of a `GetItems` POST: `{ "query": { "__metadata": {..}, "ViewXml": .. } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CamlQueryEnvelope {
    pub query: CamlQuery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CamlQuery {
    #[serde(rename = "__metadata")]
    pub metadata: ODataMetadata,
    #[serde(rename = "ViewXml")]
    pub view_xml: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ODataMetadata {
    #[serde(rename = "type")]
    pub type_name: String,
}

impl CamlQueryEnvelope {
    /// Wrap a CAML `<View>` document verbatim.
    pub fn new(view_xml: &str) -> Self {
        Self {
            query: CamlQuery {
                metadata: ODataMetadata {
                    type_name: CAML_QUERY_TYPE.to_string(),
                },
                view_xml: view_xml.to_string(),
            },
        }
    }
}

/// Response of the list-enumeration endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ListCollection {
    pub value: Vec<ListTitle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListTitle {
    #[serde(rename = "Title")]
    pub title: String,
}

/// `$select` and `$orderby` values for a fields request, before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldsQuery {
    pub select: String,
    pub order_by: String,
}

impl FieldsQuery {
    /// No selection yields an empty select clause, which the remote store
    /// treats as its default field set. An absent or empty sort key falls
    /// back to `InternalName`.
    pub fn new<S: AsRef<str>>(select: Option<&[S]>, order_by: Option<&str>) -> Self {
        let select = select
            .map(|fields| fields.iter().map(|f| f.as_ref()).collect::<Vec<&str>>().join(","))
            .unwrap_or_default();
        let order_by = order_by
            .filter(|o| !o.is_empty())
            .unwrap_or(DEFAULT_FIELDS_ORDER_BY)
            .to_string();
        Self { select, order_by }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_with_odata_names() {
        let env = CamlQueryEnvelope::new("<View><RowLimit>5</RowLimit></View>");
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["query"]["__metadata"]["type"], "SP.CamlQuery");
        assert_eq!(json["query"]["ViewXml"], "<View><RowLimit>5</RowLimit></View>");
        assert_eq!(json.as_object().unwrap().len(), 1);
    }

    #[test]
    fn fields_query_defaults() {
        let q = FieldsQuery::new::<&str>(None, None);
        assert_eq!(q.select, "");
        assert_eq!(q.order_by, "InternalName");
    }

    #[test]
    fn fields_query_joins_selection_in_order() {
        let q = FieldsQuery::new(Some(&["Title", "ID"][..]), Some("Title"));
        assert_eq!(q.select, "Title,ID");
        assert_eq!(q.order_by, "Title");
    }

    #[test]
    fn fields_query_empty_selection_and_sort_key() {
        let empty: [String; 0] = [];
        let q = FieldsQuery::new(Some(&empty[..]), Some(""));
        assert_eq!(q.select, "");
        assert_eq!(q.order_by, "InternalName");
    }

    #[test]
    fn list_collection_ignores_extra_properties() {
        let raw = r#"{"odata.metadata":"x","value":[{"Title":"Tasks","Id":"1"}]}"#;
        let lists: ListCollection = serde_json::from_str(raw).unwrap();
        assert_eq!(lists.value.len(), 1);
        assert_eq!(lists.value[0].title, "Tasks");
    }
}
