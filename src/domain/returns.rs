use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Remote item identifier. The returns API hands out both numeric and string
/// ids, and they are sent back in the same form.
///
/// Any other JSON is accepted as text so that one odd id cannot fail a whole
/// lookup.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(u64),
    Text(String),
}

impl ItemId {
    /// `0` and `""` do not identify anything.
    pub fn is_blank(&self) -> bool {
        match self {
            ItemId::Number(n) => *n == 0,
            ItemId::Text(s) => s.is_empty(),
        }
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => ItemId::Text(s),
            Value::Number(n) => match n.as_u64() {
                Some(n) => ItemId::Number(n),
                None => ItemId::Text(n.to_string()),
            },
            other => ItemId::Text(other.to_string()),
        })
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{}", n),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

/// A product line within a return.
///
/// Everything except the id is kept as raw JSON: the remote is loose about
/// types (numeric SKUs, string quantities, flags or dates as markers), and
/// values are only ever rendered. Fields not modelled here live in `extra`
/// and survive merges untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_inspected: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspected_date: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_arrived: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrived_date: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// The id, unless it is missing or blank.
    pub fn confirmable_id(&self) -> Option<&ItemId> {
        self.id.as_ref().filter(|id| !id.is_blank())
    }

    pub fn inspected(&self) -> bool {
        marker(&self.is_inspected) || marker(&self.inspected_date)
    }

    pub fn arrived(&self) -> bool {
        marker(&self.is_arrived) || marker(&self.arrived_date)
    }

    pub fn status(&self) -> ItemStatus {
        ItemStatus::of(self)
    }

    pub fn display_name(&self) -> String {
        shown(&self.name)
            .or_else(|| shown(&self.title))
            .unwrap_or_else(|| "Item".to_string())
    }

    pub fn display_sku(&self) -> String {
        shown(&self.sku).unwrap_or_else(|| "—".to_string())
    }

    /// Only a missing or `null` quantity falls back to 1; `0` is shown as is.
    pub fn display_quantity(&self) -> String {
        match &self.quantity {
            None | Some(Value::Null) => "1".to_string(),
            Some(value) => render(value),
        }
    }

    /// What the "Copy SKU" button puts on the clipboard: the SKU, else the id.
    pub fn copy_value(&self) -> String {
        shown(&self.sku)
            .or_else(|| self.id.as_ref().map(ToString::to_string))
            .unwrap_or_default()
    }

    /// Overwrite every field named in `patch`; everything else is kept.
    pub fn merge(&mut self, patch: &Map<String, Value>) -> Result<(), serde_json::Error> {
        let mut fields = match serde_json::to_value(&*self)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        for (key, value) in patch {
            fields.insert(key.clone(), value.clone());
        }
        *self = serde_json::from_value(Value::Object(fields))?;
        Ok(())
    }
}

/// Derived, never stored. Precedence is Inspected > Arrived > Registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Registered,
    Arrived,
    Inspected,
}

impl ItemStatus {
    pub fn of(item: &Item) -> Self {
        if item.inspected() {
            ItemStatus::Inspected
        } else if item.arrived() {
            ItemStatus::Arrived
        } else {
            ItemStatus::Registered
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ItemStatus::Registered => "Registered",
            ItemStatus::Arrived => "Arrived",
            ItemStatus::Inspected => "Inspected",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A customer return as held for the current session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerReturn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rma: Option<Value>,
    #[serde(default, deserialize_with = "lenient_items")]
    pub items: Vec<Item>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CustomerReturn {
    pub fn display_order_number(&self) -> Option<String> {
        shown(&self.order_number)
    }

    pub fn display_rma(&self) -> String {
        shown(&self.rma).unwrap_or_else(|| "—".to_string())
    }
}

/// JSON truthiness: `null`, `false`, `0` and `""` are false.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text for a JSON value: strings unquoted, everything else as JSON.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn marker(value: &Option<Value>) -> bool {
    value.as_ref().map(truthy).unwrap_or(false)
}

/// Rendered text of a truthy value.
fn shown(value: &Option<Value>) -> Option<String> {
    value.as_ref().filter(|v| truthy(v)).map(render)
}

/// A missing, `null` or non-array `items` is empty; entries that are not
/// item objects are skipped.
fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<Item>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(entries) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                log::warn!("Skipping unreadable return item: {}", e);
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: Value) -> Item {
        serde_json::from_value(value).expect("valid item")
    }

    #[test]
    fn inspected_wins_over_arrived() {
        let it = item(json!({ "id": 1, "is_inspected": true, "is_arrived": true }));
        assert_eq!(it.status().label(), "Inspected");
    }

    #[test]
    fn arrived_when_not_inspected() {
        let it = item(json!({ "id": 1, "is_arrived": true, "is_inspected": false }));
        assert_eq!(it.status().label(), "Arrived");
    }

    #[test]
    fn registered_when_no_markers() {
        assert_eq!(item(json!({ "id": 1 })).status(), ItemStatus::Registered);
    }

    #[test]
    fn dates_count_as_markers() {
        let arrived = item(json!({ "id": 1, "arrived_date": "2024-01-01" }));
        assert_eq!(arrived.status(), ItemStatus::Arrived);

        let inspected = item(json!({ "id": 1, "inspected_date": "2024-01-02", "is_inspected": null }));
        assert_eq!(inspected.status(), ItemStatus::Inspected);

        let blank = item(json!({ "id": 1, "inspected_date": "" }));
        assert_eq!(blank.status(), ItemStatus::Registered);
    }

    #[test]
    fn display_fallbacks() {
        let it = item(json!({ "id": 42, "title": "Blue shirt" }));
        assert_eq!(it.display_name(), "Blue shirt");
        assert_eq!(it.display_sku(), "—");
        assert_eq!(it.display_quantity(), "1");
        assert_eq!(it.copy_value(), "42");

        let bare = item(json!({ "id": "abc", "name": "", "sku": "SKU-1", "quantity": 3 }));
        assert_eq!(bare.display_name(), "Item");
        assert_eq!(bare.copy_value(), "SKU-1");
        assert_eq!(bare.display_quantity(), "3");
    }

    #[test]
    fn loosely_typed_fields_are_rendered() {
        let it = item(json!({ "id": 5, "name": 777, "sku": 123456, "quantity": "2" }));
        assert_eq!(it.display_name(), "777");
        assert_eq!(it.display_sku(), "123456");
        assert_eq!(it.copy_value(), "123456");
        assert_eq!(it.display_quantity(), "2");

        assert_eq!(item(json!({ "id": 5, "quantity": 1.0 })).display_quantity(), "1.0");
        assert_eq!(item(json!({ "id": 5, "quantity": 0 })).display_quantity(), "0");
        assert_eq!(item(json!({ "id": 5, "quantity": null })).display_quantity(), "1");
    }

    #[test]
    fn unusual_ids_are_kept_as_text() {
        assert_eq!(item(json!({ "id": -4 })).id, Some(ItemId::Text("-4".into())));
        assert_eq!(item(json!({ "id": 2.5 })).id, Some(ItemId::Text("2.5".into())));
        assert_eq!(item(json!({ "id": null })).id, None);
    }

    #[test]
    fn blank_ids_are_not_confirmable() {
        assert!(item(json!({ "id": 0 })).confirmable_id().is_none());
        assert!(item(json!({ "id": "" })).confirmable_id().is_none());
        assert!(item(json!({ "name": "no id" })).confirmable_id().is_none());
        assert_eq!(
            item(json!({ "id": "X1" })).confirmable_id(),
            Some(&ItemId::Text("X1".into()))
        );
    }

    #[test]
    fn merge_overwrites_only_patched_fields() {
        let mut it = item(json!({
            "id": 9,
            "name": "Boots",
            "sku": "B-9",
            "quantity": 2,
            "is_inspected": false,
            "warehouse": "north"
        }));
        let patch = json!({ "id": 9, "is_inspected": true, "inspected_date": "2024-01-01" });
        it.merge(patch.as_object().expect("object")).expect("merge");

        assert_eq!(it.id, Some(ItemId::Number(9)));
        assert_eq!(it.is_inspected, Some(json!(true)));
        assert_eq!(it.inspected_date, Some(json!("2024-01-01")));
        assert_eq!(it.name, Some(json!("Boots")));
        assert_eq!(it.sku, Some(json!("B-9")));
        assert_eq!(it.quantity, Some(json!(2)));
        assert_eq!(it.extra.get("warehouse"), Some(&json!("north")));
    }

    #[test]
    fn merge_accepts_loosely_typed_patch() {
        let mut it = item(json!({ "id": 9, "sku": "B-9" }));
        let patch = json!({ "sku": 99, "quantity": "4", "inspected_date": "2024-01-01" });
        it.merge(patch.as_object().expect("object")).expect("merge");

        assert_eq!(it.display_sku(), "99");
        assert_eq!(it.display_quantity(), "4");
        assert!(it.inspected());
    }

    #[test]
    fn unknown_fields_round_trip() {
        let raw = json!({ "id": "r-1", "name": "Hat", "reason": "too small", "photos": [1, 2] });
        let it = item(raw.clone());
        assert_eq!(serde_json::to_value(&it).expect("serialize"), raw);
    }

    #[test]
    fn return_with_null_items_is_empty() {
        let ret: CustomerReturn =
            serde_json::from_value(json!({ "order_number": "1001", "items": null })).expect("valid");
        assert!(ret.items.is_empty());
        assert_eq!(ret.display_rma(), "—");
    }

    #[test]
    fn numeric_order_number_and_rma_are_accepted() {
        let ret: CustomerReturn = serde_json::from_value(json!({
            "order_number": 1001,
            "rma": 55,
            "items": [{ "id": 1, "sku": 123456 }, "garbage", { "id": 2 }]
        }))
        .expect("valid");
        assert_eq!(ret.display_order_number().as_deref(), Some("1001"));
        assert_eq!(ret.display_rma(), "55");
        assert_eq!(ret.items.len(), 2);
        assert_eq!(ret.items[0].display_sku(), "123456");
    }

    #[test]
    fn non_array_items_are_empty() {
        let ret: CustomerReturn =
            serde_json::from_value(json!({ "order_number": "1", "items": "none" })).expect("valid");
        assert!(ret.items.is_empty());
    }

    #[test]
    fn truthiness_follows_json_rules() {
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(truthy(&json!(1)));
        assert!(truthy(&json!("yes")));
        assert!(truthy(&json!({})));
    }
}
