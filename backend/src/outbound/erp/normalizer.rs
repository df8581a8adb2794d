//! Flattening of the ERP's positional entity shape.
//!
//! `loadRecords` answers with field names in `metadata.fields.field` and one
//! object per row whose values sit under `f0`, `f1`, ... as `{"$": value}`.
//! The primary key may also arrive in a `$` side channel on the row itself.

use serde_json::{Map, Value};

use crate::domain::ErpRecord;

/// Convert an `entities` object into flat records, in ERP order.
///
/// `primary_key` names the key to read from each row's `$` side channel.
/// Missing or empty input yields no records; absent fields are omitted
/// rather than defaulted.
///
/// # Examples
/// ```
/// use crm_bff::outbound::erp::normalize_entities;
/// use serde_json::json;
///
/// let entities = json!({
///     "metadata": { "fields": { "field": [{ "name": "NOME" }, { "name": "COR" }] } },
///     "entity": { "$": { "CODFUNIL": "3" }, "f0": { "$": "Sales" }, "f1": {} }
/// });
/// let records = normalize_entities(&entities, Some("CODFUNIL"));
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].get("CODFUNIL"), Some("3"));
/// assert_eq!(records[0].get("NOME"), Some("Sales"));
/// assert_eq!(records[0].get("COR"), None);
/// ```
#[must_use]
pub fn normalize_entities(entities: &Value, primary_key: Option<&str>) -> Vec<ErpRecord> {
    let Some(entities) = entities.as_object() else {
        return Vec::new();
    };
    let field_names = field_names(entities);
    let rows: Vec<&Map<String, Value>> = match entities.get("entity") {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
        Some(Value::Object(item)) => vec![item],
        _ => Vec::new(),
    };

    rows.into_iter()
        .map(|row| normalize_row(row, &field_names, primary_key))
        .collect()
}

fn field_names(entities: &Map<String, Value>) -> Vec<String> {
    let name_of = |field: &Value| {
        field
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_owned)
    };
    let declared = entities
        .get("metadata")
        .and_then(|metadata| metadata.get("fields"))
        .and_then(|fields| fields.get("field"));
    match declared {
        Some(Value::Array(fields)) => fields.iter().filter_map(name_of).collect(),
        Some(field @ Value::Object(_)) => name_of(field).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn normalize_row(
    row: &Map<String, Value>,
    field_names: &[String],
    primary_key: Option<&str>,
) -> ErpRecord {
    let mut record = ErpRecord::default();
    let side_channel = primary_key.and_then(|key| {
        row.get("$")
            .and_then(|side| side.get(key))
            .and_then(scalar_text)
            .map(|value| (key, value))
    });
    if let Some((key, value)) = side_channel {
        record.insert(key, value);
    }
    for (index, name) in field_names.iter().enumerate() {
        let value = row
            .get(&format!("f{index}"))
            .and_then(|field| field.get("$"))
            .and_then(scalar_text);
        if let Some(value) = value {
            record.insert(name.as_str(), value);
        }
    }
    record
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
