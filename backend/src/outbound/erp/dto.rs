//! Wire payloads for the ERP `loadRecords` and `DatasetSP.save` services.
//!
//! Field values travel as an object keyed by each field's position in the
//! accompanying `fields` list; that indexing happens only here.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::endpoints::{load_service, save_service};
use super::expression::render;
use crate::domain::erp_date::erp_flag;
use crate::domain::ports::ErpGatewayError;
use crate::domain::{FieldValue, LoadRequest, SaveRequest, SortOrder};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<B> {
    service_name: &'static str,
    request_body: B,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoadBody<'a> {
    data_set: DataSet<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DataSet<'a> {
    root_entity: &'static str,
    include_presentation_fields: &'static str,
    offset_page: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<String>,
    entity: EntityFieldset,
    #[serde(skip_serializing_if = "Option::is_none")]
    criteria: Option<Expression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_by: Option<OrderBy<'a>>,
}

#[derive(Serialize)]
struct EntityFieldset {
    fieldset: FieldList,
}

#[derive(Serialize)]
struct FieldList {
    list: String,
}

#[derive(Serialize)]
struct Expression {
    expression: Dollar,
}

#[derive(Serialize)]
struct Dollar {
    #[serde(rename = "$")]
    value: String,
}

struct OrderBy<'a>(&'a [(&'static str, SortOrder)]);

impl Serialize for OrderBy<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, order) in self.0 {
            let direction = match order {
                SortOrder::Ascending => "ASC",
                SortOrder::Descending => "DESC",
            };
            map.serialize_entry(field, direction)?;
        }
        map.end()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveBody<'a> {
    entity_name: &'static str,
    stand_alone: bool,
    fields: Vec<&'static str>,
    records: [SaveRecord<'a>; 1],
}

#[derive(Serialize)]
struct SaveRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pk: Option<PrimaryKey<'a>>,
    values: IndexedValues<'a>,
}

struct PrimaryKey<'a> {
    field: &'static str,
    value: &'a str,
}

impl Serialize for PrimaryKey<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.field, self.value)?;
        map.end()
    }
}

struct IndexedValues<'a>(&'a [(&'static str, FieldValue)]);

impl Serialize for IndexedValues<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (index, (_, value)) in self.0.iter().enumerate() {
            map.serialize_entry(&index.to_string(), value)?;
        }
        map.end()
    }
}

fn to_value(payload: &impl Serialize) -> Result<Value, ErpGatewayError> {
    serde_json::to_value(payload).map_err(|error| ErpGatewayError::invalid_request(error.to_string()))
}

/// Encode a load request.
pub(crate) fn load_payload(request: &LoadRequest) -> Result<Value, ErpGatewayError> {
    let ordering = request.ordering();
    to_value(&Envelope {
        service_name: load_service(),
        request_body: LoadBody {
            data_set: DataSet {
                root_entity: request.schema().name,
                include_presentation_fields: erp_flag::as_str(request.presentation_fields()),
                offset_page: "0",
                limit: request.row_limit().map(|limit| limit.to_string()),
                entity: EntityFieldset {
                    fieldset: FieldList {
                        list: request.fields().join(", "),
                    },
                },
                criteria: request.criteria().map(|criteria| Expression {
                    expression: Dollar {
                        value: render(criteria),
                    },
                }),
                order_by: (!ordering.is_empty()).then_some(OrderBy(ordering)),
            },
        },
    })
}

/// Encode a save request.
pub(crate) fn save_payload(request: &SaveRequest) -> Result<Value, ErpGatewayError> {
    let schema = request.schema();
    to_value(&Envelope {
        service_name: save_service(),
        request_body: SaveBody {
            entity_name: schema.name,
            stand_alone: false,
            fields: request.values().iter().map(|(field, _)| *field).collect(),
            records: [SaveRecord {
                pk: request.primary_key().map(|value| PrimaryKey {
                    field: schema.primary_key,
                    value,
                }),
                values: IndexedValues(request.values()),
            }],
        },
    })
}
