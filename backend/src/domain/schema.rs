//! Static ERP entity schemas and the typed requests built against them.
//!
//! Services never assemble index-keyed value maps. They describe a write as an
//! ordered list of `(field, value)` pairs; construction validates every field
//! against the entity's [`EntitySchema`], and only the outbound adapter turns
//! the list into the ERP's positional wire shape.

use std::collections::BTreeMap;

use serde::Serialize;

use super::criteria::Criteria;

/// Fixed description of one ERP entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    /// ERP entity name, e.g. `AD_FUNIS`.
    pub name: &'static str,
    /// Primary key column carried in the `$` side channel.
    pub primary_key: &'static str,
    /// Columns available for projection and writes, in ERP order.
    pub fields: &'static [&'static str],
}

impl EntitySchema {
    /// Whether `field` is the primary key or a declared column.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        field == self.primary_key || self.fields.contains(&field)
    }

    fn check(&self, field: &'static str) -> Result<(), SchemaError> {
        if self.has_field(field) {
            Ok(())
        } else {
            Err(SchemaError::UnknownField {
                entity: self.name,
                field,
            })
        }
    }
}

/// Sales funnels.
pub const FUNNELS: EntitySchema = EntitySchema {
    name: "AD_FUNIS",
    primary_key: "CODFUNIL",
    fields: &[
        "NOME",
        "DESCRICAO",
        "COR",
        "ATIVO",
        "DATA_CRIACAO",
        "DATA_ATUALIZACAO",
    ],
};

/// Stages belonging to a funnel.
pub const FUNNEL_STAGES: EntitySchema = EntitySchema {
    name: "AD_FUNISESTAGIOS",
    primary_key: "CODESTAGIO",
    fields: &["CODFUNIL", "NOME", "ORDEM", "COR", "ATIVO"],
};

/// Funnel visibility grants for non-admin users.
pub const FUNNEL_PERMISSIONS: EntitySchema = EntitySchema {
    name: "AD_FUNISUSUARIOS",
    primary_key: "CODFUNILUSUARIO",
    fields: &["CODFUNIL", "CODUSUARIO", "ATIVO"],
};

/// Sales leads.
pub const LEADS: EntitySchema = EntitySchema {
    name: "AD_LEADS",
    primary_key: "CODLEAD",
    fields: &[
        "NOME",
        "DESCRICAO",
        "VALOR",
        "CODESTAGIO",
        "DATA_VENCIMENTO",
        "TIPO_TAG",
        "COR_TAG",
        "CODPARC",
        "CODFUNIL",
        "CODUSUARIO",
        "ATIVO",
        "DATA_CRIACAO",
        "DATA_ATUALIZACAO",
        "STATUS_LEAD",
        "MOTIVO_PERDA",
        "DATA_CONCLUSAO",
    ],
};

/// Application users. The key is also projected as a regular column.
pub const SALES_USERS: EntitySchema = EntitySchema {
    name: "AD_USUARIOSVENDAS",
    primary_key: "CODUSUARIO",
    fields: &[
        "CODUSUARIO",
        "NOME",
        "EMAIL",
        "FUNCAO",
        "STATUS",
        "AVATAR",
        "CODVEND",
        "SENHA",
    ],
};

/// Errors raised when a request does not fit its entity schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A field is not declared on the entity.
    #[error("{entity} has no field {field}")]
    UnknownField {
        entity: &'static str,
        field: &'static str,
    },
    /// The same field appears twice in one write.
    #[error("{entity}.{field} is written more than once")]
    DuplicateField {
        entity: &'static str,
        field: &'static str,
    },
    /// A write carries no values.
    #[error("write to {entity} carries no values")]
    EmptyWrite { entity: &'static str },
}

impl From<SchemaError> for super::Error {
    fn from(value: SchemaError) -> Self {
        Self::internal(value.to_string())
    }
}

/// Flat record produced by the entity normaliser.
///
/// Values are kept as the ERP's textual representation; absent columns are
/// simply missing from the map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErpRecord(BTreeMap<String, String>);

impl ErpRecord {
    /// Look up a column value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Column value, or the empty string when absent.
    #[must_use]
    pub fn text(&self, field: &str) -> String {
        self.get(field).unwrap_or_default().to_owned()
    }

    /// Column value when present and non-blank.
    #[must_use]
    pub fn non_blank(&self, field: &str) -> Option<String> {
        self.get(field)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    }

    /// Set a column value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    /// Number of columns present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no column is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ErpRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        )
    }
}

/// Value written to an ERP column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Textual value; the ERP accepts numbers and dates as text.
    Text(String),
    /// Explicit null, used to clear optional references.
    Null,
}

impl FieldValue {
    /// Text view of the value; `None` for [`FieldValue::Null`].
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Null => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }
}

/// Sort direction for a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// Typed read against one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    schema: &'static EntitySchema,
    fields: Vec<&'static str>,
    criteria: Option<Criteria>,
    order_by: Vec<(&'static str, SortOrder)>,
    limit: Option<u32>,
    include_presentation_fields: bool,
}

impl LoadRequest {
    /// Load every declared column of `schema` with no filter.
    #[must_use]
    pub fn new(schema: &'static EntitySchema) -> Self {
        Self {
            schema,
            fields: schema.fields.to_vec(),
            criteria: None,
            order_by: Vec::new(),
            limit: None,
            include_presentation_fields: true,
        }
    }

    /// Restrict the projection to `fields`.
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownField`] for undeclared columns.
    pub fn select(mut self, fields: &[&'static str]) -> Result<Self, SchemaError> {
        for &field in fields {
            self.schema.check(field)?;
        }
        self.fields = fields.to_vec();
        Ok(self)
    }

    /// Filter rows with `criteria`.
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownField`] when the criteria reference an
    /// undeclared column.
    pub fn filter(mut self, criteria: Criteria) -> Result<Self, SchemaError> {
        for field in criteria.fields() {
            self.schema.check(field)?;
        }
        self.criteria = Some(criteria);
        Ok(self)
    }

    /// Order rows by `field`.
    ///
    /// # Errors
    /// Returns [`SchemaError::UnknownField`] for undeclared columns.
    pub fn order_by(mut self, field: &'static str, order: SortOrder) -> Result<Self, SchemaError> {
        self.schema.check(field)?;
        self.order_by.push((field, order));
        Ok(self)
    }

    /// Cap the number of rows returned.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Toggle the ERP's presentation columns.
    #[must_use]
    pub fn include_presentation_fields(mut self, include: bool) -> Self {
        self.include_presentation_fields = include;
        self
    }

    /// Target entity.
    #[must_use]
    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    /// Projected columns.
    #[must_use]
    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }

    /// Row filter, if any.
    #[must_use]
    pub fn criteria(&self) -> Option<&Criteria> {
        self.criteria.as_ref()
    }

    /// Ordering clauses in priority order.
    #[must_use]
    pub fn ordering(&self) -> &[(&'static str, SortOrder)] {
        &self.order_by
    }

    /// Row cap, if any.
    #[must_use]
    pub fn row_limit(&self) -> Option<u32> {
        self.limit
    }

    /// Whether presentation columns are requested.
    #[must_use]
    pub fn presentation_fields(&self) -> bool {
        self.include_presentation_fields
    }
}

/// Typed single-record write against one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    schema: &'static EntitySchema,
    primary_key: Option<String>,
    values: Vec<(&'static str, FieldValue)>,
}

impl SaveRequest {
    /// Insert a new row.
    ///
    /// # Errors
    /// Returns a [`SchemaError`] for unknown, duplicated, or missing values.
    pub fn insert(
        schema: &'static EntitySchema,
        values: Vec<(&'static str, FieldValue)>,
    ) -> Result<Self, SchemaError> {
        Self::build(schema, None, values)
    }

    /// Update the row identified by `primary_key`.
    ///
    /// # Errors
    /// Returns a [`SchemaError`] for unknown, duplicated, or missing values.
    pub fn update(
        schema: &'static EntitySchema,
        primary_key: impl Into<String>,
        values: Vec<(&'static str, FieldValue)>,
    ) -> Result<Self, SchemaError> {
        Self::build(schema, Some(primary_key.into()), values)
    }

    fn build(
        schema: &'static EntitySchema,
        primary_key: Option<String>,
        values: Vec<(&'static str, FieldValue)>,
    ) -> Result<Self, SchemaError> {
        if values.is_empty() {
            return Err(SchemaError::EmptyWrite {
                entity: schema.name,
            });
        }
        for (position, &(field, _)) in values.iter().enumerate() {
            schema.check(field)?;
            if values
                .iter()
                .take(position)
                .any(|&(earlier, _)| earlier == field)
            {
                return Err(SchemaError::DuplicateField {
                    entity: schema.name,
                    field,
                });
            }
        }
        Ok(Self {
            schema,
            primary_key,
            values,
        })
    }

    /// Target entity.
    #[must_use]
    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    /// Key of the row being updated; `None` for inserts.
    #[must_use]
    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// Ordered column writes.
    #[must_use]
    pub fn values(&self) -> &[(&'static str, FieldValue)] {
        &self.values
    }

    /// Value written to `field`, if any.
    #[must_use]
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }
}
