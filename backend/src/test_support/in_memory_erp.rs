//! In-memory [`ErpGateway`] that evaluates typed criteria over local tables.
//!
//! Keys are auto-incremented per entity. Every load and save is recorded so
//! tests can assert on the exact requests a service issued.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{ErpGateway, ErpGatewayError, SaveOutcome};
use crate::domain::{
    Criteria, CriteriaValue, EntitySchema, ErpRecord, FieldValue, LoadRequest, SaveRequest,
    SortOrder,
};

#[derive(Default)]
struct Table {
    last_key: i64,
    rows: Vec<ErpRecord>,
}

#[derive(Default)]
struct State {
    tables: HashMap<&'static str, Table>,
    loads: Vec<LoadRequest>,
    saves: Vec<SaveRequest>,
}

/// ERP stand-in holding one table per entity.
pub struct InMemoryErpGateway {
    state: Mutex<State>,
    echo_keys: bool,
}

impl Default for InMemoryErpGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryErpGateway {
    /// Gateway that echoes generated keys on insert.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            echo_keys: true,
        }
    }

    /// Gateway that never echoes keys, forcing callers onto their fallback.
    #[must_use]
    pub fn without_key_echo() -> Self {
        Self {
            echo_keys: false,
            ..Self::new()
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Insert a row directly and return its generated key.
    pub fn seed(&self, schema: &'static EntitySchema, values: &[(&str, &str)]) -> String {
        let mut state = self.lock();
        let table = state.tables.entry(schema.name).or_default();
        table.last_key += 1;
        let key = table.last_key.to_string();
        let mut row: ErpRecord = values.iter().copied().collect();
        row.insert(schema.primary_key, key.clone());
        table.rows.push(row);
        key
    }

    /// Every stored row of `schema`, in insertion order.
    #[must_use]
    pub fn rows(&self, schema: &EntitySchema) -> Vec<ErpRecord> {
        self.lock()
            .tables
            .get(schema.name)
            .map(|table| table.rows.clone())
            .unwrap_or_default()
    }

    /// Loads issued so far.
    #[must_use]
    pub fn loads(&self) -> Vec<LoadRequest> {
        self.lock().loads.clone()
    }

    /// Number of loads issued against `schema`.
    #[must_use]
    pub fn load_count(&self, schema: &EntitySchema) -> usize {
        self.lock()
            .loads
            .iter()
            .filter(|load| load.schema().name == schema.name)
            .count()
    }

    /// Saves issued so far.
    #[must_use]
    pub fn saves(&self) -> Vec<SaveRequest> {
        self.lock().saves.clone()
    }
}

fn apply(row: &mut ErpRecord, values: &[(&'static str, FieldValue)]) {
    for (field, value) in values {
        row.insert(*field, value.as_text().unwrap_or_default());
    }
}

fn value_matches(stored: Option<&str>, expected: &CriteriaValue) -> bool {
    let Some(stored) = stored else {
        return false;
    };
    match expected {
        CriteriaValue::Number(number) => stored.trim().parse::<i64>().ok() == Some(*number),
        CriteriaValue::Text(text) => stored == text,
    }
}

fn matches(criteria: &Criteria, row: &ErpRecord) -> bool {
    match criteria {
        Criteria::Eq(field, value) => value_matches(row.get(field), value),
        Criteria::EqIgnoreCase(field, value) => row
            .get(field)
            .is_some_and(|stored| stored.to_uppercase() == value.to_uppercase()),
        Criteria::ContainsIgnoreCase(field, value) => row
            .get(field)
            .is_some_and(|stored| stored.to_uppercase().contains(&value.to_uppercase())),
        Criteria::In(field, values) => values
            .iter()
            .any(|value| value_matches(row.get(field), value)),
        Criteria::And(clauses) => clauses.iter().all(|clause| matches(clause, row)),
        Criteria::Or(clauses) => clauses.iter().any(|clause| matches(clause, row)),
    }
}

fn compare_column(left: Option<&str>, right: Option<&str>) -> Ordering {
    let numeric = |raw: Option<&str>| raw.and_then(|value| value.trim().parse::<i64>().ok());
    match (numeric(left), numeric(right)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => left.cmp(&right),
    }
}

fn project(row: &ErpRecord, request: &LoadRequest) -> ErpRecord {
    let key = request.schema().primary_key;
    let mut projected: ErpRecord = request
        .fields()
        .iter()
        .filter_map(|field| row.get(field).map(|value| (*field, value.to_owned())))
        .collect();
    if let Some(value) = row.get(key) {
        projected.insert(key, value);
    }
    projected
}

#[async_trait]
impl ErpGateway for InMemoryErpGateway {
    async fn load(&self, request: &LoadRequest) -> Result<Vec<ErpRecord>, ErpGatewayError> {
        let mut state = self.lock();
        state.loads.push(request.clone());

        let mut rows: Vec<ErpRecord> = state
            .tables
            .get(request.schema().name)
            .map(|table| {
                table
                    .rows
                    .iter()
                    .filter(|row| request.criteria().is_none_or(|criteria| matches(criteria, row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        for &(field, order) in request.ordering().iter().rev() {
            rows.sort_by(|a, b| {
                let ordering = compare_column(a.get(field), b.get(field));
                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = request.row_limit() {
            rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }

        Ok(rows.iter().map(|row| project(row, request)).collect())
    }

    async fn save(&self, request: &SaveRequest) -> Result<SaveOutcome, ErpGatewayError> {
        let mut state = self.lock();
        state.saves.push(request.clone());
        let schema = request.schema();
        let table = state.tables.entry(schema.name).or_default();

        if let Some(key) = request.primary_key() {
            let row = table
                .rows
                .iter_mut()
                .find(|row| row.get(schema.primary_key) == Some(key))
                .ok_or_else(|| {
                    ErpGatewayError::rejected(format!("{} {key} not found", schema.name))
                })?;
            apply(row, request.values());
            return Ok(SaveOutcome::default());
        }

        table.last_key += 1;
        let key = table.last_key.to_string();
        let mut row = ErpRecord::default();
        apply(&mut row, request.values());
        row.insert(schema.primary_key, key.clone());
        table.rows.push(row);

        Ok(if self.echo_keys {
            SaveOutcome::with_key(key)
        } else {
            SaveOutcome::default()
        })
    }
}
