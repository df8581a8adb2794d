//! Typed row filters for ERP loads.
//!
//! Services compose [`Criteria`] trees; the outbound adapter renders them to
//! the ERP expression language, and the in-memory test gateway evaluates
//! them directly.

/// Literal compared against a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CriteriaValue {
    /// Unquoted integer literal.
    Number(i64),
    /// Quoted text literal.
    Text(String),
}

impl CriteriaValue {
    /// Interpret an identifier: integers stay numeric, anything else is text.
    ///
    /// # Examples
    /// ```
    /// use crm_bff::domain::CriteriaValue;
    ///
    /// assert_eq!(CriteriaValue::key("42"), CriteriaValue::Number(42));
    /// assert_eq!(CriteriaValue::key("A-1"), CriteriaValue::Text("A-1".into()));
    /// ```
    #[must_use]
    pub fn key(raw: &str) -> Self {
        let trimmed = raw.trim();
        trimmed
            .parse::<i64>()
            .map_or_else(|_| Self::Text(trimmed.to_owned()), Self::Number)
    }

    /// Textual form used for comparisons against stored column values.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value.clone(),
        }
    }
}

impl From<i64> for CriteriaValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for CriteriaValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Boolean filter over entity columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criteria {
    /// `FIELD = value`.
    Eq(&'static str, CriteriaValue),
    /// `UPPER(FIELD) = UPPER(value)`.
    EqIgnoreCase(&'static str, String),
    /// Literal substring match, `UPPER(FIELD) LIKE '%UPPER(value)%'` with wildcards escaped.
    ContainsIgnoreCase(&'static str, String),
    /// `FIELD IN (values...)`.
    In(&'static str, Vec<CriteriaValue>),
    /// Every clause holds.
    And(Vec<Criteria>),
    /// At least one clause holds.
    Or(Vec<Criteria>),
}

impl Criteria {
    /// `FIELD = value`.
    pub fn eq(field: &'static str, value: impl Into<CriteriaValue>) -> Self {
        Self::Eq(field, value.into())
    }

    /// Rows whose soft-delete flag is set.
    #[must_use]
    pub fn active() -> Self {
        Self::eq("ATIVO", "S")
    }

    /// Rows that have been soft-deleted.
    #[must_use]
    pub fn inactive() -> Self {
        Self::eq("ATIVO", "N")
    }

    /// Conjunction that flattens nested `And`s.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::And(mut clauses) => {
                clauses.push(other);
                Self::And(clauses)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Every column referenced by this tree, in first-seen order.
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields(&self, out: &mut Vec<&'static str>) {
        match self {
            Self::Eq(field, _)
            | Self::EqIgnoreCase(field, _)
            | Self::ContainsIgnoreCase(field, _)
            | Self::In(field, _) => {
                if !out.contains(field) {
                    out.push(*field);
                }
            }
            Self::And(clauses) | Self::Or(clauses) => {
                for clause in clauses {
                    clause.collect_fields(out);
                }
            }
        }
    }

    /// Whether any clause constrains `field`.
    #[must_use]
    pub fn references(&self, field: &str) -> bool {
        self.fields().iter().any(|candidate| *candidate == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::integer("15", CriteriaValue::Number(15))]
    #[case::padded(" 15 ", CriteriaValue::Number(15))]
    #[case::negative("-3", CriteriaValue::Number(-3))]
    #[case::alphanumeric("15a", CriteriaValue::Text("15a".into()))]
    fn key_detects_numeric_identifiers(#[case] raw: &str, #[case] expected: CriteriaValue) {
        assert_eq!(CriteriaValue::key(raw), expected);
    }

    #[rstest]
    fn and_flattens_nested_conjunctions() {
        let criteria = Criteria::active()
            .and(Criteria::eq("CODUSUARIO", 4_i64))
            .and(Criteria::eq("CODFUNIL", 2_i64));
        let Criteria::And(clauses) = criteria else {
            panic!("expected conjunction");
        };
        assert_eq!(clauses.len(), 3);
    }

    #[rstest]
    fn fields_are_deduplicated() {
        let criteria = Criteria::Or(vec![
            Criteria::ContainsIgnoreCase("NOME", "ana".into()),
            Criteria::ContainsIgnoreCase("EMAIL", "ana".into()),
            Criteria::EqIgnoreCase("NOME", "ana".into()),
        ]);
        assert_eq!(criteria.fields(), ["NOME", "EMAIL"]);
        assert!(criteria.references("EMAIL"));
        assert!(!criteria.references("CODUSUARIO"));
    }
}
