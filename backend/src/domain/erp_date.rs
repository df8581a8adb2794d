//! ERP value formats: `DD/MM/YYYY` dates, `S`/`N` flags, and identifiers
//! that arrive as either JSON strings or numbers.

use chrono::NaiveDate;
use mockable::Clock;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Error;

const ERP_FORMAT: &str = "%d/%m/%Y";
const ISO_FORMAT: &str = "%Y-%m-%d";

/// Calendar date in the ERP's `DD/MM/YYYY` representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ErpDate(NaiveDate);

impl ErpDate {
    /// Wrap a calendar date.
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today's date according to `clock`, taken in UTC.
    #[must_use]
    pub fn today(clock: &dyn Clock) -> Self {
        Self(clock.utc().date_naive())
    }

    /// Underlying calendar date.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }

    /// Parse ERP (`16/10/2026`, optionally followed by a time) or ISO
    /// (`2026-10-16`, optionally followed by `T…`) input.
    ///
    /// # Examples
    /// ```
    /// use crm_bff::domain::ErpDate;
    ///
    /// let erp = ErpDate::parse("16/10/2026 00:00:00").expect("erp form");
    /// let iso = ErpDate::parse("2026-10-16").expect("iso form");
    /// assert_eq!(erp, iso);
    /// assert_eq!(erp.to_string(), "16/10/2026");
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let date_part = trimmed
            .split(|c: char| c == ' ' || c == 'T')
            .next()
            .unwrap_or(trimmed);
        NaiveDate::parse_from_str(date_part, ERP_FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(date_part, ISO_FORMAT))
            .ok()
            .map(Self)
    }
}

impl std::fmt::Display for ErpDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(ERP_FORMAT))
    }
}

impl Serialize for ErpDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ErpDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognised date: {raw}")))
    }
}

/// Convert a client-supplied date into the ERP representation.
///
/// Blank input stays blank, values already containing `/` pass through
/// unchanged, and ISO dates are reformatted.
///
/// # Errors
/// Returns [`Error::invalid_request`] when the value is neither form.
///
/// # Examples
/// ```
/// use crm_bff::domain::to_erp_date;
///
/// assert_eq!(to_erp_date("2026-03-05").expect("iso"), "05/03/2026");
/// assert_eq!(to_erp_date("05/03/2026").expect("erp"), "05/03/2026");
/// assert_eq!(to_erp_date("").expect("blank"), "");
/// ```
pub fn to_erp_date(raw: &str) -> Result<String, Error> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    if trimmed.contains('/') {
        return Ok(trimmed.to_owned());
    }
    ErpDate::parse(trimmed)
        .map(|date| date.to_string())
        .ok_or_else(|| {
            Error::invalid_request(format!("unrecognised date: {trimmed}"))
                .with_details(serde_json::json!({ "field": "DATA_VENCIMENTO" }))
        })
}

/// Lenient parse of an optional ERP date column.
#[must_use]
pub fn parse_optional_date(raw: Option<&str>) -> Option<ErpDate> {
    raw.and_then(ErpDate::parse)
}

/// Serde adapter mapping `bool` to the ERP's `S`/`N` flag.
pub mod erp_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Text written for a set flag.
    pub const YES: &str = "S";
    /// Text written for a cleared flag.
    pub const NO: &str = "N";

    /// Flag text for `value`.
    #[must_use]
    pub const fn as_str(value: bool) -> &'static str {
        if value { YES } else { NO }
    }

    /// Whether ERP text represents a set flag.
    #[must_use]
    pub fn is_set(raw: &str) -> bool {
        raw.trim().eq_ignore_ascii_case(YES)
    }

    /// Serialise `value` as `S` or `N`.
    ///
    /// # Errors
    /// Propagates serializer failures.
    #[expect(
        clippy::trivially_copy_pass_by_ref,
        reason = "serde serialize_with passes fields by reference"
    )]
    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(as_str(*value))
    }

    /// Accept `S`/`N` text or a JSON boolean.
    ///
    /// # Errors
    /// Fails for values that are neither.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Flag {
            Bool(bool),
            Text(String),
        }

        match Flag::deserialize(deserializer)? {
            Flag::Bool(value) => Ok(value),
            Flag::Text(text) => Ok(is_set(&text)),
        }
    }
}

/// Deserialise an optional identifier sent as a string or a number.
///
/// Blank strings and `null` become `None`.
///
/// # Errors
/// Fails for values that are neither strings nor numbers.
pub fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        let text = match value {
            Raw::Text(text) => text.trim().to_owned(),
            Raw::Int(number) => number.to_string(),
            Raw::Float(number) => number.to_string(),
        };
        (!text.is_empty()).then_some(text)
    }))
}
