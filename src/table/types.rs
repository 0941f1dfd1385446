use chrono::{NaiveDate, NaiveDateTime};
use postgres::types::ToSql;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use std::fmt::{self, Display};

/// Storage type for a report column, guessed from the column name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PgType {
    Date,
    Text,
    Integer,
    Numeric,
}

impl PgType {
    /// Name-based heuristic, case-insensitive, first match wins.  The
    /// reports spell month columns like "BillMonth" as plain text, so
    /// "month" never maps to DATE.
    pub fn infer(column: &str) -> PgType {
        let col = column.to_lowercase();
        if col.contains("date") && col != "billmonth" {
            PgType::Date
        } else if col.contains("month") {
            PgType::Text
        } else if ["qty", "points"].iter().any(|x| col.contains(x)) {
            PgType::Integer
        } else if ["amount", "price", "gst", "disc", "charges", "percent", "volume"]
            .iter()
            .any(|x| col.contains(x))
        {
            PgType::Numeric
        } else {
            PgType::Text
        }
    }
}

impl Display for PgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PgType::Date => write!(f, "DATE"),
            PgType::Text => write!(f, "TEXT"),
            PgType::Integer => write!(f, "INTEGER"),
            PgType::Numeric => write!(f, "NUMERIC(10,2)"),
        }
    }
}

/// A cell coerced for insertion.  Every variant carries an Option so a
/// NULL still binds with the type of its column.
#[derive(Debug, PartialEq)]
pub enum SqlValue {
    Int(Option<i32>),
    Numeric(Option<Decimal>),
    Date(Option<NaiveDate>),
    Text(Option<String>),
}

impl SqlValue {
    pub fn as_tosql(&self) -> &(dyn ToSql + Sync) {
        match self {
            SqlValue::Int(v) => v,
            SqlValue::Numeric(v) => v,
            SqlValue::Date(v) => v,
            SqlValue::Text(v) => v,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(
            self,
            SqlValue::Int(None)
                | SqlValue::Numeric(None)
                | SqlValue::Date(None)
                | SqlValue::Text(None)
        )
    }
}

/// Coerce a raw cell to its column type.  Unparseable values and the
/// usual missing-data sentinels become NULL rather than an error.
pub fn clean_value(value: &Value, target: PgType) -> SqlValue {
    if is_missing(value) {
        return match target {
            PgType::Integer => SqlValue::Int(None),
            PgType::Numeric => SqlValue::Numeric(None),
            PgType::Date => SqlValue::Date(None),
            PgType::Text => SqlValue::Text(None),
        };
    }
    let raw = raw_str(value);
    match target {
        PgType::Numeric => {
            SqlValue::Numeric(raw.trim().parse::<f64>().ok().and_then(Decimal::from_f64))
        }
        PgType::Integer => {
            SqlValue::Int(raw.trim().parse::<f64>().ok().map(|x| x.trunc() as i32))
        }
        PgType::Date => SqlValue::Date(parse_date(raw.trim())),
        PgType::Text => SqlValue::Text(Some(raw.trim().to_string())),
    }
}

fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => matches!(s.trim().to_uppercase().as_str(), "" | "N/A" | "NA"),
        _ => false,
    }
}

fn raw_str(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Accept the calendar formats seen in the reports.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    ["%Y-%m-%d", "%m/%d/%Y", "%d-%b-%Y", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}
