//! Read-only nutrition dataset, loaded once from CSV at startup and shared
//! immutably across requests. Rows keep every column from the file because
//! the API returns whole records.

use std::io::Read;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::state::AppState;
use axum::Router;

pub mod handlers;

pub struct FoodCatalog {
    rows: Vec<Map<String, Value>>,
    has_fdc_id: bool,
}

/// Numbers stay numbers so clients can do arithmetic on nutrient columns;
/// everything else stays a string. Empty cells become null.
fn coerce(field: &str) -> Value {
    if field.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = field.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = field.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::from(field)
}

impl FoodCatalog {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers()?.clone();
        let has_fdc_id = headers.iter().any(|h| h == "fdcId");

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let mut row = Map::new();
            for (header, field) in headers.iter().zip(record.iter()) {
                row.insert(header.to_string(), coerce(field));
            }
            rows.push(row);
        }
        Ok(Self { rows, has_fdc_id })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Case-insensitive substring match on the name column.
    pub fn search(&self, query: &str) -> Result<Vec<Value>, ApiError> {
        if query.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "Query parameter is required".into(),
            ));
        }
        if self.rows.is_empty() {
            return Err(ApiError::Unavailable("Food database is empty".into()));
        }
        let needle = query.to_lowercase();
        let matches = self
            .rows
            .iter()
            .filter(|row| {
                row.get("name")
                    .and_then(Value::as_str)
                    .map(|name| name.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .cloned()
            .map(Value::Object)
            .collect();
        Ok(matches)
    }

    pub fn get_by_id(&self, fdc_id: i64) -> Result<Value, ApiError> {
        if self.rows.is_empty() {
            return Err(ApiError::Unavailable("Food database is empty".into()));
        }
        if !self.has_fdc_id {
            return Err(ApiError::Unavailable(
                "Food database has no fdcId column".into(),
            ));
        }
        self.rows
            .iter()
            .find(|row| row.get("fdcId").and_then(id_as_i64) == Some(fdc_id))
            .cloned()
            .map(Value::Object)
            .ok_or_else(|| ApiError::NotFound("Food item not found".into()))
    }
}

/// Id cells sometimes carry a decimal point in exported datasets ("1001.0");
/// an integral float still identifies the same record.
fn id_as_i64(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

pub fn router() -> Router<AppState> {
    handlers::catalog_routes()
}
