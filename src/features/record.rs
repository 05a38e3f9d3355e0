use crate::error::InferenceError;
use serde_json::{Map, Value};

/// One sale as received from a caller or read from the sales history.
pub type RawRecord = Map<String, Value>;

pub const ZIPCODE_COLUMN: &str = "zipcode";
pub const PRICE_COLUMN: &str = "price";
pub const ZIPCODE_WIDTH: usize = 5;

/// Columns a prediction task must supply, in feature order.
pub const SALES_COLUMN_SELECTION: [&str; 8] = [
    "bedrooms",
    "bathrooms",
    "sqft_living",
    "sqft_lot",
    "floors",
    "sqft_above",
    "sqft_basement",
    ZIPCODE_COLUMN,
];

/// Reads a numeric field. Numbers and numeric strings are accepted,
/// `null` and blank strings become NaN.
pub fn numeric_field(record: &RawRecord, field: &str) -> Result<f64, InferenceError> {
    let value = record
        .get(field)
        .ok_or_else(|| InferenceError::MissingField(field.to_string()))?;

    let invalid = |reason: &str| InferenceError::InvalidField {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    match value {
        Value::Null => Ok(f64::NAN),
        Value::Number(n) => n.as_f64().ok_or_else(|| invalid("number out of range")),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(f64::NAN);
            }
            s.parse::<f64>()
                .map_err(|_| invalid(&format!("expected a number, got {:?}", s)))
        }
        _ => Err(invalid("expected a number")),
    }
}

/// Normalizes a zipcode to its fixed-width string form.
pub fn normalize_zipcode(value: &Value) -> Result<String, InferenceError> {
    let invalid = |reason: String| InferenceError::InvalidField {
        field: ZIPCODE_COLUMN.to_string(),
        reason,
    };

    match value {
        Value::String(s) => normalize_zipcode_str(s).ok_or_else(|| invalid("empty zipcode".into())),
        Value::Number(n) => {
            if let Some(code) = n.as_u64() {
                return Ok(pad_zipcode(&code.to_string()));
            }
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => {
                    Ok(pad_zipcode(&(f as u64).to_string()))
                }
                _ => Err(invalid(format!("{} is not a valid zipcode", n))),
            }
        }
        Value::Null => Err(invalid("zipcode is null".into())),
        other => Err(invalid(format!("unsupported zipcode value {}", other))),
    }
}

/// String form of [`normalize_zipcode`]; also used for the demographics key
/// column. Returns `None` for blank input.
pub fn normalize_zipcode_str(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        Some(pad_zipcode(trimmed))
    } else {
        Some(trimmed.to_string())
    }
}

fn pad_zipcode(digits: &str) -> String {
    format!("{:0>width$}", digits, width = ZIPCODE_WIDTH)
}
