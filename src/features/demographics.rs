use crate::error::InferenceError;
use crate::features::record::{normalize_zipcode_str, ZIPCODE_COLUMN};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Per-zipcode demographic attributes, read fully into memory.
#[derive(Debug, Clone, Default)]
pub struct Demographics {
    columns: Vec<String>,
    // A zipcode should map to one row; duplicates are kept so that a join
    // multiplies rows the same way a relational left join would.
    rows: HashMap<String, Vec<Vec<f64>>>,
}

impl Demographics {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| InferenceError::DataUnavailable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_reader(file, &path.display().to_string())
    }

    /// Parses a delimited table with a header row. `source` is only used in
    /// error messages.
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self, InferenceError> {
        let malformed = |reason: String| InferenceError::MalformedData {
            path: source.to_string(),
            reason,
        };

        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = reader
            .headers()
            .map_err(|e| malformed(e.to_string()))?
            .clone();

        let key_index = headers
            .iter()
            .position(|h| h.trim() == ZIPCODE_COLUMN)
            .ok_or_else(|| malformed(format!("missing '{}' column", ZIPCODE_COLUMN)))?;

        let columns: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != key_index)
            .map(|(_, h)| h.trim().to_string())
            .collect();

        let mut rows: HashMap<String, Vec<Vec<f64>>> = HashMap::new();
        let mut duplicates = 0usize;

        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| malformed(e.to_string()))?;
            let zipcode = record
                .get(key_index)
                .and_then(normalize_zipcode_str)
                .ok_or_else(|| malformed(format!("row {}: empty zipcode", line + 1)))?;

            let mut values = Vec::with_capacity(columns.len());
            for (i, cell) in record.iter().enumerate() {
                if i == key_index {
                    continue;
                }
                values.push(parse_cell(cell).ok_or_else(|| {
                    malformed(format!(
                        "row {}: non-numeric value {:?} in column '{}'",
                        line + 1,
                        cell,
                        &headers[i]
                    ))
                })?);
            }

            let entry = rows.entry(zipcode).or_default();
            if !entry.is_empty() {
                duplicates += 1;
            }
            entry.push(values);
        }

        if duplicates > 0 {
            tracing::warn!(
                source = %source,
                duplicates,
                "demographics table has duplicate zipcodes, joined rows will be multiplied"
            );
        }

        Ok(Self { columns, rows })
    }

    /// Attribute names in file order, excluding the zipcode key.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn lookup(&self, zipcode: &str) -> &[Vec<f64>] {
        self.rows.get(zipcode).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Some(f64::NAN);
    }
    cell.parse::<f64>().ok()
}
