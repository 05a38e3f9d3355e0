use crate::error::InferenceError;
use crate::features::record::{numeric_field, PRICE_COLUMN};
use crate::features::{join_demographics, Demographics, FeatureTable, RawRecord, SALES_COLUMN_SELECTION};
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Historical sales joined with demographics, plus the price target per row.
#[derive(Debug, Clone)]
pub struct LabeledDataset {
    pub features: FeatureTable,
    pub target: Vec<f64>,
}

impl LabeledDataset {
    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    /// Rows `rows` of the features with their targets.
    pub fn partition(&self, rows: &[usize]) -> (FeatureTable, Vec<f64>) {
        let features = self.features.select_rows(rows);
        let target = rows.iter().map(|&r| self.target[r]).collect();
        (features, target)
    }
}

pub fn load_sales(
    path: impl AsRef<Path>,
    demographics: &Demographics,
) -> Result<LabeledDataset, InferenceError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| InferenceError::DataUnavailable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    read_sales(file, &path.display().to_string(), demographics)
}

/// Reads the selected sales columns (located by header name) and the price,
/// then joins them the same way the prediction service does.
pub fn read_sales<R: Read>(
    reader: R,
    source: &str,
    demographics: &Demographics,
) -> Result<LabeledDataset, InferenceError> {
    let malformed = |reason: String| InferenceError::MalformedData {
        path: source.to_string(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| malformed(e.to_string()))?
        .clone();

    let wanted: Vec<&str> = std::iter::once(PRICE_COLUMN)
        .chain(SALES_COLUMN_SELECTION.iter().copied())
        .collect();
    let positions = wanted
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h.trim() == *name)
                .ok_or_else(|| malformed(format!("missing column '{}'", name)))
        })
        .collect::<Result<Vec<usize>, _>>()?;

    let mut records: Vec<RawRecord> = Vec::new();
    let mut prices = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row.map_err(|e| malformed(e.to_string()))?;
        let mut record = RawRecord::new();
        for (name, &pos) in wanted.iter().zip(&positions) {
            let cell = row.get(pos).unwrap_or_default();
            record.insert(name.to_string(), Value::String(cell.to_string()));
        }

        let price = numeric_field(&record, PRICE_COLUMN)
            .map_err(|e| malformed(format!("row {}: {}", line + 1, e)))?;
        record.remove(PRICE_COLUMN);
        prices.push(price);
        records.push(record);
    }

    let features = join_demographics(&records, &SALES_COLUMN_SELECTION, demographics)?;
    let target = features.source_rows().iter().map(|&r| prices[r]).collect();

    Ok(LabeledDataset { features, target })
}
