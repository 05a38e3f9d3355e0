use crate::error::InferenceError;
use crate::features::demographics::Demographics;
use crate::features::record::{normalize_zipcode, numeric_field, RawRecord, ZIPCODE_COLUMN};
use ndarray::{Array2, Axis};

/// The model input: selected record columns followed by demographics columns.
///
/// Column order is the contract with the trained model. Nothing here can
/// verify it, so any change to the selection list or the demographics file
/// layout needs a retrained artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    values: Array2<f64>,
    /// Index of the input record each row came from.
    source_rows: Vec<usize>,
    /// False where the zipcode had no demographics row.
    matched: Vec<bool>,
}

impl FeatureTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn source_rows(&self) -> &[usize] {
        &self.source_rows
    }

    pub fn is_matched(&self, row: usize) -> bool {
        self.matched.get(row).copied().unwrap_or(false)
    }

    pub fn unmatched_rows(&self) -> Vec<usize> {
        self.matched
            .iter()
            .enumerate()
            .filter(|(_, m)| !**m)
            .map(|(i, _)| i)
            .collect()
    }

    /// Copies the given rows, in the given order, into a new table.
    pub fn select_rows(&self, rows: &[usize]) -> FeatureTable {
        FeatureTable {
            columns: self.columns.clone(),
            values: self.values.select(Axis(0), rows),
            source_rows: rows.iter().map(|&r| self.source_rows[r]).collect(),
            matched: rows.iter().map(|&r| self.matched[r]).collect(),
        }
    }

    /// Values as a row-major f32 buffer, the layout inference runtimes take.
    pub fn to_f32_row_major(&self) -> Vec<f32> {
        self.values.iter().map(|&v| v as f32).collect()
    }
}

/// Left-joins `records` with `demographics` on zipcode.
///
/// Every record must provide every column in `selection`, which must include
/// the zipcode. The zipcode column is dropped from the output. A record whose
/// zipcode is unknown still produces one row, with NaN demographics.
pub fn join_demographics(
    records: &[RawRecord],
    selection: &[&str],
    demographics: &Demographics,
) -> Result<FeatureTable, InferenceError> {
    if !selection.contains(&ZIPCODE_COLUMN) {
        return Err(InferenceError::InvalidRequest(format!(
            "column selection must include '{}'",
            ZIPCODE_COLUMN
        )));
    }

    let record_columns: Vec<&str> = selection
        .iter()
        .copied()
        .filter(|c| *c != ZIPCODE_COLUMN)
        .collect();
    let mut columns: Vec<String> = record_columns.iter().map(|c| c.to_string()).collect();
    columns.extend(demographics.columns().iter().cloned());
    let width = columns.len();
    let missing = vec![f64::NAN; demographics.columns().len()];

    let mut data = Vec::with_capacity(records.len() * width);
    let mut source_rows = Vec::with_capacity(records.len());
    let mut matched = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let zip_value = record
            .get(ZIPCODE_COLUMN)
            .ok_or_else(|| InferenceError::MissingField(ZIPCODE_COLUMN.to_string()))?;
        let zipcode = normalize_zipcode(zip_value)?;

        let base = record_columns
            .iter()
            .map(|c| numeric_field(record, c))
            .collect::<Result<Vec<f64>, _>>()?;

        let hits = demographics.lookup(&zipcode);
        if hits.is_empty() {
            data.extend_from_slice(&base);
            data.extend_from_slice(&missing);
            source_rows.push(index);
            matched.push(false);
        } else {
            for demo in hits {
                data.extend_from_slice(&base);
                data.extend_from_slice(demo);
                source_rows.push(index);
                matched.push(true);
            }
        }
    }

    let values = Array2::from_shape_vec((source_rows.len(), width), data)?;

    Ok(FeatureTable {
        columns,
        values,
        source_rows,
        matched,
    })
}
