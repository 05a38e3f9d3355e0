use crate::error::InferenceError;
use crate::features::FeatureTable;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A trained regressor. One output per feature-table row.
pub trait Predictor: Send + Sync {
    fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>, InferenceError>;
}

/// Linear model stored as JSON: `intercept + coefficients · row`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearPredictor {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    /// Column names the coefficients were fitted on, checked when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

impl LinearPredictor {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let load_err = |reason: String| InferenceError::ModelLoad {
            path: path.display().to_string(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| load_err(e.to_string()))
    }

    /// Always predicts `value`.
    pub fn constant(value: f64, n_features: usize) -> Self {
        Self {
            intercept: value,
            coefficients: vec![0.0; n_features],
            feature_names: None,
        }
    }
}

impl Predictor for LinearPredictor {
    fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>, InferenceError> {
        if let Some(expected) = &self.feature_names {
            if expected.as_slice() != features.columns() {
                return Err(InferenceError::FeatureMismatch {
                    expected: expected.clone(),
                    got: features.columns().to_vec(),
                });
            }
        }
        if self.coefficients.len() != features.n_columns() {
            return Err(InferenceError::ShapeMismatch {
                expected: self.coefficients.len(),
                got: features.n_columns(),
            });
        }

        Ok(features
            .values()
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .zip(&self.coefficients)
                    .fold(self.intercept, |acc, (x, w)| {
                        // A zero weight ignores the column, even if it is missing.
                        if *w == 0.0 {
                            acc
                        } else {
                            acc + w * x
                        }
                    })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{join_demographics, Demographics, SALES_COLUMN_SELECTION};
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn table(zipcode: &str) -> FeatureTable {
        let demo = Demographics::from_reader("zipcode,ppltn_qty\n98027,20218\n".as_bytes(), "inline")
            .unwrap();
        let record = json!({
            "bedrooms": 3, "bathrooms": 2, "sqft_living": 1000, "sqft_lot": 4000,
            "floors": 1, "sqft_above": 1000, "sqft_basement": 0, "zipcode": zipcode,
        });
        join_demographics(
            &[record.as_object().cloned().unwrap()],
            &SALES_COLUMN_SELECTION,
            &demo,
        )
        .unwrap()
    }

    #[test]
    fn test_linear_prediction() {
        let model = LinearPredictor {
            intercept: 10.0,
            coefficients: vec![1.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.001],
            feature_names: None,
        };
        let out = model.predict(&table("98027")).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out[0] - (10.0 + 3.0 + 2000.0 + 20.218)).abs() < 1e-9);
    }

    #[test]
    fn test_constant_ignores_missing_demographics() {
        let model = LinearPredictor::constant(500000.0, 8);
        assert_eq!(model.predict(&table("00000")).unwrap(), vec![500000.0]);
    }

    #[test]
    fn test_nan_propagates_through_weighted_column() {
        let mut model = LinearPredictor::constant(1.0, 8);
        model.coefficients[7] = 1.0;
        let out = model.predict(&table("00000")).unwrap();
        assert!(out[0].is_nan());
    }

    #[test]
    fn test_shape_mismatch() {
        let model = LinearPredictor::constant(1.0, 3);
        let result = model.predict(&table("98027"));
        assert!(matches!(
            result,
            Err(InferenceError::ShapeMismatch { expected: 3, got: 8 })
        ));
    }

    #[test]
    fn test_feature_name_mismatch() {
        let mut model = LinearPredictor::constant(1.0, 8);
        model.feature_names = Some(vec!["bedrooms".to_string(); 8]);
        let result = model.predict(&table("98027"));
        assert!(matches!(result, Err(InferenceError::FeatureMismatch { .. })));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"intercept": 2.5, "coefficients": [1.0, 2.0]}}"#).unwrap();
        let model = LinearPredictor::from_file(file.path()).unwrap();
        assert_eq!(model.intercept, 2.5);
        assert_eq!(model.coefficients, vec![1.0, 2.0]);
        assert!(model.feature_names.is_none());
    }

    #[test]
    fn test_from_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let result = LinearPredictor::from_file(file.path());
        assert!(matches!(result, Err(InferenceError::ModelLoad { .. })));
    }
}
