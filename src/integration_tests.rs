#[cfg(test)]
mod end_to_end_tests {
    use crate::{
        config::{AppConfig, LoadPolicy},
        evaluation,
        features::{join_demographics, Demographics, FeatureTable, RawRecord, SALES_COLUMN_SELECTION},
        model::{LinearPredictor, ModelRegistry, Predictor},
        server::{routes, types::AppState},
        service::PredictionService,
        InferenceError,
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    const DEMOGRAPHICS: &str = "\
ppltn_qty,urbn_ppltn_qty,medn_hshld_incm_amt,zipcode
20218,20218,72000,98027
26881,24000,61000,98042
";

    /// Always answers 500000.0, whatever the features.
    struct FixedPrice;

    impl Predictor for FixedPrice {
        fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>, InferenceError> {
            Ok(vec![500000.0; features.n_rows()])
        }
    }

    fn sample_task() -> Value {
        json!({
            "bedrooms": 4, "bathrooms": 1.0, "sqft_living": 1680, "sqft_lot": 5043,
            "floors": 1.5, "sqft_above": 1680, "sqft_basement": 0, "zipcode": "98027",
        })
    }

    fn as_record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_feature_vector_for_sample_record() {
        let demographics = Demographics::from_reader(DEMOGRAPHICS.as_bytes(), "demo").unwrap();
        let record = as_record(sample_task());
        let features = join_demographics(&[record], &SALES_COLUMN_SELECTION, &demographics).unwrap();

        assert_eq!(features.n_rows(), 1);
        assert!(!features.columns().iter().any(|c| c == "zipcode"));
        assert_eq!(
            features.columns(),
            [
                "bedrooms", "bathrooms", "sqft_living", "sqft_lot", "floors", "sqft_above",
                "sqft_basement", "ppltn_qty", "urbn_ppltn_qty", "medn_hshld_incm_amt",
            ]
        );
        let row: Vec<f64> = features.values().row(0).to_vec();
        assert_eq!(
            row,
            vec![4.0, 1.0, 1680.0, 5043.0, 1.5, 1680.0, 0.0, 20218.0, 20218.0, 72000.0]
        );
    }

    #[tokio::test]
    async fn test_full_prediction_flow() {
        let dir = tempfile::tempdir().unwrap();
        let demo_path = dir.path().join("zipcode_demographics.csv");
        std::fs::write(&demo_path, DEMOGRAPHICS).unwrap();

        let service = PredictionService::new(&demo_path, ModelRegistry::preloaded(Arc::new(FixedPrice)));
        let app = routes::create_router(AppState::new(service));

        let body = json!({ "task": sample_task(), "request_id": "e2e-1", "task_type": "price" });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/predict")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, json!({ "price": 500000.0 }));
    }

    #[test]
    fn test_numeric_and_string_zipcodes_predict_alike() {
        let dir = tempfile::tempdir().unwrap();
        let demo_path = dir.path().join("demo.csv");
        std::fs::write(&demo_path, DEMOGRAPHICS).unwrap();

        // weight on the demographic income column only
        let mut coefficients = vec![0.0; 10];
        coefficients[9] = 2.0;
        let model = LinearPredictor {
            intercept: 1000.0,
            coefficients,
            feature_names: None,
        };
        let service = PredictionService::new(&demo_path, ModelRegistry::preloaded(Arc::new(model)));

        let as_string = as_record(sample_task());
        let mut as_number = as_string.clone();
        as_number.insert("zipcode".to_string(), json!(98027));

        assert_eq!(service.predict(&as_string).unwrap(), 145000.0);
        assert_eq!(service.predict(&as_number).unwrap(), 145000.0);
    }

    #[test]
    fn test_evaluation_run_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let demo_path = dir.path().join("demo.csv");
        let sales_path = dir.path().join("kc_house_data.csv");
        let model_path = dir.path().join("model.json");
        let output_path = dir.path().join("results_scatter.svg");

        std::fs::write(&demo_path, DEMOGRAPHICS).unwrap();

        let mut sales = String::from(
            "id,price,bedrooms,bathrooms,sqft_living,sqft_lot,floors,sqft_above,sqft_basement,zipcode\n",
        );
        for i in 0..40 {
            let sqft = 900 + 50 * i;
            let zip = if i % 2 == 0 { "98027" } else { "98042" };
            // noise keeps the fit imperfect
            let price = 200.0 * sqft as f64 + if i % 3 == 0 { 15000.0 } else { -7500.0 };
            sales.push_str(&format!(
                "{},{},3,2,{},5000,1,{},0,{}\n",
                i, price, sqft, sqft, zip
            ));
        }
        std::fs::write(&sales_path, sales).unwrap();

        let mut coefficients = vec![0.0; 10];
        coefficients[2] = 200.0;
        let model = LinearPredictor {
            intercept: 0.0,
            coefficients,
            feature_names: None,
        };
        std::fs::write(&model_path, serde_json::to_string(&model).unwrap()).unwrap();

        let mut config = AppConfig::default();
        config.data.demographics_path = demo_path;
        config.data.sales_path = sales_path;
        config.model.path = model_path;
        config.model.load_policy = LoadPolicy::Fresh;
        config.evaluation.output_path = output_path.clone();

        let report = evaluation::run(&config).unwrap();

        assert_eq!(report.n_test, 10);
        assert_eq!(report.n_train, 30);
        assert!(report.train.rmse > 7500.0 && report.train.rmse < 15000.0);
        assert!(report.test.r2 > 0.9 && report.test.r2 < 1.0);
        assert_eq!(report.outliers.len(), 5);
        assert!(report.outliers[0].abs_error >= report.outliers[4].abs_error);

        let svg = std::fs::read_to_string(&output_path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Predicted vs Actual (test set)"));
    }
}
