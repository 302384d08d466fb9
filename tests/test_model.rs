use polars::prelude::*;
use pretty_assertions::assert_eq;
use revenue_forecast::error::ForecastError;
use revenue_forecast::model::{
    ArtifactStore, AutoregForecaster, Forecaster, MonthTransformer, SplineBasisTransformer,
    TRANSFORMER_FILE,
};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_recursive_autoregressive_prediction() {
    // window [2, 4], lag-1 coefficient 0.5, lag-2 coefficient 0.25
    let model = AutoregForecaster::new("test", 1.0, vec![0.5, 0.25], vec![]).unwrap();

    let forecast = model
        .predict(2, &[2.0, 4.0], &DataFrame::empty())
        .unwrap();

    // step 1: 1 + 0.5*4 + 0.25*2 = 3.5
    // step 2: 1 + 0.5*3.5 + 0.25*4 = 3.75 (step 1 joins the window)
    assert_eq!(forecast, vec![3.5, 3.75]);
}

#[test]
fn test_exogenous_features_enter_the_prediction() {
    let model = AutoregForecaster::new("test", 0.0, vec![1.0], vec![2.0]).unwrap();
    let exog = DataFrame::new(vec![Series::new("spline_0", vec![10.0, 20.0])]).unwrap();

    let forecast = model.predict(2, &[3.0], &exog).unwrap();

    // step 1: 3 + 2*10 = 23; step 2: 23 + 2*20 = 63
    assert_eq!(forecast, vec![23.0, 63.0]);
}

#[test]
fn test_prediction_uses_window_tail() {
    let model = AutoregForecaster::new("test", 0.0, vec![1.0], vec![]).unwrap();

    // only the most recent value matters for a one-lag model
    let forecast = model
        .predict(1, &[100.0, 200.0, 7.0], &DataFrame::empty())
        .unwrap();

    assert_eq!(forecast, vec![7.0]);
}

#[test]
fn test_short_window_is_rejected() {
    let model = AutoregForecaster::new("test", 0.0, vec![0.5, 0.5], vec![]).unwrap();

    let result = model.predict(1, &[1.0], &DataFrame::empty());

    assert!(matches!(result, Err(ForecastError::ModelInvocation(_))));
}

#[test]
fn test_exog_shape_mismatch_is_rejected() {
    let model = AutoregForecaster::new("test", 0.0, vec![1.0], vec![2.0]).unwrap();

    // wrong row count: two steps need two exogenous rows
    let exog = DataFrame::new(vec![Series::new("spline_0", vec![10.0])]).unwrap();
    let rows = model.predict(2, &[3.0], &exog);
    assert!(matches!(rows, Err(ForecastError::ModelInvocation(_))));

    // wrong column count
    let exog = DataFrame::new(vec![
        Series::new("spline_0", vec![10.0]),
        Series::new("spline_1", vec![11.0]),
    ])
    .unwrap();
    let cols = model.predict(1, &[3.0], &exog);
    assert!(matches!(cols, Err(ForecastError::ModelInvocation(_))));
}

#[test]
fn test_spline_lookup() {
    let basis: Vec<Vec<f64>> = (0..12).map(|m| vec![m as f64, m as f64 / 2.0]).collect();
    let transformer = SplineBasisTransformer::new(12, basis).unwrap();

    assert_eq!(transformer.n_features(), 2);

    let rows = transformer.transform(&[1, 12, 3]).unwrap();
    assert_eq!(rows, vec![vec![0.0, 0.0], vec![11.0, 5.5], vec![2.0, 1.0]]);
}

#[test]
fn test_spline_rejects_out_of_period_month() {
    let basis: Vec<Vec<f64>> = (0..12).map(|m| vec![m as f64]).collect();
    let transformer = SplineBasisTransformer::new(12, basis).unwrap();

    assert!(matches!(
        transformer.transform(&[13]),
        Err(ForecastError::ModelInvocation(_))
    ));
    assert!(matches!(
        transformer.transform(&[0]),
        Err(ForecastError::ModelInvocation(_))
    ));
}

#[test]
fn test_spline_rejects_ragged_basis() {
    let result = SplineBasisTransformer::new(2, vec![vec![1.0, 2.0], vec![3.0]]);
    assert!(matches!(result, Err(ForecastError::Configuration(_))));

    let result = SplineBasisTransformer::new(12, vec![vec![1.0]]);
    assert!(matches!(result, Err(ForecastError::Configuration(_))));
}

#[test]
fn test_artifact_store_round_trip() {
    let dir = TempDir::new().unwrap();

    let model = AutoregForecaster::new("CityHotel", 1.5, vec![0.6, 0.3], vec![0.1]).unwrap();
    fs::write(
        dir.path().join("CityHotel.json"),
        serde_json::to_string(&model).unwrap(),
    )
    .unwrap();

    let basis: Vec<Vec<f64>> = (0..12).map(|m| vec![m as f64]).collect();
    let transformer = SplineBasisTransformer::new(12, basis).unwrap();
    fs::write(
        dir.path().join(TRANSFORMER_FILE),
        serde_json::to_string(&transformer).unwrap(),
    )
    .unwrap();

    let store = ArtifactStore::new(dir.path());
    let loaded_model = store.load_forecaster("CityHotel").unwrap();
    let loaded_transformer = store.load_transformer().unwrap();

    assert_eq!(loaded_model.name(), "CityHotel");
    assert_eq!(loaded_model.n_lags(), 2);
    assert_eq!(loaded_transformer.n_features(), 1);
}

#[test]
fn test_missing_artifact_reports_path() {
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::new(dir.path());

    let err = store.load_forecaster("ResortHotel").unwrap_err();

    match err {
        ForecastError::ArtifactLoad { path, .. } => assert!(path.contains("ResortHotel.json")),
        other => panic!("expected ArtifactLoad, got {:?}", other),
    }
}
