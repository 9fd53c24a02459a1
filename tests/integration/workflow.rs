//! File round trips and fit history through a session

use crate::test_helpers::{dataset, init_logger, proportional};
use modelexp_rs::data::{load_xye, DataContainer, Dataset, Suffix};
use modelexp_rs::error::ModelExpError;
use modelexp_rs::experiment::Sas;
use modelexp_rs::lm::LmConfig;
use modelexp_rs::parameters::ParameterSet;
use modelexp_rs::session::Session;
use ndarray::{array, Array1};
use std::fs;
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("modelexp_rs_{}_{}", std::process::id(), name))
}

fn line_data(slope: f64) -> DataContainer {
    let x = array![1.0, 2.0, 3.0];
    vec![dataset("", x.clone(), x * slope)].into_iter().collect()
}

fn fitted_session() -> Session {
    let mut session = Session::new(Box::new(Sas::new()));
    session.set_data(line_data(10.0)).unwrap();
    session.set_model(proportional(), vec![]).unwrap();
    session.set_fit(LmConfig::default()).unwrap();
    session
}

fn a(session: &Session) -> f64 {
    session.model().unwrap().param("a").unwrap().value()
}

#[test]
fn test_end_to_end_line() {
    init_logger();
    let mut session = Session::new(Box::new(Sas::new()));
    let data: DataContainer = vec![Dataset::new(
        array![1.0, 2.0, 3.0],
        array![10.0, 20.0, 30.0],
        array![1.0, 1.0, 1.0],
        Suffix::default(),
    )
    .unwrap()]
    .into_iter()
    .collect();
    session.set_data(data).unwrap();
    session.set_model(proportional(), vec![]).unwrap();
    session.set_fit(LmConfig::default()).unwrap();

    let report = session.fit().unwrap();
    assert!(report.success);
    assert!((a(&session) - 10.0).abs() < 1e-3);
}

#[test]
fn test_history_navigation_and_truncation() {
    let mut session = fitted_session();
    for slope in [10.0, 20.0, 30.0] {
        session.set_data(line_data(slope)).unwrap();
        session.fit().unwrap();
    }
    assert_eq!(session.engine().unwrap().history().len(), 4);
    assert!((a(&session) - 30.0).abs() < 1e-3);

    for _ in 0..3 {
        assert!(session.step_back().unwrap());
    }
    assert_eq!(a(&session), 5.0);
    assert!(!session.step_back().unwrap());

    for _ in 0..3 {
        assert!(session.step_forward().unwrap());
    }
    assert!((a(&session) - 30.0).abs() < 1e-3);
    assert!(!session.step_forward().unwrap());

    // two back, then a new fit drops the two newer states
    session.step_back().unwrap();
    session.step_back().unwrap();
    assert!((a(&session) - 10.0).abs() < 1e-3);
    session.set_data(line_data(40.0)).unwrap();
    session.fit().unwrap();

    let history = session.engine().unwrap().history();
    assert_eq!(history.len(), 3);
    assert!(!history.can_step_forward());
    assert!((a(&session) - 40.0).abs() < 1e-3);
}

#[test]
fn test_domain_error_keeps_parameters() {
    let mut session = fitted_session();
    let x = array![1.0, 2.0, 3.0];
    let negative: DataContainer = vec![Dataset::new(x.clone(), -x, Array1::ones(3), Suffix::default()).unwrap()]
        .into_iter()
        .collect();
    session.set_data(negative).unwrap();

    let err = session.fit().unwrap_err();
    assert!(matches!(err, ModelExpError::NumericDomain(_)));
    assert_eq!(a(&session), 5.0);
    assert!(session.engine().unwrap().history().is_empty());
}

#[test]
fn test_xye_load_fit_and_export() {
    let input = temp_path("line.xye");
    fs::write(&input, "# q I sI\n3.0 30.0 1.0\n1.0 10.0 1.0\n\n2.0 20.0 1.0\n").unwrap();

    let mut data = DataContainer::new();
    data.load_xye(&input, Suffix::new(["sa", "p"])).unwrap();
    assert_eq!(data.get_dataset(0).unwrap().domain(), &array![1.0, 2.0, 3.0]);

    let mut session = Session::new(Box::new(Sas::new()));
    session.set_data(data).unwrap();
    session.set_model(proportional(), vec![]).unwrap();
    session.set_fit(LmConfig::default()).unwrap();
    session.fit().unwrap();

    let output = temp_path("line_fit.dat");
    session.save_results(&output).unwrap();
    let text = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "");
    assert_eq!(lines[1], "#[[Data]] sa_p");
    assert_eq!(lines[2], "#q / A-1\tI / cm-1\tsI / cm-1\tImodel / cm-1");
    assert_eq!(lines.len(), 6);
    let model: f64 = lines[5].split('\t').nth(3).unwrap().parse().unwrap();
    assert!((model - 30.0).abs() < 1e-2);

    fs::remove_file(&input).ok();
    fs::remove_file(&output).ok();
}

#[test]
fn test_missing_xye_is_io_error() {
    let err = load_xye(temp_path("does_not_exist.xye"), Suffix::default()).unwrap_err();
    assert!(matches!(err, ModelExpError::Io(_)));
}

#[test]
fn test_fitted_parameters_json_round_trip() {
    let mut session = fitted_session();
    session.fit().unwrap();
    let params = session.model().unwrap().parameters();

    let path = temp_path("params.json");
    params.save_json(&path).unwrap();
    let loaded = ParameterSet::load_json(&path).unwrap();
    assert_eq!(&loaded, params);
    assert!(loaded.get("a").unwrap().stderr().is_some());
    fs::remove_file(&path).ok();
}
