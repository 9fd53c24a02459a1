//! Simultaneous XRR/NR: shared structure, dataset-specific scale

use crate::test_helpers::{dataset, domains};
use modelexp_rs::container::ModelContainer;
use modelexp_rs::data::DataContainer;
use modelexp_rs::error::ModelExpError;
use modelexp_rs::experiment::{Experiment, SimultaneousXrrNr};
use modelexp_rs::lm::LmConfig;
use modelexp_rs::model::{BaseModel, ModelComponent};
use modelexp_rs::parameters::ParameterSet;
use modelexp_rs::session::Session;
use ndarray::Array1;
use std::f64::INFINITY;

fn layer() -> Box<dyn ModelComponent> {
    let mut template = ParameterSet::new();
    template.add_param_with_bounds("thickness", 75.0, 0.0, INFINITY).unwrap();
    template.add_param("i0", 0.9).unwrap();
    template.add_param("bg", 1e-6).unwrap();
    Box::new(BaseModel::new("layer", template, |view, q| {
        let t = view.value("thickness")?;
        let i0 = view.value("i0")?;
        let bg = view.value("bg")?;
        Ok(q.mapv(|x| i0 / (1.0 + (x * t).powi(2)).powi(2) + bg))
    }))
}

fn synthetic(q: &Array1<f64>) -> DataContainer {
    let experiment = SimultaneousXrrNr::new();
    let mut truth = ModelContainer::new(layer(), vec![], &experiment).unwrap();
    truth.bind_domains(&domains(&["xrr", "nr"], q)).unwrap();
    truth.set_param("thickness", 80.0, 0.0, INFINITY, true).unwrap();
    truth.set_param_for("i0", "xrr", 1.0, -INFINITY, INFINITY, true).unwrap();
    truth.set_param_for("i0", "nr", 0.8, -INFINITY, INFINITY, true).unwrap();
    truth.set_param_for("bg", "nr", 1e-5, -INFINITY, INFINITY, true).unwrap();
    truth.calc_model().unwrap();

    ["xrr", "nr"]
        .iter()
        .zip(truth.model_sets())
        .map(|(label, out)| dataset(label, out.domain.clone(), out.values.clone()))
        .collect()
}

#[test]
fn test_dataset_specific_scales_fit_independently() {
    let q = Array1::linspace(0.005, 0.3, 80);
    let mut session = Session::new(Box::new(SimultaneousXrrNr::new()));
    session.set_data(synthetic(&q)).unwrap();
    session.set_model(layer(), vec![]).unwrap();

    session.set_param_for("bg", "xrr", 1e-6, -INFINITY, INFINITY, false).unwrap();
    session.set_param_for("bg", "nr", 1e-5, -INFINITY, INFINITY, false).unwrap();
    session.set_fit(LmConfig::default()).unwrap();

    let report = session.fit().unwrap();
    assert_eq!(report.names, vec!["thickness", "i0_xrr", "i0_nr"]);
    assert!((report.get("thickness").unwrap().0 - 80.0).abs() < 1e-4);
    assert!((report.get("i0_xrr").unwrap().0 - 1.0).abs() < 1e-6);
    assert!((report.get("i0_nr").unwrap().0 - 0.8).abs() < 1e-6);

    let model = session.model().unwrap();
    assert_eq!(model.get_model_set(1).unwrap().suffix.to_string(), "nr");
    assert_eq!(model.param("i0_nr").unwrap().base_name(), "i0");
}

#[test]
fn test_undeclared_specific_parameters_are_skipped() {
    let experiment = SimultaneousXrrNr::new();
    let container = ModelContainer::new(layer(), vec![], &experiment).unwrap();
    assert_eq!(container.dataset_specific(), &["i0".to_string(), "bg".to_string()]);
    assert!(!container.parameters().contains("sldCore_xrr"));
    assert_eq!(experiment.dataset_specific_params().len(), 9);
}

#[test]
fn test_wrong_dataset_count_is_rejected() {
    let q = Array1::linspace(0.01, 0.1, 5);
    let mut session = Session::new(Box::new(SimultaneousXrrNr::new()));
    let err = session.set_data(domains(&["xrr"], &q)).unwrap_err();
    assert!(matches!(err, ModelExpError::ShapeMismatch(_)));
}
