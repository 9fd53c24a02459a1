//! Sphere fits, unpolarized and polarized

use crate::test_helpers::{dataset, domains, init_logger, with_noise};
use modelexp_rs::container::ModelContainer;
use modelexp_rs::data::DataContainer;
use modelexp_rs::decorator::ModelDecorator;
use modelexp_rs::experiment::{residuals, Sas};
use modelexp_rs::lm::LmConfig;
use modelexp_rs::models::{InstrumentalResolution, Magnetic, Sphere};
use modelexp_rs::session::Session;
use ndarray::Array1;
use std::f64::INFINITY;

const LABELS: [&str; 4] = ["sa_p", "sa_m", "la_p", "la_m"];
const POLARIZATION: [f64; 4] = [0.95, -0.95, 0.9, -0.9];

fn stack() -> Vec<Box<dyn ModelDecorator>> {
    vec![Box::new(Magnetic), Box::new(InstrumentalResolution)]
}

fn set_polarization(model: &mut ModelContainer) {
    for (label, p) in LABELS.iter().zip(POLARIZATION) {
        model
            .set_param_for("polarization", label, p, -1.0, 1.0, false)
            .unwrap();
    }
}

/// Four polarized datasets computed from the composed model itself
fn synthetic_sanspol(q: &Array1<f64>) -> DataContainer {
    let experiment = Sas::sanspol();
    let mut truth = ModelContainer::new(Box::new(Sphere), stack(), &experiment).unwrap();
    truth.bind_domains(&domains(&LABELS, q)).unwrap();
    set_polarization(&mut truth);
    truth.set_param("magSldSphere", 1e-5, 0.0, INFINITY, true).unwrap();
    truth.set_param("resolution", 0.05, 0.0, INFINITY, false).unwrap();
    truth.calc_model().unwrap();

    LABELS
        .iter()
        .zip(truth.model_sets())
        .map(|(label, out)| dataset(label, out.domain.clone(), out.values.clone()))
        .collect()
}

#[test]
fn test_sphere_fit_recovers_radius() {
    init_logger();
    let q = Array1::linspace(0.005, 0.06, 50);

    // data from r = 50, i0 = 1 with 0.5% noise
    let mut generator = ModelContainer::new(Box::new(Sphere), vec![], &Sas::new()).unwrap();
    generator.bind_domains(&domains(&[""], &q)).unwrap();
    generator.calc_model().unwrap();
    let clean = generator.get_model_set(0).unwrap().values.clone();
    let data: DataContainer = vec![dataset("", q.clone(), with_noise(&clean, 0.005, 3))]
        .into_iter()
        .collect();

    let mut session = Session::new(Box::new(Sas::new()));
    session.set_model(Box::new(Sphere), vec![]).unwrap();
    session.set_data(data).unwrap();
    session.set_param("r", 46.0, 0.0, 100.0, true).unwrap();
    session.set_param("i0", 1.2, 0.0, 10.0, true).unwrap();
    for fixed in ["sigR", "sldSphere", "bg"] {
        let p = session.model().unwrap().param(fixed).unwrap().clone();
        session.set_param(fixed, p.value(), p.min(), p.max(), false).unwrap();
    }
    session.set_fit(LmConfig::default()).unwrap();

    let report = session.fit().unwrap();
    println!("{}", report);
    let (r, r_err) = report.get("r").unwrap();
    assert!((r - 50.0).abs() < 0.5, "r = {}", r);
    assert!(r_err.unwrap() > 0.0);
    assert!(report.redchi < 1.0);
}

#[test]
fn test_sanspol_fit_recovers_magnetic_contrast() {
    init_logger();
    let q = Array1::linspace(0.005, 0.08, 40);
    let data = synthetic_sanspol(&q);

    let mut session = Session::new(Box::new(Sas::sanspol()));
    session.set_data(data).unwrap();
    session.set_model(Box::new(Sphere), stack()).unwrap();
    {
        let names = session.model().unwrap().parameters().names().join(",");
        assert!(names.contains("polarization_sa_p,polarization_sa_m,polarization_la_p,polarization_la_m"));
    }

    session.set_param("resolution", 0.05, 0.0, INFINITY, false).unwrap();
    for (label, p) in LABELS.iter().zip(POLARIZATION) {
        session
            .set_param_for("polarization", label, p, -1.0, 1.0, false)
            .unwrap();
    }
    for fixed in ["r", "sigR", "sldSphere", "bg"] {
        let p = session.model().unwrap().param(fixed).unwrap().clone();
        session.set_param(fixed, p.value(), p.min(), p.max(), false).unwrap();
    }
    session.set_param("magSldSphere", 6e-6, 0.0, INFINITY, true).unwrap();
    session.set_param("i0", 1.1, 0.0, 10.0, true).unwrap();
    session.set_fit(LmConfig::default()).unwrap();

    let report = session.fit().unwrap();
    assert_eq!(report.names, vec!["magSldSphere", "i0"]);
    let (mag, _) = report.get("magSldSphere").unwrap();
    let (i0, _) = report.get("i0").unwrap();
    assert!((mag / 1e-5 - 1.0).abs() < 1e-4, "magSldSphere = {}", mag);
    assert!((i0 - 1.0).abs() < 1e-4, "i0 = {}", i0);

    // spin up and down differ only through the cross term
    let model = session.model().unwrap();
    let up = &model.get_model_set(0).unwrap().values;
    let down = &model.get_model_set(1).unwrap().values;
    assert!(up.iter().zip(down.iter()).all(|(u, d)| u > d));
}

#[test]
fn test_residual_vector_spans_all_datasets() {
    let q = Array1::linspace(0.01, 0.05, 12);
    let data = synthetic_sanspol(&q);
    let experiment = Sas::sanspol();

    let mut model = ModelContainer::new(Box::new(Sphere), stack(), &experiment).unwrap();
    model.bind_domains(&data).unwrap();
    set_polarization(&mut model);
    model.set_param("magSldSphere", 1e-5, 0.0, INFINITY, true).unwrap();
    model.set_param("resolution", 0.05, 0.0, INFINITY, false).unwrap();

    let outputs = model.evaluate(model.parameters()).unwrap();
    let r = residuals(&experiment, &data, &outputs).unwrap();
    assert_eq!(r.len(), 48);
    assert!(r.iter().all(|v| v.abs() < 1e-9));
}

#[test]
fn test_datasets_registered_out_of_order_keep_their_polarization() {
    let q = Array1::linspace(0.01, 0.05, 12);
    let ordered = synthetic_sanspol(&q);
    let data: DataContainer = [1, 0, 3, 2]
        .iter()
        .map(|&i| ordered.get_dataset(i).unwrap().clone())
        .collect();
    let experiment = Sas::sanspol();

    let mut model = ModelContainer::new(Box::new(Sphere), stack(), &experiment).unwrap();
    model.bind_domains(&data).unwrap();
    set_polarization(&mut model);
    model.set_param("magSldSphere", 1e-5, 0.0, INFINITY, true).unwrap();
    model.set_param("resolution", 0.05, 0.0, INFINITY, false).unwrap();

    for slot in model.slots() {
        assert_eq!(slot.label.as_deref(), Some(slot.suffix.label().as_str()));
    }
    assert_eq!(model.slots()[0].suffix.label(), "sa_m");

    let outputs = model.evaluate(model.parameters()).unwrap();
    let r = residuals(&experiment, &data, &outputs).unwrap();
    assert!(r.iter().all(|v| v.abs() < 1e-9));
}
