use modelexp_rs::error::ModelExpError;
use modelexp_rs::parameters::{ConstantParameters, Parameter, ParameterSet};
use std::f64::INFINITY;

fn sample() -> ParameterSet {
    let mut params = ParameterSet::new();
    params.add_param_with_bounds("r", 50.0, 0.0, 100.0).unwrap();
    params.add(Parameter::new("bg", 1e-3).unwrap().varying(false));
    params.add_param("order", 20.0).unwrap();
    params
}

#[test]
fn test_constants_never_vary() {
    let params = sample();
    let constants: ConstantParameters = ["order"].into_iter().collect();
    assert_eq!(params.varying_names(&constants), vec!["r"]);
    assert!(params.get("order").unwrap().vary());
}

#[test]
fn test_snapshot_restores_everything() {
    let mut params = sample();
    let snapshot = params.snapshot();

    params.get_mut("r").unwrap().update(70.0, 10.0, 80.0, false).unwrap();
    params.get_mut("bg").unwrap().set_stderr(Some(1e-4));
    params.add_param("extra", 1.0).unwrap();

    params.restore(&snapshot);
    let r = params.get("r").unwrap();
    assert_eq!((r.value(), r.min(), r.max(), r.vary()), (50.0, 0.0, 100.0, true));
    assert_eq!(params.get("bg").unwrap().stderr(), None);
    assert!(!params.contains("extra"));
}

#[test]
fn test_no_silent_clamping() {
    let mut params = sample();
    let err = params.set_value("r", 150.0).unwrap_err();
    assert!(ModelExpError::from(err).to_string().contains("r"));
    assert_eq!(params.value("r").unwrap(), 50.0);

    assert!(params.get_mut("r").unwrap().set_bounds(60.0, 100.0).is_err());
    assert!(params.get_mut("r").unwrap().update(5.0, 10.0, 1.0, true).is_err());
    assert_eq!(params.get("r").unwrap().min(), 0.0);
}

#[test]
fn test_json_keeps_order_and_infinite_bounds() {
    let mut params = sample();
    params.fan_out("bg", &["xrr".to_string(), "nr".to_string()]).unwrap();

    let json = params.to_json().unwrap();
    assert!(json.contains("null"));
    let restored = ParameterSet::from_json(&json).unwrap();

    assert_eq!(restored.names(), vec!["r", "bg_xrr", "bg_nr", "order"]);
    assert_eq!(restored.get("bg_nr").unwrap().base_name(), "bg");
    assert_eq!(restored.get("order").unwrap().max(), INFINITY);
    assert!(!restored.get("bg_xrr").unwrap().vary());
}

#[test]
fn test_json_rejects_duplicates() {
    let json = r#"[
        {"name": "a", "value": 1.0, "init_value": 1.0, "vary": true,
         "bounds": {"min": null, "max": null}},
        {"name": "a", "value": 2.0, "init_value": 2.0, "vary": true,
         "bounds": {"min": null, "max": null}}
    ]"#;
    assert!(ParameterSet::from_json(json).is_err());
}
