use proptest::prelude::*;
use stockflow_core::{
    run_scenarios, Error, ModelBuilder, ModelDocument, Scenario, Session, Simulation, TimeSeries, TsvWriter,
    ValidationErrorType,
};

const PREDATOR_PREY: &str = r#"{
    "rounds": 4,
    "nodes": [
        {"id": "rabbits", "name": "Rabbits", "kind": "level", "initial": 100,
         "inflows": ["rabbit_births"], "outflows": ["predation"]},
        {"id": "foxes", "name": "Foxes", "kind": "level", "initial": 10,
         "inflows": ["fox_births"], "outflows": ["fox_deaths"]},
        {"id": "rabbit_births", "name": "Rabbit births", "kind": "rate", "formula": "rabbits * growth"},
        {"id": "predation", "name": "Predation", "kind": "rate", "formula": "min(encounters, rabbits)"},
        {"id": "fox_births", "name": "Fox births", "kind": "rate", "formula": "encounters * bounded(0.1, 0, 1)"},
        {"id": "fox_deaths", "name": "Fox deaths", "kind": "rate", "formula": "foxes * 0.2"},
        {"id": "encounters", "name": "Encounters", "kind": "auxiliary", "formula": "rabbits * foxes / 100"},
        {"id": "growth", "name": "Growth", "kind": "constant", "value": 0.2, "range": {"min": 0, "max": 1}}
    ]
}"#;

fn document() -> ModelDocument {
    ModelDocument::from_json(PREDATOR_PREY).unwrap()
}

#[test]
fn test_document_end_to_end() {
    let doc = document();
    let rounds = doc.rounds.unwrap();
    let model = doc.into_builder().validate().unwrap();
    assert_eq!(model.level_columns(), vec!["Foxes", "Rabbits"]);

    let mut series = TimeSeries::new();
    Simulation::new(model).run(rounds, &mut series).unwrap();
    assert_eq!(series.len(), rounds + 1);
    assert_eq!(series.rounds, vec![0, 1, 2, 3, 4]);

    // Round 1: encounters = 10, rabbits = 100 + 20 - 10, foxes = 10 + 1 - 2.
    assert_eq!(series.rows[0], vec![10.0, 100.0]);
    assert_eq!(series.rows[1], vec![9.0, 110.0]);
}

#[test]
fn test_document_round_trips_through_json() {
    let doc = document();
    let again = ModelDocument::from_json(&doc.to_json().unwrap()).unwrap();
    assert_eq!(doc, again);
}

#[test]
fn test_tsv_output_matches_series() {
    let mut out = Vec::new();
    {
        let model = document().into_builder().validate().unwrap();
        let mut writer = TsvWriter::new(&mut out);
        Simulation::new(model).run(1, &mut writer).unwrap();
    }
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text, "round\tFoxes\tRabbits\n0\t10\t100\n1\t9\t110\n");
}

#[test]
fn test_scenarios_over_document() {
    let base = document().into_builder();
    let scenarios = vec![
        Scenario::new("baseline"),
        Scenario::new("no growth").with("growth", 0.0),
        Scenario::new("no foxes").with("foxes", 0.0),
    ];
    let results = run_scenarios(&base, &scenarios, 2).unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[2].series.column("Rabbits"), Some(vec![100.0, 120.0, 144.0]));
    assert_eq!(results[2].series.column("Foxes"), Some(vec![0.0, 0.0, 0.0]));
}

#[test]
fn test_useless_node_in_document() {
    let mut base = document().into_builder();
    base.add_auxiliary("census", "Census", stockflow_core::Expr::parse("rabbits + foxes").unwrap());
    let err = base.validate().unwrap_err();
    assert_eq!(err.error_type, ValidationErrorType::UselessNode);
    assert_eq!(err.node_ids, vec!["census".to_string()]);
}

#[test]
fn test_session_from_json() {
    let mut session = Session::from_json(PREDATOR_PREY).unwrap();
    assert!(matches!(session.run(1), Err(Error::Lifecycle(_))));
    session.validate().unwrap();
    assert_eq!(session.run(2).unwrap().len(), 3);
}

proptest! {
    #[test]
    fn prop_runs_are_deterministic(initial in 0.0f64..1e4, rate in 0.0f64..0.5, rounds in 0usize..30) {
        let mut b = ModelBuilder::new();
        b.add_level("s", "S", initial, &["grow"], &["decay"])
            .add_constant("k", "K", rate, None)
            .add_rate("grow", "Grow", stockflow_core::Expr::parse("s * k").unwrap())
            .add_rate("decay", "Decay", stockflow_core::Expr::parse("s * k / 2").unwrap());
        let run = |b: ModelBuilder| {
            let mut rows: Vec<Vec<f64>> = Vec::new();
            Simulation::new(b.validate().unwrap()).run(rounds, &mut rows).unwrap();
            rows
        };
        let first = run(b.clone());
        prop_assert_eq!(first.len(), rounds + 1);
        prop_assert_eq!(first, run(b));
    }
}
