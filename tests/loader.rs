use std::path::PathBuf;
use std::sync::mpsc;

use results_terminal::loader::{Sources, run_loader, spawn_loader};
use results_terminal::state::Delta;

fn fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path.display().to_string()
}

#[test]
fn loads_results_then_country_names() {
    let (tx, rx) = mpsc::channel();
    let sources = Sources {
        results: fixture("results_sample.csv"),
        countries: Some(fixture("countries_sample.tsv")),
    };
    spawn_loader(sources, tx).join().expect("loader thread finishes");

    let deltas = rx.try_iter().collect::<Vec<_>>();
    assert_eq!(deltas.len(), 2);
    match &deltas[0] {
        Delta::DatasetLoaded { store, report } => {
            assert_eq!(store.len(), 6);
            assert_eq!(report.rows_skipped, 2);
        }
        other => panic!("unexpected delta: {other:?}"),
    }
    match &deltas[1] {
        Delta::CountriesLoaded(names) => assert_eq!(names.len(), 5),
        other => panic!("unexpected delta: {other:?}"),
    }
}

#[test]
fn missing_dataset_reports_failure() {
    let dir = tempfile::tempdir().expect("temp dir");
    let (tx, rx) = mpsc::channel();
    let sources = Sources {
        results: dir.path().join("absent.csv").display().to_string(),
        countries: None,
    };
    run_loader(&sources, &tx);

    let deltas = rx.try_iter().collect::<Vec<_>>();
    assert_eq!(deltas.len(), 1);
    match &deltas[0] {
        Delta::LoadFailed(msg) => assert!(msg.contains("absent.csv")),
        other => panic!("unexpected delta: {other:?}"),
    }
}

#[test]
fn missing_country_names_only_warn() {
    let (tx, rx) = mpsc::channel();
    let sources = Sources {
        results: fixture("results_sample.csv"),
        countries: Some(fixture("no_such_names.tsv")),
    };
    run_loader(&sources, &tx);

    let deltas = rx.try_iter().collect::<Vec<_>>();
    assert_eq!(deltas.len(), 2);
    assert!(matches!(deltas[0], Delta::DatasetLoaded { .. }));
    match &deltas[1] {
        Delta::Log(msg) => assert!(msg.starts_with("[WARN] Country names unavailable")),
        other => panic!("unexpected delta: {other:?}"),
    }
}
