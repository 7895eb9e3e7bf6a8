mod example_scenario;

use std::{fs, path::Path};

use example_scenario::ExampleScenario;
use reconcile_annotations::{DocumentHost as _, extract, strip_annotations};
use serde::Deserialize;

#[tokio::test]
async fn test_scenarios() {
    for scenario in &get_all_scenarios() {
        let (session, _) = scenario.session().await;

        session.proofread().await;

        scenario.assert_annotations(&session).await;
    }
}

#[tokio::test]
async fn test_scenarios_are_idempotent() {
    for scenario in &get_all_scenarios() {
        let (session, service) = scenario.session().await;

        session.proofread().await;
        session.proofread().await;

        scenario.assert_annotations(&session).await;
        assert!(service.requests() <= 1, "Scenario: {}", scenario.name);
    }
}

#[test]
fn test_mapping_invariant() {
    for scenario in &get_all_scenarios() {
        let document = scenario.document();
        let flat = extract(document.nodes());

        assert_eq!(flat.text().chars().count(), flat.mapping().len());
        assert!(flat.mapping().is_sorted(), "Scenario: {}", scenario.name);
        assert!(
            flat.mapping()
                .iter()
                .all(|&position| position <= document.content_size())
        );
    }
}

#[tokio::test]
async fn test_stripping_annotations() {
    for scenario in &get_all_scenarios() {
        let (session, _) = scenario.session().await;
        session.proofread().await;

        let host = session.host();
        let mut document = host.lock().await;
        let transaction = strip_annotations(&mut *document);

        assert!(transaction.is_system_edit());
        assert_eq!(transaction.steps().len(), scenario.expected.len());
        assert!(document.annotations().is_empty());
    }
}

fn get_all_scenarios() -> Vec<ExampleScenario> {
    let scenarios_dir = Path::new("tests/scenarios");
    let entries = fs::read_dir(scenarios_dir)
        .expect("Failed to read scenarios directory")
        .collect::<Vec<_>>();

    let mut scenarios = Vec::new();

    for entry in entries {
        let entry = entry.expect("Failed to read directory entry");
        let path = entry.path();

        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("yml") {
            let file = fs::File::open(&path).expect("Failed to open scenario file");
            for document in serde_yaml::Deserializer::from_reader(file) {
                let scenario =
                    ExampleScenario::deserialize(document).expect("Failed to deserialize scenario");
                scenarios.push(scenario);
            }
        }
    }

    assert!(!scenarios.is_empty());

    scenarios
}
