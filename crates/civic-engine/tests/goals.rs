//! Goal merging across sources.

use civic_engine::{DataManager, ManagerConfig};
use civic_test_utils::{shared_grid_from_rows, ConstSource};

fn manager() -> DataManager {
    DataManager::new(shared_grid_from_rows(&["..", ".."]), ManagerConfig::default())
}

#[test]
fn goals_concatenate_in_registration_order() {
    let mut m = manager();
    m.register_source(Box::new(
        ConstSource::new("a", [("a-x", 1.0)])
            .with_goal("a-one", true)
            .with_goal("a-two", false),
    ))
    .unwrap();
    m.register_source(Box::new(ConstSource::new("b", [("b-x", 1.0)])))
        .unwrap();
    m.register_source(Box::new(
        ConstSource::new("c", [("c-x", 1.0)]).with_goal("c-one", true),
    ))
    .unwrap();
    let snap = m.calculate_all().unwrap();
    let ids: Vec<&str> = snap.goals.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, ["a-one", "a-two", "c-one"]);
    assert_eq!(m.goals(), snap.goals);
    assert!(!snap.goals[1].condition);
}

#[test]
fn every_source_goal_appears_once() {
    let mut m = manager();
    for i in 0..5 {
        let name = format!("s{i}");
        let var = format!("s{i}-x");
        let goal = format!("s{i}-goal");
        m.register_source(Box::new(
            ConstSource::new(name, [(var.as_str(), 0.0)]).with_goal(&goal, i % 2 == 0),
        ))
        .unwrap();
    }
    let snap = m.calculate_all().unwrap();
    assert_eq!(snap.goals.len(), 5);
    let mut ids: Vec<_> = snap.goals.iter().map(|g| g.id.clone()).collect();
    ids.dedup();
    assert_eq!(ids.len(), 5);
}

#[test]
fn duplicate_goal_ids_rejected_at_registration() {
    let mut m = manager();
    m.register_source(Box::new(
        ConstSource::new("a", [("a-x", 1.0)]).with_goal("shared", true),
    ))
    .unwrap();
    let err = m
        .register_source(Box::new(
            ConstSource::new("b", [("b-x", 1.0)]).with_goal("shared", true),
        ))
        .unwrap_err();
    assert!(err.to_string().contains("shared"));
    // The registry is unchanged; passes still succeed.
    assert_eq!(m.source_names(), ["a"]);
    let snap = m.calculate_all().unwrap();
    assert_eq!(snap.goals.len(), 1);
}
