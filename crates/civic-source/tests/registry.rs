//! Registry validation against the shared mock sources.

use civic_source::{validate_registry, DataSource, RegistryError};
use civic_test_utils::{ConstSource, EchoSource};
use proptest::prelude::*;
use proptest::sample::Index;

fn boxed(s: impl DataSource) -> Box<dyn DataSource> {
    Box::new(s)
}

#[test]
fn empty_registry_is_valid() {
    let plan = validate_registry(&[]).unwrap();
    assert_eq!(plan.variable_count(), 0);
}

#[test]
fn plan_records_owners_in_order() {
    let sources = vec![
        boxed(ConstSource::new("a", [("x", 1.0), ("y", 2.0)])),
        boxed(ConstSource::new("b", [("z", 3.0)])),
    ];
    let plan = validate_registry(&sources).unwrap();
    assert_eq!(plan.owner_of("x"), Some(0));
    assert_eq!(plan.owner_of("z"), Some(1));
    assert_eq!(plan.owner_of("w"), None);
    let names: Vec<&str> = plan.variable_names().collect();
    assert_eq!(names, vec!["x", "y", "z"]);
}

#[test]
fn variable_collision_names_both_sources() {
    let sources = vec![
        boxed(ConstSource::new("a", [("x", 1.0)])),
        boxed(ConstSource::new("b", [("x", 2.0)])),
    ];
    match validate_registry(&sources) {
        Err(RegistryError::VariableCollision(c)) => {
            assert_eq!(c.len(), 1);
            assert_eq!(c[0].name, "x");
            assert_eq!(c[0].first_source, "a");
            assert_eq!(c[0].second_source, "b");
        }
        other => panic!("expected VariableCollision, got {other:?}"),
    }
}

#[test]
fn goal_collision_detected() {
    let sources = vec![
        boxed(ConstSource::new("a", [("x", 1.0)]).with_goal("g", true)),
        boxed(ConstSource::new("b", [("y", 1.0)]).with_goal("g", false)),
    ];
    assert!(matches!(
        validate_registry(&sources),
        Err(RegistryError::GoalCollision(_))
    ));
}

#[test]
fn read_must_come_from_earlier_source() {
    let reader_first = vec![
        boxed(EchoSource::new("echo", "x", "x-copy")),
        boxed(ConstSource::new("a", [("x", 1.0)])),
    ];
    assert_eq!(
        validate_registry(&reader_first).unwrap_err(),
        RegistryError::UnresolvedRead {
            source: "echo".into(),
            variable: "x".into(),
        }
    );

    let writer_first = vec![
        boxed(ConstSource::new("a", [("x", 1.0)])),
        boxed(EchoSource::new("echo", "x", "x-copy")),
    ];
    assert!(validate_registry(&writer_first).is_ok());
}

#[test]
fn duplicate_source_name_rejected() {
    let sources = vec![
        boxed(ConstSource::new("a", [("x", 1.0)])),
        boxed(ConstSource::new("a", [("y", 1.0)])),
    ];
    assert!(matches!(
        validate_registry(&sources),
        Err(RegistryError::DuplicateSource { .. })
    ));
}

fn one_variable_each(names: &[String]) -> Vec<Box<dyn DataSource>> {
    names
        .iter()
        .map(|n| boxed(ConstSource::new(n.clone(), [(format!("{n}-v").as_str(), 1.0)])))
        .collect()
}

proptest! {
    #[test]
    fn unique_names_register_and_any_duplicate_is_rejected(
        names in proptest::collection::btree_set("[a-z]{1,8}", 1..8),
        dup in any::<Index>(),
        at in any::<Index>(),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let sources = one_variable_each(&names);
        let plan = validate_registry(&sources).unwrap();
        prop_assert_eq!(plan.variable_count(), names.len());
        for (i, n) in names.iter().enumerate() {
            prop_assert_eq!(plan.owner_of(&format!("{n}-v")), Some(i));
        }

        // Same name, fresh variable: only the name clashes.
        let name = dup.get(&names).clone();
        let mut with_dup = one_variable_each(&names);
        let again = format!("{name}-again");
        with_dup.insert(
            at.index(names.len() + 1),
            boxed(ConstSource::new(name.clone(), [(again.as_str(), 2.0)])),
        );
        prop_assert_eq!(
            validate_registry(&with_dup).unwrap_err(),
            RegistryError::DuplicateSource { name }
        );

        // The rejected candidate leaves the accepted set valid as before.
        let replan = validate_registry(&sources).unwrap();
        prop_assert_eq!(
            replan.variable_names().collect::<Vec<_>>(),
            plan.variable_names().collect::<Vec<_>>()
        );
    }
}
