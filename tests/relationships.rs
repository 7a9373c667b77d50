//! End-to-end relationship behavior through the public facade.

use weftdb::{
    Cardinality, Engine, EntryId, Relationship, RelationshipArgs, ReplaceOutcome, WeftResult,
};

fn engine() -> Engine {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let e = Engine::in_memory().unwrap();
    e.register_entry_type("person").unwrap();
    e.register_entry_type("company").unwrap();
    e
}

fn employment(e: &Engine) -> Relationship {
    e.define_post_to_post("person", &["company"], "employment", Default::default())
        .unwrap()
}

#[test]
fn membership_is_symmetric_across_sides() -> WeftResult<()> {
    let e = engine();
    let rel = employment(&e);
    let p = e.create_entry("person")?;
    let c = e.create_entry("company")?;

    assert!(rel.add_relationship(p, c)?);
    assert_eq!(rel.related_entry_ids(p, false)?, vec![c]);
    assert_eq!(rel.related_entry_ids(c, false)?, vec![p]);
    Ok(())
}

#[test]
fn argument_order_does_not_matter() -> WeftResult<()> {
    let e = engine();
    let rel = employment(&e);
    let p = e.create_entry("person")?;
    let c = e.create_entry("company")?;

    // Object-first call stores the same canonical edge.
    assert!(rel.add_relationship(c, p)?);
    assert!(rel.add_relationship(p, c)?);
    assert_eq!(rel.related_entry_ids(c, false)?, vec![p]);
    Ok(())
}

#[test]
fn repeated_adds_are_idempotent() -> WeftResult<()> {
    let e = engine();
    let rel = employment(&e);
    let p = e.create_entry("person")?;
    let c = e.create_entry("company")?;

    for _ in 0..3 {
        assert!(rel.add_relationship(p, c)?);
    }
    assert_eq!(rel.related_entry_ids(p, false)?, vec![c]);
    Ok(())
}

#[test]
fn many_to_one_caps_the_from_side() -> WeftResult<()> {
    let e = engine();
    // Each person works at one company; a company employs many people.
    let rel = e.define_post_to_post(
        "person",
        &["company"],
        "works-at",
        RelationshipArgs::with_cardinality(Cardinality::ManyToOne),
    )?;
    let p1 = e.create_entry("person")?;
    let p2 = e.create_entry("person")?;
    let c1 = e.create_entry("company")?;
    let c2 = e.create_entry("company")?;

    assert!(rel.add_relationship(p1, c1)?);
    assert!(rel.add_relationship(p2, c1)?);
    // Second company for p1 is refused without mutation.
    assert!(!rel.add_relationship(p1, c2)?);
    assert_eq!(rel.related_entry_ids(p1, false)?, vec![c1]);
    assert_eq!(rel.related_entry_ids(c2, false)?, Vec::<EntryId>::new());
    Ok(())
}

#[test]
fn one_to_one_caps_both_sides() -> WeftResult<()> {
    let e = engine();
    let rel = e.define_post_to_post(
        "person",
        &["company"],
        "founder",
        RelationshipArgs::with_cardinality(Cardinality::OneToOne),
    )?;
    let p1 = e.create_entry("person")?;
    let p2 = e.create_entry("person")?;
    let c1 = e.create_entry("company")?;
    let c2 = e.create_entry("company")?;

    assert!(rel.add_relationship(p1, c1)?);
    assert!(!rel.add_relationship(p1, c2)?);
    assert!(!rel.add_relationship(p2, c1)?);
    assert!(rel.add_relationship(p2, c2)?);
    Ok(())
}

#[test]
fn replace_applies_the_set_difference() -> WeftResult<()> {
    let e = engine();
    let rel = employment(&e);
    let p = e.create_entry("person")?;
    let companies: Vec<EntryId> = (0..5)
        .map(|_| e.create_entry("company").unwrap())
        .collect();

    for &c in &companies[..4] {
        assert!(rel.add_relationship(p, c)?);
    }

    // Keep companies[1] and [2], drop [0] and [3], add [4].
    let target = [companies[1], companies[2], companies[4]];
    let outcome = rel.replace_relationships(p, &target)?;
    match outcome {
        ReplaceOutcome::Complete { mut removed, added } => {
            removed.sort();
            let mut expected_removed = vec![companies[0], companies[3]];
            expected_removed.sort();
            assert_eq!(removed, expected_removed);
            assert_eq!(added, vec![companies[4]]);
        }
        other => panic!("expected complete outcome, got {other:?}"),
    }

    let mut related = rel.related_entry_ids(p, false)?;
    related.sort();
    let mut expected: Vec<EntryId> = target.to_vec();
    expected.sort();
    assert_eq!(related, expected);
    Ok(())
}

#[test]
fn replace_reports_partial_on_cardinality_refusal() -> WeftResult<()> {
    let e = engine();
    let rel = e.define_post_to_post(
        "person",
        &["company"],
        "works-at",
        RelationshipArgs::with_cardinality(Cardinality::ManyToOne),
    )?;
    let p = e.create_entry("person")?;
    let c1 = e.create_entry("company")?;
    let c2 = e.create_entry("company")?;
    let c3 = e.create_entry("company")?;
    assert!(rel.add_relationship(p, c1)?);

    // c2 replaces c1, then c3 is refused by the one-company cap.
    let outcome = rel.replace_relationships(p, &[c2, c3])?;
    assert_eq!(
        outcome,
        ReplaceOutcome::Partial {
            removed: vec![c1],
            added: vec![c2],
            rejected: c3,
        }
    );
    assert_eq!(rel.related_entry_ids(p, false)?, vec![c2]);
    Ok(())
}

#[test]
fn permanent_delete_cleans_up_every_edge() -> WeftResult<()> {
    let e = engine();
    let rel = employment(&e);
    let p1 = e.create_entry("person")?;
    let p2 = e.create_entry("person")?;
    let c = e.create_entry("company")?;
    assert!(rel.add_relationship(p1, c)?);
    assert!(rel.add_relationship(p2, c)?);

    assert!(e.delete_entry(c)?);
    assert_eq!(rel.related_entry_ids(p1, false)?, Vec::<EntryId>::new());
    assert_eq!(rel.related_entry_ids(p2, false)?, Vec::<EntryId>::new());
    Ok(())
}

#[test]
fn adds_on_missing_or_foreign_entries_are_tolerated() -> WeftResult<()> {
    let e = engine();
    e.register_entry_type("school").unwrap();
    let rel = employment(&e);
    let p = e.create_entry("person")?;
    let s = e.create_entry("school")?;

    // Nonexistent id and non-participating type both no-op as success.
    assert!(rel.add_relationship(p, 9999)?);
    assert!(rel.add_relationship(p, s)?);
    assert_eq!(rel.related_entry_ids(p, false)?, Vec::<EntryId>::new());
    Ok(())
}

#[test]
fn bidirectional_relationship_relates_peers() -> WeftResult<()> {
    let e = engine();
    let rel = e.define_post_to_post("person", &["person"], "mentor", Default::default())?;
    assert!(rel.def().bidirectional);

    let a = e.create_entry("person")?;
    let b = e.create_entry("person")?;
    assert!(rel.add_relationship(a, b)?);

    assert_eq!(rel.related_entry_ids(a, false)?, vec![b]);
    assert_eq!(rel.related_entry_ids(b, false)?, vec![a]);

    rel.delete_relationship(b, a)?;
    assert_eq!(rel.related_entry_ids(a, false)?, Vec::<EntryId>::new());
    assert_eq!(rel.related_entry_ids(b, false)?, Vec::<EntryId>::new());
    Ok(())
}

#[test]
fn sort_order_round_trips_and_late_edges_sort_last() -> WeftResult<()> {
    let e = engine();
    let rel = employment(&e);
    let c = e.create_entry("company")?;
    let people: Vec<EntryId> = (0..3).map(|_| e.create_entry("person").unwrap()).collect();
    for &p in &people {
        assert!(rel.add_relationship(p, c)?);
    }

    let ordering = [people[2], people[0], people[1]];
    rel.save_sort_data(c, &ordering)?;
    assert_eq!(rel.related_entry_ids(c, true)?, ordering.to_vec());

    // An edge added after the reorder has no explicit order and lists
    // after all ordered ids.
    let late = e.create_entry("person")?;
    assert!(rel.add_relationship(late, c)?);
    let mut expected = ordering.to_vec();
    expected.push(late);
    assert_eq!(rel.related_entry_ids(c, true)?, expected);
    Ok(())
}

#[test]
fn sort_data_ignores_unrelated_ids() -> WeftResult<()> {
    let e = engine();
    let rel = employment(&e);
    let c = e.create_entry("company")?;
    let p = e.create_entry("person")?;
    let stranger = e.create_entry("person")?;
    assert!(rel.add_relationship(p, c)?);

    // Reordering with an unrelated id must not mint an edge for it.
    rel.save_sort_data(c, &[stranger, p])?;
    assert_eq!(rel.related_entry_ids(c, true)?, vec![p]);
    Ok(())
}

#[test]
fn relationships_survive_reopen() -> WeftResult<()> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("weft.db");
    let (p, c);
    {
        let e = Engine::open(&path)?;
        e.register_entry_type("person")?;
        e.register_entry_type("company")?;
        let rel = employment(&e);
        p = e.create_entry("person")?;
        c = e.create_entry("company")?;
        assert!(rel.add_relationship(p, c)?);
    }

    // The registry is process-scoped and must be redeclared; edges are
    // durable.
    let e = Engine::open(&path)?;
    e.register_entry_type("person")?;
    e.register_entry_type("company")?;
    let rel = employment(&e);
    assert_eq!(rel.related_entry_ids(p, false)?, vec![c]);
    Ok(())
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Re-adding any subset of an existing related set never changes
        /// the stored relationships.
        #[test]
        fn readding_existing_relations_is_a_fixpoint(adds in prop::collection::vec(0usize..8, 1..24)) {
            let e = engine();
            let rel = employment(&e);
            let p = e.create_entry("person").unwrap();
            let companies: Vec<EntryId> =
                (0..8).map(|_| e.create_entry("company").unwrap()).collect();

            for &i in &adds {
                prop_assert!(rel.add_relationship(p, companies[i]).unwrap());
            }

            let mut expected: Vec<EntryId> = adds.iter().map(|&i| companies[i]).collect();
            expected.sort();
            expected.dedup();
            let mut related = rel.related_entry_ids(p, false).unwrap();
            related.sort();
            prop_assert_eq!(related, expected);
        }

        /// replace_relationships is idempotent: applying the same target
        /// set twice yields the set once and an empty diff the second time.
        #[test]
        fn replace_is_idempotent(target in prop::collection::hash_set(0usize..8, 0..8)) {
            let e = engine();
            let rel = employment(&e);
            let p = e.create_entry("person").unwrap();
            let companies: Vec<EntryId> =
                (0..8).map(|_| e.create_entry("company").unwrap()).collect();
            let ids: Vec<EntryId> = target.iter().map(|&i| companies[i]).collect();

            prop_assert!(rel.replace_relationships(p, &ids).unwrap().is_complete());
            match rel.replace_relationships(p, &ids).unwrap() {
                ReplaceOutcome::Complete { removed, added } => {
                    prop_assert!(removed.is_empty());
                    prop_assert!(added.is_empty());
                }
                other => prop_assert!(false, "unexpected outcome {:?}", other),
            }
        }
    }
}
