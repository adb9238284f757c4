//! Rule-engine style flows through the canonical store.

use kinship_store::{CanonicalStore, TransitionError, transitions};
use kinship_types::{
    ChildRecord, LifeStage, PairKey, PlayerId, PregnancyRecord, RelationshipRecord,
    RelationshipState,
};

const ALEX: PlayerId = PlayerId(11);
const SAM: PlayerId = PlayerId(7);

#[test]
fn courtship_to_child_marks_ledger_at_each_step() {
    let mut store = CanonicalStore::new();

    for day in 1..=3 {
        store
            .update_relationship(ALEX, SAM, "relationship:propose", |r| {
                transitions::propose(r, ALEX)
            })
            .ok();
        store.ledger_mut().clear();
        let accepted = store.update_relationship(SAM, ALEX, "relationship:accept", |r| {
            transitions::accept(r, SAM, day)
        });
        assert!(accepted.is_ok());
        assert!(store.ledger().is_dirty());
    }
    assert_eq!(
        store.relationship(ALEX, SAM).map(|r| r.state),
        Some(RelationshipState::Married)
    );

    store
        .update_pregnancy(ALEX, SAM, "pregnancy:request", |p| {
            transitions::request_try(p, ALEX)
        })
        .ok();
    store
        .update_pregnancy(ALEX, SAM, "pregnancy:accept", |p| {
            transitions::accept_try(p, SAM)
        })
        .ok();
    store
        .update_pregnancy(ALEX, SAM, "pregnancy:begin", |p| {
            transitions::begin(p, SAM, 1, 4)
        })
        .ok();
    let progress = store.update_pregnancy(ALEX, SAM, "pregnancy:day", transitions::advance_day);
    assert_eq!(
        progress,
        Ok(transitions::PregnancyProgress::Due {
            pregnant_player_id: Some(SAM)
        })
    );

    let child = ChildRecord {
        name: String::from("Juniper"),
        parent_a_id: SAM,
        parent_b_id: ALEX,
        born_day: 5,
        ..ChildRecord::default()
    };
    let id = store.add_child(child, "child:born");
    let grew = store.update::<ChildRecord, _, TransitionError, _>(&id, "child:grow", |c| {
        transitions::advance_to(c, LifeStage::Child)
    });
    assert!(grew.is_ok());
    assert_eq!(
        store.get::<ChildRecord>(&id).map(|c| c.stage),
        Some(LifeStage::Child)
    );
}

#[test]
fn refused_transition_leaves_store_clean() {
    let mut store = CanonicalStore::new();
    let key = PairKey::new(ALEX, SAM);
    store.get_or_create::<PregnancyRecord>(&key, "seed");
    store.ledger_mut().clear();

    let refused = store.update::<PregnancyRecord, _, _, _>(&key, "pregnancy:begin", |p| {
        transitions::begin(p, ALEX, 14, 1)
    });

    assert_eq!(refused, Err(TransitionError::NotBothOptedIn));
    assert!(!store.ledger().is_dirty());
    assert_eq!(
        store.get::<PregnancyRecord>(&key),
        Some(&PregnancyRecord::for_key(&key))
    );
}

#[test]
fn relationship_created_from_either_order_shares_a_record() {
    let mut store = CanonicalStore::new();
    let key = PairKey::new(SAM, ALEX);
    let record = store.get_or_create::<RelationshipRecord>(&key, "seed");
    assert_eq!(record.player_a_id, SAM);
    assert_eq!(record.player_b_id, ALEX);
    assert!(store.relationship(ALEX, SAM).is_some());
    assert!(store.relationship(SAM, ALEX).is_some());
}
